// src/views/dcf.rs
use log::debug;

use crate::error::Result;
use crate::formatters::{format_currency, format_percent};
use crate::models::{FinancialModel, ScenarioId, SensitivityResponse, TabId};
use crate::services::api_client::ApiClient;
use crate::services::cache::ScenarioModelCache;
use crate::views::{error_banner, slot_status, FetchSlot, ScenarioView, ScenarioViewProps, TextTable};

#[derive(Debug, Clone)]
pub struct ScenarioSensitivity {
    pub scenario: ScenarioId,
    pub data: SensitivityResponse,
}

/// DCF breakdown from the cached model plus the sensitivity grid, which is a
/// dependent fetch: it is only requested once the scenario has a model.
pub struct DcfView {
    sensitivity: FetchSlot<ScenarioSensitivity>,
}

impl Default for DcfView {
    fn default() -> Self {
        DcfView {
            sensitivity: FetchSlot::new("dcf/sensitivity"),
        }
    }
}

impl DcfView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensitivity(&self) -> &FetchSlot<ScenarioSensitivity> {
        &self.sensitivity
    }

    /// Requests the sensitivity grid for `scenario` when its model is cached.
    /// Without `force`, a grid already shown or loading for the same scenario
    /// is reused; a request for another scenario is superseded.
    /// Returns whether a request was issued.
    pub async fn refresh_sensitivity(
        &self,
        client: &ApiClient,
        cache: &ScenarioModelCache,
        scenario: ScenarioId,
        force: bool,
    ) -> bool {
        if !cache.has(scenario) {
            debug!("No {} model cached, skipping sensitivity request", scenario);
            return false;
        }
        if !force && self.sensitivity.covers(scenario.as_str()) {
            return false;
        }
        if self.sensitivity.is_closed() {
            return false;
        }
        self.sensitivity
            .load_for(scenario.as_str(), fetch_sensitivity(client, scenario))
            .await;
        true
    }

    pub fn teardown(&self) {
        self.sensitivity.teardown();
    }

    fn render_sensitivity(&self, scenario: ScenarioId) -> String {
        let state = self.sensitivity.state_for(scenario.as_str());
        let latest = self.sensitivity.latest().filter(|s| s.scenario == scenario);
        let Some(sensitivity) = latest else {
            return slot_status(&state, "Sensitivity analysis")
                .unwrap_or_else(|| "Loading sensitivity analysis...\n".to_string());
        };
        let mut out = String::new();
        if let Some(error) = state.error() {
            out.push_str(&error_banner(error));
        }

        let grid = &sensitivity.data.sensitivity_analysis;
        let mut headers = vec!["WACC \\ Growth".to_string()];
        headers.extend(grid.growth_rates.iter().map(|g| format_percent(*g)));
        let mut table = TextTable::new(headers);
        for (i, wacc) in grid.wacc_rates.iter().enumerate() {
            let prices = grid.price_matrix.get(i).map(Vec::as_slice).unwrap_or(&[]);
            let mut row = vec![format_percent(*wacc)];
            row.extend(
                (0..grid.growth_rates.len()).map(|j| format_currency(prices.get(j).copied())),
            );
            table.row(row);
        }
        out.push_str(&format!(
            "Sensitivity (base valuation {})\n",
            format_currency(sensitivity.data.base_valuation)
        ));
        out.push_str(&table.render());
        out
    }
}

async fn fetch_sensitivity(client: &ApiClient, scenario: ScenarioId) -> Result<ScenarioSensitivity> {
    let data = client.sensitivity(scenario).await?;
    Ok(ScenarioSensitivity { scenario, data })
}

pub fn valuation_table(model: &FinancialModel) -> TextTable {
    let dcf = model.dcf_valuation.clone().unwrap_or_default();
    let mut table = TextTable::new(["Valuation", "Value"]);
    table
        .row(["Cost of Equity".to_string(), format_percent(dcf.cost_of_equity)])
        .row(["Cost of Debt".to_string(), format_percent(dcf.cost_of_debt)])
        .row(["WACC".to_string(), format_percent(dcf.wacc)])
        .row(["Terminal Growth".to_string(), format_percent(dcf.terminal_growth_rate)])
        .row(["PV of Cash Flows".to_string(), format_currency(dcf.present_value_cash_flows)])
        .row(["Terminal Value".to_string(), format_currency(dcf.terminal_value)])
        .row(["PV of Terminal Value".to_string(), format_currency(dcf.present_value_terminal)])
        .row(["Enterprise Value".to_string(), format_currency(dcf.enterprise_value)])
        .row(["Net Cash".to_string(), format_currency(dcf.net_cash)])
        .row(["Equity Value".to_string(), format_currency(dcf.equity_value)])
        .row(["Price per Share".to_string(), format_currency(dcf.price_per_share)]);
    table
}

impl ScenarioView for DcfView {
    fn tab(&self) -> TabId {
        TabId::Dcf
    }

    fn render_model(&self, props: &ScenarioViewProps, model: &FinancialModel) -> String {
        let mut out = format!("DCF Valuation - {}\n", props.scenario.label());
        out.push_str(&valuation_table(model).render());

        let fcf = model
            .dcf_valuation
            .as_ref()
            .map(|d| d.projected_free_cash_flows.as_slice())
            .unwrap_or(&[]);
        if !fcf.is_empty() {
            let mut table = TextTable::new(["Year", "Projected FCF"]);
            for (i, value) in fcf.iter().enumerate() {
                let year = model
                    .year_at(i)
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| format!("Year {}", i + 1));
                table.row([year, format_currency(*value)]);
            }
            out.push('\n');
            out.push_str(&table.render());
        }

        out.push('\n');
        out.push_str(&self.render_sensitivity(props.scenario));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DcfValuation, SensitivityGrid};
    use std::sync::Arc;

    fn model() -> FinancialModel {
        FinancialModel {
            forecast_years: vec![2025, 2026],
            dcf_valuation: Some(DcfValuation {
                wacc: Some(0.1),
                projected_free_cash_flows: vec![5_000_000_000.0, 6_500_000_000.0],
                price_per_share: Some(312.4),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn no_request_without_a_cached_model() {
        let view = DcfView::new();
        let cache = ScenarioModelCache::new();
        // Unroutable port: a request would fail, but none must be attempted.
        let client = ApiClient::new("http://127.0.0.1:9");
        assert!(!view.refresh_sensitivity(&client, &cache, ScenarioId::Base, true).await);
        assert!(view.sensitivity().state().is_idle());
    }

    #[test]
    fn renders_breakdown_and_grid_for_matching_scenario() {
        let view = DcfView::new();
        let ticket = view.sensitivity.begin().unwrap();
        view.sensitivity.finish(
            ticket,
            Ok(ScenarioSensitivity {
                scenario: ScenarioId::Best,
                data: SensitivityResponse {
                    base_valuation: Some(312.4),
                    sensitivity_analysis: SensitivityGrid {
                        growth_rates: vec![0.02, 0.03],
                        wacc_rates: vec![0.09],
                        price_matrix: vec![vec![350.0, 410.25]],
                    },
                    ..Default::default()
                },
            }),
        );
        let props = ScenarioViewProps {
            scenario: ScenarioId::Best,
            model: Some(Arc::new(model())),
            loading: false,
        };
        let text = view.render(&props);
        assert!(text.contains("DCF Valuation - Best Case"));
        assert!(text.contains("$312.40"));
        assert!(text.contains("$6.5B"));
        assert!(text.contains("2026"));
        assert!(text.contains("$410.25"));

        let other = ScenarioViewProps { scenario: ScenarioId::Worst, ..props };
        assert!(!view.render(&other).contains("$410.25"));
    }
}
