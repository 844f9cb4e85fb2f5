// src/views/comparison.rs
use log::debug;
use std::sync::Arc;

use crate::error::{DashboardError, Result};
use crate::formatters::{format_currency, format_percent};
use crate::models::{ComparisonResponse, DcfValuation, FinancialModel, IncomeStatement, ScenarioId, TabId};
use crate::services::api_client::ApiClient;
use crate::services::cache::ScenarioModelCache;
use crate::views::{error_banner, generate_prompt, slot_status, FetchSlot, ScenarioViewProps, TextTable};

/// All three scenarios side by side from the cache, plus the backend's
/// cross-scenario summary.
pub struct ComparisonView {
    summary: FetchSlot<ComparisonResponse>,
}

impl Default for ComparisonView {
    fn default() -> Self {
        ComparisonView {
            summary: FetchSlot::new("comparison"),
        }
    }
}

impl ComparisonView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> TabId {
        TabId::Comparison
    }

    pub fn summary(&self) -> &FetchSlot<ComparisonResponse> {
        &self.summary
    }

    pub async fn load(&self, client: &ApiClient) -> bool {
        self.summary.load(fetch_comparison(client)).await
    }

    pub fn teardown(&self) {
        self.summary.teardown();
    }

    pub fn render(&self, cache: &ScenarioModelCache, props: &ScenarioViewProps) -> String {
        let present = cache.present_scenarios();
        if present.is_empty() {
            let mut out = generate_prompt(self.tab(), props);
            out.push_str("[ Generate All ]  POST /dashboard/generate-all\n");
            return out;
        }

        let mut out = String::from("Scenario Comparison\n");
        let mut headers = vec!["Metric".to_string()];
        headers.extend(ScenarioId::ALL.iter().map(|s| s.label().to_string()));
        let mut table = TextTable::new(headers);

        let models: Vec<Option<Arc<FinancialModel>>> = ScenarioId::ALL.iter().map(|s| cache.get(*s)).collect();
        let rows: [(&str, Vec<String>); 7] = [
            ("Price per Share", per_scenario(&models, |m| format_currency(dcf(m).price_per_share))),
            ("Enterprise Value", per_scenario(&models, |m| format_currency(dcf(m).enterprise_value))),
            ("Equity Value", per_scenario(&models, |m| format_currency(dcf(m).equity_value))),
            ("WACC", per_scenario(&models, |m| format_percent(dcf(m).wacc))),
            ("Final-year Revenue", per_scenario(&models, |m| format_currency(final_year(m).total_revenue))),
            ("Final-year Net Income", per_scenario(&models, |m| format_currency(final_year(m).net_income))),
            ("Final-year Net Margin", per_scenario(&models, |m| format_percent(final_year(m).net_margin))),
        ];
        for (label, values) in rows {
            table.row(std::iter::once(label.to_string()).chain(values));
        }
        out.push_str(&table.render());

        let missing: Vec<&str> = ScenarioId::ALL
            .iter()
            .filter(|s| !present.contains(s))
            .map(|s| s.label())
            .collect();
        if !missing.is_empty() {
            out.push_str(&format!("Not generated yet: {}\n", missing.join(", ")));
        }

        out.push('\n');
        out.push_str(&self.render_summary());
        out
    }

    fn render_summary(&self) -> String {
        let state = self.summary.state();
        let Some(response) = self.summary.latest() else {
            return slot_status(&state, "Comparison summary").unwrap_or_default();
        };
        let mut out = String::new();
        if let Some(error) = state.error() {
            out.push_str(&error_banner(error));
        }

        let summary = &response.comparison_summary;
        let mut table = TextTable::new(["Scenario", "Final Revenue", "Revenue CAGR", "Gross Margin", "Operating Margin"]);
        for scenario in ScenarioId::ALL {
            let key = scenario.as_str();
            let revenue = summary.revenue_comparison.get(key).cloned().unwrap_or_default();
            let margins = summary.margin_comparison.get(key).cloned().unwrap_or_default();
            if !summary.revenue_comparison.contains_key(key) && !summary.margin_comparison.contains_key(key) {
                continue;
            }
            table.row([
                scenario.label().to_string(),
                format_currency(revenue.final_revenue),
                format_percent(revenue.revenue_cagr),
                format_percent(margins.gross_margin),
                format_percent(margins.operating_margin),
            ]);
        }
        if !table.is_empty() {
            out.push_str(&table.render());
        }
        if !response.key_insights.is_empty() {
            out.push_str("\nKey insights\n");
            for insight in &response.key_insights {
                out.push_str(&format!("  * {}\n", insight));
            }
        }
        out
    }
}

fn per_scenario(models: &[Option<Arc<FinancialModel>>], cell: impl Fn(&FinancialModel) -> String) -> Vec<String> {
    models
        .iter()
        .map(|m| m.as_deref().map(&cell).unwrap_or_else(|| "N/A".to_string()))
        .collect()
}

fn dcf(model: &FinancialModel) -> DcfValuation {
    model.dcf_valuation.clone().unwrap_or_default()
}

fn final_year(model: &FinancialModel) -> IncomeStatement {
    model.income_statements.last().cloned().unwrap_or_default()
}

async fn fetch_comparison(client: &ApiClient) -> Result<ComparisonResponse> {
    let response = client.comparison().await?;
    if !response.success {
        debug!("Comparison endpoint reported failure");
        return Err(DashboardError::Rejected("comparison request reported failure".to_string()));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RevenueComparison;

    fn props() -> ScenarioViewProps {
        ScenarioViewProps {
            scenario: ScenarioId::Base,
            model: None,
            loading: false,
        }
    }

    #[test]
    fn empty_cache_offers_generation() {
        let view = ComparisonView::new();
        let text = view.render(&ScenarioModelCache::new(), &props());
        assert!(text.contains("Generate Model"));
        assert!(text.contains("/dashboard/generate-all"));
    }

    #[test]
    fn partial_cache_marks_missing_scenarios() {
        let cache = ScenarioModelCache::new();
        cache.set(
            ScenarioId::Best,
            FinancialModel {
                dcf_valuation: Some(DcfValuation {
                    price_per_share: Some(420.0),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        let view = ComparisonView::new();
        let text = view.render(&cache, &props());
        assert!(text.contains("$420.00"));
        assert!(text.contains("N/A"));
        assert!(text.contains("Not generated yet: Base Case, Worst Case"));
        assert!(text.contains("Comparison summary not loaded."));
    }

    #[test]
    fn backend_summary_is_listed_per_scenario() {
        let cache = ScenarioModelCache::new();
        cache.set(ScenarioId::Worst, FinancialModel::default());
        let view = ComparisonView::new();
        let mut response = ComparisonResponse {
            success: true,
            key_insights: vec!["Worst case still profitable".into()],
            ..Default::default()
        };
        response.comparison_summary.revenue_comparison.insert(
            "worst".into(),
            RevenueComparison {
                final_revenue: Some(150_000_000_000.0),
                revenue_cagr: Some(0.08),
            },
        );
        let ticket = view.summary.begin().unwrap();
        view.summary.finish(ticket, Ok(response));

        let text = view.render(&cache, &props());
        assert!(text.contains("$150.0B"));
        assert!(text.contains("8.0%"));
        assert!(text.contains("* Worst case still profitable"));
    }
}
