// src/views/overview.rs
use crate::formatters::{format_count, format_currency, format_percent, or_na};
use crate::models::{FinancialModel, TabId, TeslaOverview};
use crate::services::api_client::ApiClient;
use crate::views::{error_banner, generate_prompt, slot_status, FetchSlot, ScenarioView, ScenarioViewProps, TextTable};

/// Base-year figures (fetched once when the shell mounts) plus the summary
/// card of the active scenario's model.
pub struct OverviewView {
    base: FetchSlot<TeslaOverview>,
}

impl Default for OverviewView {
    fn default() -> Self {
        OverviewView {
            base: FetchSlot::new("overview"),
        }
    }
}

impl OverviewView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> &FetchSlot<TeslaOverview> {
        &self.base
    }

    pub async fn load(&self, client: &ApiClient) -> bool {
        self.base.load(client.overview()).await
    }

    pub fn teardown(&self) {
        self.base.teardown();
    }

    fn render_base_year(&self) -> String {
        let Some(overview) = self.base.latest() else {
            return slot_status(&self.base.state(), "Base-year overview").unwrap_or_default();
        };
        let mut out = String::new();
        if let Some(error) = self.base.state().error() {
            out.push_str(&error_banner(error));
        }
        out.push_str(&format!(
            "{}\n\n",
            or_na(overview.model_description.clone())
        ));

        let data = &overview.tesla_base_data;
        let mut table = TextTable::new(["Base Year", "Value"]);
        table
            .row(["Total Revenue".to_string(), format_currency(data.total_revenue)])
            .row(["Automotive Revenue".to_string(), format_currency(data.automotive_revenue)])
            .row(["Energy & Services Revenue".to_string(), format_currency(data.services_revenue)])
            .row(["Net Income".to_string(), format_currency(data.net_income)])
            .row(["Deliveries".to_string(), format_count(data.total_deliveries)])
            .row(["Cash & Equivalents".to_string(), format_currency(data.cash_and_equivalents)])
            .row(["Total Debt".to_string(), format_currency(data.total_debt)])
            .row(["Shares Outstanding".to_string(), format_count(data.shares_outstanding)]);
        out.push_str(&table.render());

        let macros = &overview.macro_assumptions;
        let mut table = TextTable::new(["Macro Assumption", "Value"]);
        table
            .row(["EV Market Growth".to_string(), format_percent(macros.global_ev_market_growth)])
            .row(["Inflation".to_string(), format_percent(macros.inflation_rate)])
            .row(["Risk-free Rate".to_string(), format_percent(macros.risk_free_rate)])
            .row(["Market Risk Premium".to_string(), format_percent(macros.market_risk_premium)])
            .row([
                "Beta".to_string(),
                macros.tesla_beta.map(|b| format!("{:.2}", b)).unwrap_or_else(|| "N/A".to_string()),
            ]);
        out.push('\n');
        out.push_str(&table.render());

        if !overview.forecast_years.is_empty() {
            let years: Vec<String> = overview.forecast_years.iter().map(|y| y.to_string()).collect();
            out.push_str(&format!("\nForecast years: {}\n", years.join(", ")));
        }
        out
    }
}

/// Headline valuation figures for one model.
pub fn summary_card(props: &ScenarioViewProps, model: &FinancialModel) -> String {
    let dcf = model.dcf_valuation.clone().unwrap_or_default();
    let final_year = model.income_statements.last();

    let mut table = TextTable::new([format!("{} Summary", props.scenario.label()), String::new()]);
    table
        .row(["Price per Share".to_string(), format_currency(dcf.price_per_share)])
        .row(["Enterprise Value".to_string(), format_currency(dcf.enterprise_value)])
        .row(["Equity Value".to_string(), format_currency(dcf.equity_value)])
        .row(["WACC".to_string(), format_percent(dcf.wacc)])
        .row(["Terminal Growth".to_string(), format_percent(dcf.terminal_growth_rate)]);
    if let Some(stmt) = final_year {
        let year = stmt.year.map(|y| y.to_string()).unwrap_or_else(|| "Final-year".to_string());
        table
            .row([format!("{} Revenue", year), format_currency(stmt.total_revenue)])
            .row([format!("{} Net Income", year), format_currency(stmt.net_income)])
            .row([format!("{} Net Margin", year), format_percent(stmt.net_margin)]);
    }
    table.render()
}

impl ScenarioView for OverviewView {
    fn tab(&self) -> TabId {
        TabId::Overview
    }

    fn render_model(&self, props: &ScenarioViewProps, model: &FinancialModel) -> String {
        let mut out = format!("{}\n", or_na(model.model_name.clone()));
        out.push_str(&summary_card(props, model));
        out
    }

    fn render(&self, props: &ScenarioViewProps) -> String {
        let mut out = self.render_base_year();
        out.push('\n');
        match &props.model {
            Some(model) => out.push_str(&self.render_model(props, model)),
            None => out.push_str(&generate_prompt(self.tab(), props)),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DcfValuation, ScenarioId};
    use std::sync::Arc;

    #[test]
    fn summary_card_shows_formatted_price() {
        let model = FinancialModel {
            dcf_valuation: Some(DcfValuation {
                price_per_share: Some(245.5),
                enterprise_value: Some(1_234_000_000.0),
                wacc: Some(0.176),
                ..Default::default()
            }),
            ..Default::default()
        };
        let props = ScenarioViewProps {
            scenario: ScenarioId::Base,
            model: Some(Arc::new(model.clone())),
            loading: false,
        };
        let text = summary_card(&props, &model);
        assert!(text.contains("Base Case Summary"));
        assert!(text.contains("$245.50"));
        assert!(text.contains("$1.2B"));
        assert!(text.contains("17.6%"));
        assert!(text.contains("$0"));
    }

    #[test]
    fn overview_without_data_reports_state() {
        let view = OverviewView::new();
        let props = ScenarioViewProps {
            scenario: ScenarioId::Worst,
            model: None,
            loading: false,
        };
        let text = view.render(&props);
        assert!(text.contains("Base-year overview not loaded."));
        assert!(text.contains("Generate Model"));
    }
}
