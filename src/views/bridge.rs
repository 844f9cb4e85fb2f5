// src/views/bridge.rs
use crate::formatters::format_currency;
use crate::models::{FinancialModel, TabId};
use crate::views::{year_label, ScenarioView, ScenarioViewProps, TextTable};

/// Walks revenue and free cash flow from the first forecast year to the last.
#[derive(Debug, Default)]
pub struct BridgeView;

impl BridgeView {
    pub fn new() -> Self {
        BridgeView
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeStep {
    pub label: String,
    pub value: f64,
}

fn delta(start: Option<f64>, end: Option<f64>) -> f64 {
    end.unwrap_or(0.0) - start.unwrap_or(0.0)
}

/// Start, per-segment deltas and end of the revenue walk.
pub fn revenue_bridge(model: &FinancialModel) -> Vec<BridgeStep> {
    let (Some(first), Some(last)) = (model.income_statements.first(), model.income_statements.last()) else {
        return Vec::new();
    };
    let start_year = year_label(first.year.or_else(|| model.year_at(0)));
    let end_year = year_label(last.year.or_else(|| model.year_at(model.income_statements.len() - 1)));
    vec![
        BridgeStep {
            label: format!("{} Revenue", start_year),
            value: first.total_revenue.unwrap_or(0.0),
        },
        BridgeStep {
            label: "Automotive Growth".to_string(),
            value: delta(first.automotive_revenue, last.automotive_revenue),
        },
        BridgeStep {
            label: "Energy & Services Growth".to_string(),
            value: delta(first.services_revenue, last.services_revenue),
        },
        BridgeStep {
            label: format!("{} Revenue", end_year),
            value: last.total_revenue.unwrap_or(0.0),
        },
    ]
}

/// Start, operating cash flow and capex deltas, and end of the FCF walk.
pub fn fcf_bridge(model: &FinancialModel) -> Vec<BridgeStep> {
    let (Some(first), Some(last)) = (model.cash_flow_statements.first(), model.cash_flow_statements.last())
    else {
        return Vec::new();
    };
    vec![
        BridgeStep {
            label: format!("{} FCF", year_label(first.year)),
            value: first.free_cash_flow.unwrap_or(0.0),
        },
        BridgeStep {
            label: "Operating Cash Flow".to_string(),
            value: delta(first.operating_cash_flow, last.operating_cash_flow),
        },
        BridgeStep {
            label: "Capital Expenditures".to_string(),
            value: delta(first.capital_expenditures, last.capital_expenditures),
        },
        BridgeStep {
            label: format!("{} FCF", year_label(last.year)),
            value: last.free_cash_flow.unwrap_or(0.0),
        },
    ]
}

fn bridge_table(title: &str, steps: &[BridgeStep]) -> String {
    let mut table = TextTable::new([title, "Amount"]);
    for step in steps {
        table.row([step.label.clone(), format_currency(step.value)]);
    }
    table.render()
}

impl ScenarioView for BridgeView {
    fn tab(&self) -> TabId {
        TabId::Bridge
    }

    fn render_model(&self, props: &ScenarioViewProps, model: &FinancialModel) -> String {
        let mut out = format!("Financial Bridge - {}\n", props.scenario.label());
        let revenue = revenue_bridge(model);
        let fcf = fcf_bridge(model);
        if revenue.is_empty() && fcf.is_empty() {
            out.push_str("Not enough forecast years to build a bridge.\n");
            return out;
        }
        if !revenue.is_empty() {
            out.push_str(&bridge_table("Revenue Bridge", &revenue));
        }
        if !fcf.is_empty() {
            out.push('\n');
            out.push_str(&bridge_table("Free Cash Flow Bridge", &fcf));
        }
        out
    }
}
