// src/views/segments.rs
use crate::formatters::{format_currency, format_percent};
use crate::models::{FinancialModel, IncomeStatement, TabId};
use crate::views::{ratio, year_label, ScenarioView, ScenarioViewProps, TextTable};

/// Automotive vs energy & services split of each forecast year.
#[derive(Debug, Default)]
pub struct SegmentsView;

impl SegmentsView {
    pub fn new() -> Self {
        SegmentsView
    }
}

fn segment_total(stmt: &IncomeStatement) -> Option<f64> {
    stmt.total_revenue.or(match (stmt.automotive_revenue, stmt.services_revenue) {
        (Some(a), Some(s)) => Some(a + s),
        _ => None,
    })
}

impl ScenarioView for SegmentsView {
    fn tab(&self) -> TabId {
        TabId::Segments
    }

    fn render_model(&self, props: &ScenarioViewProps, model: &FinancialModel) -> String {
        let mut out = format!("Segment Analysis - {}\n", props.scenario.label());
        if model.income_statements.is_empty() {
            out.push_str("No income statements in this model.\n");
            return out;
        }

        let mut revenue = TextTable::new([
            "Year",
            "Automotive",
            "Energy & Services",
            "Automotive Share",
            "Services Share",
        ]);
        let mut margins = TextTable::new(["Year", "Automotive GM", "Services GM", "Operating Margin"]);
        for (i, stmt) in model.income_statements.iter().enumerate() {
            let year = year_label(model.year_at(i));
            let total = segment_total(stmt);
            revenue.row([
                year.clone(),
                format_currency(stmt.automotive_revenue),
                format_currency(stmt.services_revenue),
                format_percent(ratio(stmt.automotive_revenue, total)),
                format_percent(ratio(stmt.services_revenue, total)),
            ]);
            margins.row([
                year,
                format_percent(ratio(stmt.automotive_gross_profit, stmt.automotive_revenue)),
                format_percent(ratio(stmt.services_gross_profit, stmt.services_revenue)),
                format_percent(stmt.operating_margin),
            ]);
        }
        out.push_str(&revenue.render());
        out.push('\n');
        out.push_str(&margins.render());
        out
    }
}
