// src/views/statements.rs
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use crate::error::{DashboardError, Result};
use crate::formatters::{format_count, format_currency, format_percent};
use crate::models::{AssumptionsResponse, FinancialModel, ScenarioId, TabId};
use crate::services::api_client::ApiClient;
use crate::views::{error_banner, slot_status, year_label, FetchSlot, ScenarioView, ScenarioViewProps, TextTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    #[default]
    Income,
    Balance,
    CashFlow,
    Assumptions,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Income => "income",
            StatementKind::Balance => "balance",
            StatementKind::CashFlow => "cash-flow",
            StatementKind::Assumptions => "assumptions",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StatementKind::Income => "Income Statement",
            StatementKind::Balance => "Balance Sheet",
            StatementKind::CashFlow => "Cash Flow Statement",
            StatementKind::Assumptions => "Key Assumptions",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(StatementKind::Income),
            "balance" => Ok(StatementKind::Balance),
            "cash-flow" | "cashflow" => Ok(StatementKind::CashFlow),
            "assumptions" => Ok(StatementKind::Assumptions),
            _ => Err(DashboardError::InvalidTab(format!("statements/{}", s))),
        }
    }
}

/// Assumptions tagged with the scenario they were requested for.
#[derive(Debug, Clone)]
pub struct ScenarioAssumptions {
    pub scenario: ScenarioId,
    pub data: AssumptionsResponse,
}

pub struct StatementsView {
    kind: Mutex<StatementKind>,
    assumptions: FetchSlot<ScenarioAssumptions>,
}

impl Default for StatementsView {
    fn default() -> Self {
        StatementsView {
            kind: Mutex::new(StatementKind::default()),
            assumptions: FetchSlot::new("statements/assumptions"),
        }
    }
}

impl StatementsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> StatementKind {
        *self.kind.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn select(&self, kind: StatementKind) {
        *self.kind.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = kind;
    }

    pub fn assumptions(&self) -> &FetchSlot<ScenarioAssumptions> {
        &self.assumptions
    }

    /// Fetches assumptions for `scenario` unless they are already shown or
    /// loading for that scenario.
    pub async fn ensure_assumptions(&self, client: &ApiClient, scenario: ScenarioId) -> bool {
        if self.assumptions.covers(scenario.as_str()) {
            return false;
        }
        self.load_assumptions(client, scenario).await
    }

    pub async fn load_assumptions(&self, client: &ApiClient, scenario: ScenarioId) -> bool {
        self.assumptions
            .load_for(scenario.as_str(), fetch_assumptions(client, scenario))
            .await
    }

    pub fn teardown(&self) {
        self.assumptions.teardown();
    }

    fn render_assumptions(&self, scenario: ScenarioId) -> String {
        let state = self.assumptions.state_for(scenario.as_str());
        let latest = self.assumptions.latest().filter(|a| a.scenario == scenario);
        let Some(assumptions) = latest else {
            return slot_status(&state, "Assumptions")
                .unwrap_or_else(|| "Loading assumptions...\n".to_string());
        };
        let mut out = String::new();
        if let Some(error) = state.error() {
            out.push_str(&error_banner(error));
        }

        let rows = &assumptions.data.assumptions;
        let mut headers = vec!["Assumption".to_string()];
        headers.extend(rows.iter().map(|a| year_label(a.year)));
        let mut table = TextTable::new(headers);
        table
            .row(line("Deliveries", rows.iter().map(|a| format_count(a.total_deliveries))))
            .row(line("Average Selling Price", rows.iter().map(|a| format_currency(a.average_selling_price))))
            .row(line("Automotive Growth", rows.iter().map(|a| format_percent(a.automotive_revenue_growth))))
            .row(line("Automotive Gross Margin", rows.iter().map(|a| format_percent(a.gross_margin_automotive))))
            .row(line("R&D % Revenue", rows.iter().map(|a| format_percent(a.rd_as_percent_revenue))))
            .row(line("CapEx % Revenue", rows.iter().map(|a| format_percent(a.capex_as_percent_revenue))))
            .row(line("Tax Rate", rows.iter().map(|a| format_percent(a.tax_rate))));
        out.push_str(&table.render());
        out
    }
}

async fn fetch_assumptions(client: &ApiClient, scenario: ScenarioId) -> Result<ScenarioAssumptions> {
    let data = client.assumptions(scenario).await?;
    Ok(ScenarioAssumptions { scenario, data })
}

fn line(label: &str, cells: impl Iterator<Item = String>) -> Vec<String> {
    std::iter::once(label.to_string()).chain(cells).collect()
}

fn year_headers(model: &FinancialModel, columns: usize) -> Vec<String> {
    std::iter::once("(USD)".to_string())
        .chain((0..columns).map(|i| year_label(model.year_at(i))))
        .collect()
}

pub fn income_table(model: &FinancialModel) -> TextTable {
    let rows = &model.income_statements;
    let mut table = TextTable::new(year_headers(model, rows.len()));
    table
        .row(line("Automotive Revenue", rows.iter().map(|s| format_currency(s.automotive_revenue))))
        .row(line("Energy & Services Revenue", rows.iter().map(|s| format_currency(s.services_revenue))))
        .row(line("Total Revenue", rows.iter().map(|s| format_currency(s.total_revenue))))
        .row(line("Cost of Revenue", rows.iter().map(|s| format_currency(s.total_cogs))))
        .row(line("Gross Profit", rows.iter().map(|s| format_currency(s.total_gross_profit))))
        .row(line("Gross Margin", rows.iter().map(|s| format_percent(s.gross_margin))))
        .row(line("Research & Development", rows.iter().map(|s| format_currency(s.research_development))))
        .row(line("SG&A", rows.iter().map(|s| format_currency(s.selling_general_admin))))
        .row(line("Operating Income", rows.iter().map(|s| format_currency(s.operating_income))))
        .row(line("Operating Margin", rows.iter().map(|s| format_percent(s.operating_margin))))
        .row(line("Income Tax", rows.iter().map(|s| format_currency(s.income_tax_expense))))
        .row(line("Net Income", rows.iter().map(|s| format_currency(s.net_income))))
        .row(line("Net Margin", rows.iter().map(|s| format_percent(s.net_margin))))
        .row(line(
            "EPS",
            rows.iter()
                .map(|s| s.earnings_per_share.map(|v| format!("${:.2}", v)).unwrap_or_else(|| "N/A".to_string())),
        ));
    table
}

pub fn balance_table(model: &FinancialModel) -> TextTable {
    let rows = &model.balance_sheets;
    let mut table = TextTable::new(year_headers(model, rows.len()));
    table
        .row(line("Cash & Equivalents", rows.iter().map(|b| format_currency(b.cash_and_equivalents))))
        .row(line("Accounts Receivable", rows.iter().map(|b| format_currency(b.accounts_receivable))))
        .row(line("Inventory", rows.iter().map(|b| format_currency(b.inventory))))
        .row(line("Total Current Assets", rows.iter().map(|b| format_currency(b.total_current_assets))))
        .row(line("Net PP&E", rows.iter().map(|b| format_currency(b.net_ppe))))
        .row(line("Total Assets", rows.iter().map(|b| format_currency(b.total_assets))))
        .row(line("Accounts Payable", rows.iter().map(|b| format_currency(b.accounts_payable))))
        .row(line("Total Current Liabilities", rows.iter().map(|b| format_currency(b.total_current_liabilities))))
        .row(line("Long-term Debt", rows.iter().map(|b| format_currency(b.long_term_debt))))
        .row(line("Total Liabilities", rows.iter().map(|b| format_currency(b.total_liabilities))))
        .row(line("Shareholders' Equity", rows.iter().map(|b| format_currency(b.total_shareholders_equity))))
        .row(line("Total Liabilities & Equity", rows.iter().map(|b| format_currency(b.total_liab_and_equity))));
    table
}

pub fn cash_flow_table(model: &FinancialModel) -> TextTable {
    let rows = &model.cash_flow_statements;
    let mut table = TextTable::new(year_headers(model, rows.len()));
    table
        .row(line("Net Income", rows.iter().map(|c| format_currency(c.net_income))))
        .row(line("Depreciation & Amortization", rows.iter().map(|c| format_currency(c.depreciation_amortization))))
        .row(line("Operating Cash Flow", rows.iter().map(|c| format_currency(c.operating_cash_flow))))
        .row(line("Capital Expenditures", rows.iter().map(|c| format_currency(c.capital_expenditures))))
        .row(line("Investing Cash Flow", rows.iter().map(|c| format_currency(c.investing_cash_flow))))
        .row(line("Financing Cash Flow", rows.iter().map(|c| format_currency(c.financing_cash_flow))))
        .row(line("Net Change in Cash", rows.iter().map(|c| format_currency(c.net_change_cash))))
        .row(line("Ending Cash", rows.iter().map(|c| format_currency(c.ending_cash))))
        .row(line("Free Cash Flow", rows.iter().map(|c| format_currency(c.free_cash_flow))));
    table
}

impl ScenarioView for StatementsView {
    fn tab(&self) -> TabId {
        TabId::Statements
    }

    fn render_model(&self, props: &ScenarioViewProps, model: &FinancialModel) -> String {
        let kind = self.kind();
        let mut out = format!("{} - {}\n", kind.title(), props.scenario.label());
        let body = match kind {
            StatementKind::Income => income_table(model).render(),
            StatementKind::Balance => balance_table(model).render(),
            StatementKind::CashFlow => cash_flow_table(model).render(),
            StatementKind::Assumptions => self.render_assumptions(props.scenario),
        };
        out.push_str(&body);
        out
    }
}
