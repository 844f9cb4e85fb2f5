// src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioId {
    Best,
    Base,
    Worst,
}

impl ScenarioId {
    /// Fixed generation order.
    pub const ALL: [ScenarioId; 3] = [ScenarioId::Best, ScenarioId::Base, ScenarioId::Worst];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioId::Best => "best",
            ScenarioId::Base => "base",
            ScenarioId::Worst => "worst",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioId::Best => "Best Case",
            ScenarioId::Base => "Base Case",
            ScenarioId::Worst => "Worst Case",
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScenarioId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(ScenarioId::Best),
            "base" => Ok(ScenarioId::Base),
            "worst" => Ok(ScenarioId::Worst),
            _ => Err(DashboardError::InvalidScenario(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabId {
    Overview,
    VehicleModels,
    Statements,
    Dcf,
    Segments,
    Bridge,
    Comparison,
    DataOverview,
    Forecast,
}

impl TabId {
    pub const ALL: [TabId; 9] = [
        TabId::Overview,
        TabId::VehicleModels,
        TabId::Statements,
        TabId::Dcf,
        TabId::Segments,
        TabId::Bridge,
        TabId::Comparison,
        TabId::DataOverview,
        TabId::Forecast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TabId::Overview => "overview",
            TabId::VehicleModels => "vehicle-models",
            TabId::Statements => "statements",
            TabId::Dcf => "dcf",
            TabId::Segments => "segments",
            TabId::Bridge => "bridge",
            TabId::Comparison => "comparison",
            TabId::DataOverview => "data-overview",
            TabId::Forecast => "forecast",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TabId::Overview => "Overview",
            TabId::VehicleModels => "Vehicle Models",
            TabId::Statements => "Statements",
            TabId::Dcf => "DCF",
            TabId::Segments => "Segments",
            TabId::Bridge => "Bridge",
            TabId::Comparison => "Comparison",
            TabId::DataOverview => "Data Overview",
            TabId::Forecast => "Forecast",
        }
    }

    /// Tabs that render from the scenario model cache.
    pub fn reads_scenario_cache(&self) -> bool {
        matches!(
            self,
            TabId::Overview
                | TabId::Statements
                | TabId::Dcf
                | TabId::Segments
                | TabId::Bridge
                | TabId::Comparison
        )
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TabId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TabId::ALL
            .iter()
            .copied()
            .find(|tab| tab.as_str() == wanted)
            .ok_or_else(|| DashboardError::InvalidTab(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Financial model, as returned by POST /tesla/model/{scenario}
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub automotive_revenue: Option<f64>,
    #[serde(default)]
    pub services_revenue: Option<f64>,
    #[serde(default)]
    pub total_revenue: Option<f64>,
    #[serde(default)]
    pub total_cogs: Option<f64>,
    #[serde(default)]
    pub automotive_gross_profit: Option<f64>,
    #[serde(default)]
    pub services_gross_profit: Option<f64>,
    #[serde(default)]
    pub total_gross_profit: Option<f64>,
    #[serde(default)]
    pub gross_margin: Option<f64>,
    #[serde(default)]
    pub research_development: Option<f64>,
    #[serde(default)]
    pub selling_general_admin: Option<f64>,
    #[serde(default)]
    pub operating_income: Option<f64>,
    #[serde(default)]
    pub operating_margin: Option<f64>,
    #[serde(default)]
    pub income_tax_expense: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub net_margin: Option<f64>,
    #[serde(default)]
    pub earnings_per_share: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub cash_and_equivalents: Option<f64>,
    #[serde(default)]
    pub accounts_receivable: Option<f64>,
    #[serde(default)]
    pub inventory: Option<f64>,
    #[serde(default)]
    pub total_current_assets: Option<f64>,
    #[serde(default)]
    pub net_ppe: Option<f64>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub accounts_payable: Option<f64>,
    #[serde(default)]
    pub total_current_liabilities: Option<f64>,
    #[serde(default)]
    pub long_term_debt: Option<f64>,
    #[serde(default)]
    pub total_liabilities: Option<f64>,
    #[serde(default)]
    pub total_shareholders_equity: Option<f64>,
    #[serde(default)]
    pub total_liab_and_equity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CashFlowStatement {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub depreciation_amortization: Option<f64>,
    #[serde(default)]
    pub operating_cash_flow: Option<f64>,
    #[serde(default)]
    pub capital_expenditures: Option<f64>,
    #[serde(default)]
    pub investing_cash_flow: Option<f64>,
    #[serde(default)]
    pub financing_cash_flow: Option<f64>,
    #[serde(default)]
    pub net_change_cash: Option<f64>,
    #[serde(default)]
    pub ending_cash: Option<f64>,
    #[serde(default)]
    pub free_cash_flow: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DcfValuation {
    #[serde(default)]
    pub cost_of_equity: Option<f64>,
    #[serde(default)]
    pub cost_of_debt: Option<f64>,
    #[serde(default)]
    pub wacc: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projected_free_cash_flows: Vec<f64>,
    #[serde(default)]
    pub terminal_growth_rate: Option<f64>,
    #[serde(default)]
    pub terminal_value: Option<f64>,
    #[serde(default)]
    pub present_value_terminal: Option<f64>,
    #[serde(default)]
    pub present_value_cash_flows: Option<f64>,
    #[serde(default)]
    pub enterprise_value: Option<f64>,
    #[serde(default)]
    pub net_cash: Option<f64>,
    #[serde(default)]
    pub equity_value: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub price_per_share: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full model for one scenario. Fields the dashboard does not render are kept
/// in `extra` so the cached value matches the response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialModel {
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forecast_years: Vec<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub income_statements: Vec<IncomeStatement>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub balance_sheets: Vec<BalanceSheet>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cash_flow_statements: Vec<CashFlowStatement>,
    #[serde(default)]
    pub dcf_valuation: Option<DcfValuation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FinancialModel {
    pub fn price_per_share(&self) -> Option<f64> {
        self.dcf_valuation.as_ref().and_then(|d| d.price_per_share)
    }

    /// Year label for statement column `index`, falling back to the model's
    /// forecast year list.
    pub fn year_at(&self, index: usize) -> Option<i32> {
        self.income_statements
            .get(index)
            .and_then(|s| s.year)
            .or_else(|| self.forecast_years.get(index).copied())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateModelResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model: Option<FinancialModel>,
}

// ---------------------------------------------------------------------------
// Tesla endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeslaBaseData {
    #[serde(default)]
    pub total_deliveries: Option<f64>,
    #[serde(default)]
    pub total_revenue: Option<f64>,
    #[serde(default)]
    pub automotive_revenue: Option<f64>,
    #[serde(default)]
    pub services_revenue: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub cash_and_equivalents: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MacroAssumptions {
    #[serde(default)]
    pub global_ev_market_growth: Option<f64>,
    #[serde(default)]
    pub inflation_rate: Option<f64>,
    #[serde(default)]
    pub risk_free_rate: Option<f64>,
    #[serde(default)]
    pub market_risk_premium: Option<f64>,
    #[serde(default)]
    pub tesla_beta: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeslaOverview {
    #[serde(default)]
    pub tesla_base_data: TeslaBaseData,
    #[serde(default)]
    pub macro_assumptions: MacroAssumptions,
    #[serde(default)]
    pub model_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scenarios: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forecast_years: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensitivityGrid {
    #[serde(default, deserialize_with = "null_as_default")]
    pub growth_rates: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wacc_rates: Vec<f64>,
    /// Rows follow `wacc_rates`, columns follow `growth_rates`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyAssumptions {
    #[serde(default)]
    pub terminal_growth_rate: Option<f64>,
    #[serde(default)]
    pub wacc: Option<f64>,
    #[serde(default)]
    pub final_year_fcf: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensitivityResponse {
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub base_valuation: Option<f64>,
    #[serde(default)]
    pub sensitivity_analysis: SensitivityGrid,
    #[serde(default)]
    pub key_assumptions: KeyAssumptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueComparison {
    #[serde(default, rename = "2029_revenue", alias = "final_revenue")]
    pub final_revenue: Option<f64>,
    #[serde(default, rename = "5yr_cagr", alias = "revenue_cagr")]
    pub revenue_cagr: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValuationComparison {
    #[serde(default)]
    pub price_per_share: Option<f64>,
    #[serde(default)]
    pub enterprise_value: Option<f64>,
    #[serde(default)]
    pub wacc: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarginComparison {
    #[serde(default, rename = "2029_gross_margin", alias = "gross_margin")]
    pub gross_margin: Option<f64>,
    #[serde(default, rename = "2029_operating_margin", alias = "operating_margin")]
    pub operating_margin: Option<f64>,
    #[serde(default, rename = "2029_net_margin", alias = "net_margin")]
    pub net_margin: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComparisonSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue_comparison: BTreeMap<String, RevenueComparison>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valuation_comparison: BTreeMap<String, ValuationComparison>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub margin_comparison: BTreeMap<String, MarginComparison>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComparisonResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub comparison_summary: ComparisonSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_insights: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleModel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub base_asp: Option<f64>,
    #[serde(default)]
    pub margin_premium: Option<f64>,
    #[serde(default)]
    pub max_capacity: Option<f64>,
    #[serde(default)]
    pub growth_trajectory: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleDataResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Keyed by model code (`model_y`, `cybertruck`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub vehicle_models: BTreeMap<String, VehicleModel>,
    /// Year → model code → deliveries.
    #[serde(default, deserialize_with = "null_as_default")]
    pub historical_deliveries: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioAssumption {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub total_deliveries: Option<f64>,
    #[serde(default)]
    pub average_selling_price: Option<f64>,
    #[serde(default)]
    pub automotive_revenue_growth: Option<f64>,
    #[serde(default)]
    pub gross_margin_automotive: Option<f64>,
    #[serde(default)]
    pub rd_as_percent_revenue: Option<f64>,
    #[serde(default)]
    pub capex_as_percent_revenue: Option<f64>,
    #[serde(default)]
    pub tax_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssumptionsResponse {
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assumptions: Vec<ScenarioAssumption>,
}

// ---------------------------------------------------------------------------
// Analytics endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileBreakdown {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub plan: Option<f64>,
    /// Already in percent units.
    #[serde(default)]
    pub variance: Option<f64>,
    #[serde(default)]
    pub records: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineupBreakdown {
    #[serde(default)]
    pub lineup: Option<String>,
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub plan: Option<f64>,
    #[serde(default)]
    pub variance: Option<f64>,
    #[serde(default)]
    pub records: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsOverview {
    #[serde(default)]
    pub total_actual: Option<f64>,
    #[serde(default)]
    pub total_plan: Option<f64>,
    #[serde(default)]
    pub total_variance: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_breakdown: Vec<ProfileBreakdown>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lineup_breakdown: Vec<LineupBreakdown>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsOverviewResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: AnalyticsOverview,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EconomicVariables {
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub monthly_data: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EconomicVariablesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: EconomicVariables,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Lineup {
    pub lineup: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub total_actual: Option<f64>,
    #[serde(default, alias = "records")]
    pub record_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineupsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lineups: Vec<Lineup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastType {
    Univariate,
    Multivariate,
}

impl ForecastType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastType::Univariate => "univariate",
            ForecastType::Multivariate => "multivariate",
        }
    }
}

impl FromStr for ForecastType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "univariate" => Ok(ForecastType::Univariate),
            "multivariate" => Ok(ForecastType::Multivariate),
            _ => Err(DashboardError::InvalidForecastType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRequest {
    pub lineup: String,
    pub forecast_type: ForecastType,
    pub months_ahead: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastComparisonRequest {
    pub lineup: String,
    pub months_ahead: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastPoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub forecast: Option<f64>,
    #[serde(default)]
    pub month_ahead: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub lineup: Option<String>,
    #[serde(default)]
    pub forecast_type: Option<String>,
    #[serde(default, alias = "forecast_values", deserialize_with = "null_as_default")]
    pub forecasts: Vec<ForecastPoint>,
    #[serde(default)]
    pub model_metrics: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub forecast: Forecast,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastComparisonPoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub univariate_forecast: Option<f64>,
    #[serde(default)]
    pub multivariate_forecast: Option<f64>,
    #[serde(default)]
    pub difference: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastComparison {
    #[serde(default)]
    pub lineup: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comparison_data: Vec<ForecastComparisonPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastComparisonResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub comparison: ForecastComparison,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scenario_ids_parse_only_the_closed_set() {
        assert_eq!("best".parse::<ScenarioId>().unwrap(), ScenarioId::Best);
        assert_eq!("Base".parse::<ScenarioId>().unwrap(), ScenarioId::Base);
        assert_eq!(" worst ".parse::<ScenarioId>().unwrap(), ScenarioId::Worst);
        assert!(matches!(
            "optimistic".parse::<ScenarioId>(),
            Err(DashboardError::InvalidScenario(_))
        ));
    }

    #[test]
    fn tabs_round_trip_through_their_names() {
        for tab in TabId::ALL {
            assert_eq!(tab.as_str().parse::<TabId>().unwrap(), tab);
        }
        assert!("settings".parse::<TabId>().is_err());
    }

    #[test]
    fn model_keeps_unrendered_fields() {
        let body = json!({
            "scenario": "base",
            "income_statements": [{"year": 2025, "total_revenue": 1.0, "interest_income": 2.0}],
            "dcf_valuation": {"price_per_share": 245.5, "sensitivity_matrix": [[1.0]]},
            "assumptions": []
        });
        let model: FinancialModel = serde_json::from_value(body).unwrap();
        assert_eq!(model.price_per_share(), Some(245.5));
        assert_eq!(model.income_statements[0].extra["interest_income"], json!(2.0));
        assert!(model.extra.contains_key("assumptions"));
        assert!(model.balance_sheets.is_empty());
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let body = json!({
            "scenario": "worst",
            "forecast_years": null,
            "income_statements": null,
            "balance_sheets": null,
            "cash_flow_statements": null,
            "dcf_valuation": {"price_per_share": 150.0, "projected_free_cash_flows": null}
        });
        let model: FinancialModel = serde_json::from_value(body).unwrap();
        assert!(model.forecast_years.is_empty());
        assert!(model.income_statements.is_empty());
        assert!(model.cash_flow_statements.is_empty());
        assert_eq!(model.price_per_share(), Some(150.0));
        assert!(model.dcf_valuation.unwrap().projected_free_cash_flows.is_empty());
    }

    #[test]
    fn lineup_accepts_records_alias() {
        let lineup: Lineup =
            serde_json::from_value(json!({"lineup": "Cards", "profile": "Retail", "records": 48})).unwrap();
        assert_eq!(lineup.record_count, Some(48));
        assert_eq!(lineup.total_actual, None);
    }

    #[test]
    fn forecast_request_serializes_lowercase_type() {
        let req = ForecastRequest {
            lineup: "Cards".into(),
            forecast_type: ForecastType::Multivariate,
            months_ahead: 12,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"lineup": "Cards", "forecast_type": "multivariate", "months_ahead": 12})
        );
    }
}
