// src/views/data_overview.rs
use serde_json::Value;

use crate::error::{DashboardError, Result};
use crate::formatters::{format_count, format_date, format_large_number};
use crate::models::{AnalyticsOverview, EconomicVariables};
use crate::services::api_client::ApiClient;
use crate::views::{error_banner, slot_status, FetchSlot, TextTable};

/// Variance breakdown and the list of economic indicators. Both datasets are
/// independent of the scenario cache and of each other.
pub struct DataOverviewView {
    overview: FetchSlot<AnalyticsOverview>,
    economic: FetchSlot<EconomicVariables>,
}

impl Default for DataOverviewView {
    fn default() -> Self {
        DataOverviewView {
            overview: FetchSlot::new("data-overview/overview"),
            economic: FetchSlot::new("data-overview/economic-variables"),
        }
    }
}

impl DataOverviewView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overview(&self) -> &FetchSlot<AnalyticsOverview> {
        &self.overview
    }

    pub fn economic(&self) -> &FetchSlot<EconomicVariables> {
        &self.economic
    }

    /// Runs both fetches concurrently; each settles its own slot.
    pub async fn load(&self, client: &ApiClient) {
        tokio::join!(
            self.overview.load(fetch_overview(client)),
            self.economic.load(fetch_economic_variables(client)),
        );
    }

    pub fn teardown(&self) {
        self.overview.teardown();
        self.economic.teardown();
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Data Overview\n");
        out.push_str(&self.render_overview());
        out.push('\n');
        out.push_str(&self.render_economic());
        out
    }

    fn render_overview(&self) -> String {
        let state = self.overview.state();
        let Some(data) = self.overview.latest() else {
            return slot_status(&state, "Analytics overview").unwrap_or_default();
        };
        let mut out = String::new();
        if let Some(error) = state.error() {
            out.push_str(&error_banner(error));
        }
        out.push_str(&format!(
            "Total actual {}  |  Total plan {}  |  Variance {}\n",
            format_large_number(data.total_actual),
            format_large_number(data.total_plan),
            variance(data.total_variance)
        ));

        if !data.profile_breakdown.is_empty() {
            let mut table = TextTable::new(["Profile", "Actual", "Plan", "Variance", "Records"]);
            for p in &data.profile_breakdown {
                table.row([
                    p.profile.clone().unwrap_or_else(|| "N/A".to_string()),
                    format_large_number(p.actual),
                    format_large_number(p.plan),
                    variance(p.variance),
                    format_count(p.records.map(|r| r as f64)),
                ]);
            }
            out.push('\n');
            out.push_str(&table.render());
        }

        if !data.lineup_breakdown.is_empty() {
            let mut table = TextTable::new(["Lineup", "Actual", "Plan", "Variance", "Records"]);
            for l in &data.lineup_breakdown {
                table.row([
                    l.lineup.clone().unwrap_or_else(|| "N/A".to_string()),
                    format_large_number(l.actual),
                    format_large_number(l.plan),
                    variance(l.variance),
                    format_count(l.records.map(|r| r as f64)),
                ]);
            }
            out.push('\n');
            out.push_str(&table.render());
        }
        out
    }

    fn render_economic(&self) -> String {
        let state = self.economic.state();
        let Some(data) = self.economic.latest() else {
            return slot_status(&state, "Economic variables").unwrap_or_default();
        };
        let mut out = String::new();
        if let Some(error) = state.error() {
            out.push_str(&error_banner(error));
        }
        out.push_str(&format!("Economic variables ({})\n", data.variables.len()));
        for name in &data.variables {
            out.push_str(&format!("  - {}\n", name));
        }
        let dates: Vec<&str> = data
            .monthly_data
            .iter()
            .filter_map(|row| row.get("DATE").and_then(Value::as_str))
            .collect();
        if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
            out.push_str(&format!(
                "{} months of data, {} to {}\n",
                dates.len(),
                format_date(first),
                format_date(last)
            ));
        }
        out
    }
}

/// Variances arrive in percent units already.
fn variance(value: Option<f64>) -> String {
    format!("{:.1}%", value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

async fn fetch_overview(client: &ApiClient) -> Result<AnalyticsOverview> {
    let response = client.analytics_overview().await?;
    if !response.success {
        return Err(DashboardError::Rejected("analytics overview is unavailable".to_string()));
    }
    Ok(response.data)
}

async fn fetch_economic_variables(client: &ApiClient) -> Result<EconomicVariables> {
    let response = client.economic_variables().await?;
    if !response.success {
        return Err(DashboardError::Rejected("economic variables are unavailable".to_string()));
    }
    Ok(response.data)
}
