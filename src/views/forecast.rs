// src/views/forecast.rs
use log::info;
use std::sync::Mutex;

use crate::error::{DashboardError, Result};
use crate::formatters::{format_date, format_large_number};
use crate::models::{
    Forecast, ForecastComparison, ForecastComparisonRequest, ForecastRequest, ForecastType, Lineup,
};
use crate::services::api_client::ApiClient;
use crate::views::{error_banner, slot_status, FetchSlot, TextTable};

pub const DEFAULT_MONTHS_AHEAD: u32 = 12;
pub const MAX_MONTHS_AHEAD: u32 = 36;

/// User-selected forecast inputs. `lineup` stays unset until the lineup list
/// arrives, then defaults to its first entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastParams {
    pub lineup: Option<String>,
    pub months_ahead: u32,
    pub forecast_type: ForecastType,
    /// Request the univariate vs multivariate comparison instead.
    pub compare: bool,
}

impl ForecastParams {
    /// Identifies a request for these inputs.
    pub fn key(&self) -> String {
        let mode = if self.compare { "compare" } else { self.forecast_type.as_str() };
        format!("{}/{}/{}", self.lineup.as_deref().unwrap_or(""), self.months_ahead, mode)
    }
}

impl Default for ForecastParams {
    fn default() -> Self {
        ForecastParams {
            lineup: None,
            months_ahead: DEFAULT_MONTHS_AHEAD,
            forecast_type: ForecastType::Univariate,
            compare: false,
        }
    }
}

/// Partial update from the route's query string.
#[derive(Debug, Clone, Default)]
pub struct ForecastParamsUpdate {
    pub lineup: Option<String>,
    pub months_ahead: Option<u32>,
    pub forecast_type: Option<ForecastType>,
    pub compare: Option<bool>,
}

impl ForecastParamsUpdate {
    pub fn is_empty(&self) -> bool {
        self.lineup.is_none() && self.months_ahead.is_none() && self.forecast_type.is_none() && self.compare.is_none()
    }

    /// Checks the update without applying it.
    pub fn validate(&self) -> Result<()> {
        if let Some(months) = self.months_ahead {
            if months == 0 || months > MAX_MONTHS_AHEAD {
                return Err(DashboardError::InvalidParameter(format!(
                    "months ahead must be between 1 and {}, got {}",
                    MAX_MONTHS_AHEAD, months
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum ForecastResult {
    Single(Forecast),
    Comparison(ForecastComparison),
}

/// Forecast result tagged with the inputs it was requested for.
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub params: ForecastParams,
    pub result: ForecastResult,
}

pub struct ForecastView {
    params: Mutex<ForecastParams>,
    lineups: FetchSlot<Vec<Lineup>>,
    forecast: FetchSlot<ForecastOutcome>,
}

impl Default for ForecastView {
    fn default() -> Self {
        ForecastView {
            params: Mutex::new(ForecastParams::default()),
            lineups: FetchSlot::new("forecast/lineups"),
            forecast: FetchSlot::new("forecast/forecast"),
        }
    }
}

impl ForecastView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> ForecastParams {
        self.params.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn lineups(&self) -> &FetchSlot<Vec<Lineup>> {
        &self.lineups
    }

    pub fn forecast(&self) -> &FetchSlot<ForecastOutcome> {
        &self.forecast
    }

    /// Applies `update`; returns whether any input actually changed.
    pub fn set_params(&self, update: ForecastParamsUpdate) -> Result<bool> {
        update.validate()?;
        let mut params = self.params.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = params.clone();
        if let Some(lineup) = update.lineup {
            params.lineup = Some(lineup);
        }
        if let Some(months) = update.months_ahead {
            params.months_ahead = months;
        }
        if let Some(forecast_type) = update.forecast_type {
            params.forecast_type = forecast_type;
        }
        if let Some(compare) = update.compare {
            params.compare = compare;
        }
        Ok(*params != before)
    }

    /// Loads the lineup list once, then the forecast for the current inputs.
    pub async fn load(&self, client: &ApiClient) {
        if self.lineups.state().is_idle() {
            self.load_lineups(client).await;
        }
        self.load_forecast(client).await;
    }

    pub async fn load_lineups(&self, client: &ApiClient) -> bool {
        let applied = self.lineups.load(fetch_lineups(client)).await;
        if let Some(lineups) = self.lineups.latest() {
            let mut params = self.params.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if params.lineup.is_none() {
                params.lineup = lineups.first().map(|l| l.lineup.clone());
            }
        }
        applied
    }

    /// Issues the forecast request for the current inputs. Does nothing until
    /// a lineup is known.
    pub async fn load_forecast(&self, client: &ApiClient) -> bool {
        let params = self.params();
        if params.lineup.is_none() {
            return false;
        }
        self.forecast.load_for(params.key(), fetch_forecast(client, params)).await
    }

    /// Like [`ForecastView::load_forecast`], but skips inputs whose request
    /// is already outstanding or shown.
    pub async fn ensure_forecast(&self, client: &ApiClient) -> bool {
        if self.forecast.covers(&self.params().key()) {
            return false;
        }
        self.load_forecast(client).await
    }

    pub fn teardown(&self) {
        self.lineups.teardown();
        self.forecast.teardown();
    }

    pub fn render(&self) -> String {
        let params = self.params();
        let mut out = String::from("Forecast\n");

        let lineup_state = self.lineups.state();
        match self.lineups.latest() {
            Some(lineups) => {
                if let Some(error) = lineup_state.error() {
                    out.push_str(&error_banner(error));
                }
                let names: Vec<&str> = lineups.iter().map(|l| l.lineup.as_str()).collect();
                out.push_str(&format!("Lineups: {}\n", names.join(", ")));
            }
            None => out.push_str(&slot_status(&lineup_state, "Lineups").unwrap_or_default()),
        }

        let mode = if params.compare {
            "univariate vs multivariate".to_string()
        } else {
            params.forecast_type.as_str().to_string()
        };
        out.push_str(&format!(
            "Selected: {} | {} months | {}\n\n",
            params.lineup.as_deref().unwrap_or("N/A"),
            params.months_ahead,
            mode
        ));

        let state = self.forecast.state_for(&params.key());
        let Some(outcome) = self.forecast.latest() else {
            out.push_str(&slot_status(&state, "Forecast").unwrap_or_default());
            return out;
        };
        if state.is_loading() {
            out.push_str("Loading forecast...\n");
        } else if let Some(error) = state.error() {
            out.push_str(&error_banner(error));
        }
        if outcome.params != params {
            out.push_str(&format!(
                "Showing previous result for {} ({} months)\n",
                outcome.params.lineup.as_deref().unwrap_or("N/A"),
                outcome.params.months_ahead
            ));
        }
        out.push_str(&render_result(&outcome.result));
        out
    }
}

fn render_result(result: &ForecastResult) -> String {
    match result {
        ForecastResult::Single(forecast) => {
            let mut table = TextTable::new(["Month", "Forecast"]);
            for point in &forecast.forecasts {
                table.row([format_date(&point.date), format_large_number(point.forecast)]);
            }
            if table.is_empty() {
                return "No forecast values returned.\n".to_string();
            }
            table.render()
        }
        ForecastResult::Comparison(comparison) => {
            let mut table = TextTable::new(["Month", "Univariate", "Multivariate", "Difference"]);
            for point in &comparison.comparison_data {
                table.row([
                    format_date(&point.date),
                    format_large_number(point.univariate_forecast),
                    format_large_number(point.multivariate_forecast),
                    format_large_number(point.difference),
                ]);
            }
            if table.is_empty() {
                return "No comparison values returned.\n".to_string();
            }
            table.render()
        }
    }
}

async fn fetch_lineups(client: &ApiClient) -> Result<Vec<Lineup>> {
    let response = client.lineups().await?;
    if !response.success {
        return Err(DashboardError::Rejected("lineups are unavailable".to_string()));
    }
    Ok(response.lineups)
}

async fn fetch_forecast(client: &ApiClient, params: ForecastParams) -> Result<ForecastOutcome> {
    let lineup = params.lineup.clone().unwrap_or_default();
    let result = if params.compare {
        info!("Comparing forecasts for {} over {} months", lineup, params.months_ahead);
        let response = client
            .compare_forecasts(&ForecastComparisonRequest {
                lineup,
                months_ahead: params.months_ahead,
            })
            .await?;
        if !response.success {
            return Err(DashboardError::Rejected("forecast comparison failed".to_string()));
        }
        ForecastResult::Comparison(response.comparison)
    } else {
        let response = client
            .forecast(&ForecastRequest {
                lineup,
                forecast_type: params.forecast_type,
                months_ahead: params.months_ahead,
            })
            .await?;
        if !response.success {
            return Err(DashboardError::Rejected("forecast failed".to_string()));
        }
        ForecastResult::Single(response.forecast)
    };
    Ok(ForecastOutcome { params, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastPoint;

    #[test]
    fn params_default_to_twelve_month_univariate() {
        let view = ForecastView::new();
        let params = view.params();
        assert_eq!(params.months_ahead, 12);
        assert_eq!(params.forecast_type, ForecastType::Univariate);
        assert!(params.lineup.is_none());
        assert!(!params.compare);
    }

    #[test]
    fn set_params_reports_changes_and_validates_horizon() {
        let view = ForecastView::new();
        assert!(!view.set_params(ForecastParamsUpdate::default()).unwrap());
        assert!(view
            .set_params(ForecastParamsUpdate {
                months_ahead: Some(6),
                ..Default::default()
            })
            .unwrap());
        assert!(!view
            .set_params(ForecastParamsUpdate {
                months_ahead: Some(6),
                ..Default::default()
            })
            .unwrap());
        assert!(view
            .set_params(ForecastParamsUpdate {
                months_ahead: Some(0),
                ..Default::default()
            })
            .is_err());
        assert_eq!(view.params().months_ahead, 6);
    }

    #[tokio::test]
    async fn forecast_is_not_requested_without_a_lineup() {
        let view = ForecastView::new();
        let client = ApiClient::new("http://127.0.0.1:9");
        assert!(!view.load_forecast(&client).await);
        assert!(view.forecast().state().is_idle());
    }

    #[test]
    fn key_distinguishes_every_input() {
        let base = ForecastParams {
            lineup: Some("Cards".into()),
            ..Default::default()
        };
        let longer = ForecastParams { months_ahead: 24, ..base.clone() };
        let multi = ForecastParams { forecast_type: ForecastType::Multivariate, ..base.clone() };
        let compare = ForecastParams { compare: true, ..base.clone() };
        let other = ForecastParams { lineup: Some("Loans".into()), ..base.clone() };
        let keys = [base.key(), longer.key(), multi.key(), compare.key(), other.key()];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(base.key(), base.clone().key());
    }

    #[test]
    fn stale_result_is_labelled_after_parameter_change() {
        let view = ForecastView::new();
        view.set_params(ForecastParamsUpdate {
            lineup: Some("Cards".into()),
            ..Default::default()
        })
        .unwrap();
        let ticket = view.forecast.begin_for(view.params().key()).unwrap();
        view.forecast.finish(
            ticket,
            Ok(ForecastOutcome {
                params: view.params(),
                result: ForecastResult::Single(Forecast {
                    forecasts: vec![ForecastPoint {
                        date: "2025-01-01".into(),
                        forecast: Some(1_250_000.0),
                        month_ahead: Some(1),
                    }],
                    ..Default::default()
                }),
            }),
        );
        let text = view.render();
        assert!(text.contains("Jan 2025"));
        assert!(text.contains("1.2M") || text.contains("1.3M"));
        assert!(!text.contains("Showing previous result"));
        assert!(!text.contains("Loading forecast"));

        view.set_params(ForecastParamsUpdate {
            months_ahead: Some(24),
            ..Default::default()
        })
        .unwrap();
        assert!(view.render().contains("Showing previous result for Cards (12 months)"));
    }
}
