// src/handlers/dashboard.rs
use log::{debug, error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::Rejection;

use super::error::ApiError;
use crate::error::Result as DashboardResult;
use crate::models::{ForecastType, ScenarioId, TabId};
use crate::shell::Shell;
use crate::views::forecast::ForecastParamsUpdate;
use crate::views::statements::StatementKind;

/// Query string accepted by `GET /dashboard/{tab}`.
#[derive(Debug, Default, Deserialize)]
pub struct TabQuery {
    pub scenario: Option<String>,
    /// Statements sub-view.
    pub view: Option<String>,
    pub lineup: Option<String>,
    pub months: Option<u32>,
    #[serde(rename = "type")]
    pub forecast_type: Option<String>,
    pub compare: Option<bool>,
}

fn reject(e: impl Into<ApiError>) -> Rejection {
    let e = e.into();
    error!("Dashboard request failed: {}", e);
    warp::reject::custom(e)
}

/// Parses every field before touching the shell, so a rejected query leaves
/// the selection as it was.
fn apply_query(shell: &Shell, query: TabQuery) -> DashboardResult<()> {
    let scenario = query.scenario.as_deref().map(str::parse::<ScenarioId>).transpose()?;
    let statement = query.view.as_deref().map(str::parse::<StatementKind>).transpose()?;
    let update = ForecastParamsUpdate {
        lineup: query.lineup,
        months_ahead: query.months,
        forecast_type: query.forecast_type.as_deref().map(str::parse::<ForecastType>).transpose()?,
        compare: query.compare,
    };
    update.validate()?;

    if let Some(scenario) = scenario {
        shell.select_scenario(scenario);
    }
    if let Some(statement) = statement {
        shell.select_statement(statement);
    }
    if !update.is_empty() {
        shell.update_forecast(update)?;
    }
    Ok(())
}

pub async fn render_active(shell: Arc<Shell>) -> Result<String, Rejection> {
    info!("Rendering active tab");
    shell.activate().await;
    Ok(shell.render())
}

pub async fn render_tab(tab: String, query: TabQuery, shell: Arc<Shell>) -> Result<String, Rejection> {
    let tab = tab.parse::<TabId>().map_err(reject)?;
    info!("Rendering {} tab", tab);
    debug!("Tab query: {:?}", query);
    apply_query(&shell, query).map_err(reject)?;
    shell.select_tab(tab);
    shell.activate().await;
    Ok(shell.render())
}

pub async fn get_status(shell: Arc<Shell>) -> Result<impl warp::Reply, Rejection> {
    Ok(warp::reply::json(&shell.status()))
}
