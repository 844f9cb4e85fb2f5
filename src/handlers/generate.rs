// src/handlers/generate.rs
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use warp::Rejection;

use super::error::ApiError;
use crate::models::ScenarioId;
use crate::shell::Shell;

pub async fn generate_scenario(scenario: String, shell: Arc<Shell>) -> Result<impl warp::Reply, Rejection> {
    let scenario = scenario
        .parse::<ScenarioId>()
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;
    info!("Handling request to generate the {} scenario", scenario);

    match shell.generate(scenario).await {
        Ok(model) => Ok(warp::reply::json(&json!({
            "success": true,
            "scenario": scenario,
            "model_name": model.model_name,
            "price_per_share": model.price_per_share(),
        }))),
        Err(e) => {
            error!("Failed to generate {} scenario: {}", scenario, e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

pub async fn generate_all(shell: Arc<Shell>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling request to generate all scenarios");
    match shell.generate_all().await {
        Ok(report) => Ok(warp::reply::json(&json!({
            "success": report.all_succeeded(),
            "outcomes": report.outcomes,
            "scenarios_present": shell.cache().present_scenarios(),
        }))),
        Err(e) => {
            error!("Generate-all refused: {}", e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}
