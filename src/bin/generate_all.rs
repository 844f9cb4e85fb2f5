// src/bin/generate_all.rs
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

use tesla_dashboard::formatters::format_currency;
use tesla_dashboard::models::ScenarioId;
use tesla_dashboard::{ApiClient, DashboardConfig, FetchOrchestrator, OutcomeStatus, ScenarioModelCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = DashboardConfig::from_env()?;
    info!("Generating all scenarios against {}", config.api_url);

    let cache = Arc::new(ScenarioModelCache::new());
    let orchestrator = FetchOrchestrator::new(ApiClient::from_config(&config), cache.clone(), config.pacing);
    let report = orchestrator.generate_all().await?;

    for outcome in &report.outcomes {
        match outcome.status {
            OutcomeStatus::Succeeded => {
                let price = cache.get(outcome.scenario).and_then(|m| m.price_per_share());
                println!("{:<12} ok      price per share {}", outcome.scenario.label(), format_currency(price));
            }
            OutcomeStatus::Failed => println!(
                "{:<12} failed  {}",
                outcome.scenario.label(),
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
            OutcomeStatus::Cancelled => println!("{:<12} cancelled", outcome.scenario.label()),
        }
    }

    if !report.all_succeeded() {
        anyhow::bail!(
            "{} of {} scenarios were not generated",
            ScenarioId::ALL.len() - report.succeeded().len(),
            ScenarioId::ALL.len()
        );
    }
    Ok(())
}
