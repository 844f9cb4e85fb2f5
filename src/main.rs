// src/main.rs
use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use tesla_dashboard::{routes, DashboardConfig, Shell};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the dashboard...");

    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    info!("Using analysis API at {}", config.api_url);

    let shell = Arc::new(Shell::from_config(&config));
    match shell.client().health().await {
        Ok(body) => info!("Analysis API is up: {}", body),
        Err(e) => warn!("Analysis API health check failed: {}", e),
    }
    if !shell.mount().await {
        warn!("Initial overview fetch did not complete");
    }

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(shell.clone()).with(cors);
    info!("Routes configured successfully with CORS.");

    let (_, server) = warp::serve(api).bind_with_graceful_shutdown(addr, async {
        tokio::signal::ctrl_c().await.ok();
    });
    info!("Starting server on {}", addr);
    server.await;

    shell.teardown();
    info!("Server stopped");
    Ok(())
}
