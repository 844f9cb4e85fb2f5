// src/lib.rs
pub mod config;
pub mod error;
pub mod formatters;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod shell;
pub mod views;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use services::api_client::ApiClient;
pub use services::cache::ScenarioModelCache;
pub use services::orchestrator::{FetchOrchestrator, GenerationReport, OutcomeStatus};
pub use shell::Shell;
