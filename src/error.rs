// src/error.rs
use crate::models::ScenarioId;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid scenario '{0}'. Use 'best', 'base', or 'worst'")]
    InvalidScenario(String),

    #[error("Unknown tab '{0}'")]
    InvalidTab(String),

    #[error("Unknown forecast type '{0}'. Use 'univariate' or 'multivariate'")]
    InvalidForecastType(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("a generation request for the {0} scenario is already in flight")]
    GenerationInFlight(ScenarioId),

    #[error("model generation is already running")]
    Busy,

    #[error("cancelled before the request was issued")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// Message shown in a view's inline error banner.
    pub fn banner(&self) -> String {
        match self {
            DashboardError::Http { status, .. } => format!("Request failed with status {}", status),
            DashboardError::Network(_) => "Unable to reach the analysis server".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
