// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

use crate::error::DashboardError;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn external_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        match &e {
            DashboardError::InvalidScenario(_)
            | DashboardError::InvalidTab(_)
            | DashboardError::InvalidForecastType(_)
            | DashboardError::InvalidParameter(_) => ApiError::bad_request(e.to_string()),
            DashboardError::GenerationInFlight(_) | DashboardError::Busy => ApiError::conflict(e.to_string()),
            DashboardError::Network(_)
            | DashboardError::Http { .. }
            | DashboardError::Decode(_)
            | DashboardError::Rejected(_) => ApiError::external_error(e.banner()),
            DashboardError::Cancelled => ApiError::unavailable(e.to_string()),
            DashboardError::Config(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
