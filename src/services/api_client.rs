// src/services/api_client.rs
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{normalize_base_url, DashboardConfig, API_PREFIX};
use crate::error::{DashboardError, Result};
use crate::models::{
    AnalyticsOverviewResponse, AssumptionsResponse, ComparisonResponse, EconomicVariablesResponse,
    ForecastComparisonRequest, ForecastComparisonResponse, ForecastRequest, ForecastResponse,
    GenerateModelResponse, LineupsResponse, ScenarioId, SensitivityResponse, TeslaOverview,
    VehicleDataResponse,
};

/// Thin JSON client for the analysis backend. Every path is relative to
/// `{base_url}/api`; failures are returned as-is, nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        ApiClient {
            base_url: normalize_base_url(base_url.as_ref()),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(&config.api_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}{}/{}", self.base_url, API_PREFIX, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        info!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        info!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!("Request failed with {}: {}", status, text);
            return Err(DashboardError::Http { status, body: text });
        }
        Ok(serde_json::from_str(&text)?)
    }

    // -- Tesla model endpoints ----------------------------------------------

    pub async fn health(&self) -> Result<Value> {
        self.get("/").await
    }

    pub async fn overview(&self) -> Result<TeslaOverview> {
        self.get("/tesla/overview").await
    }

    pub async fn generate_model(&self, scenario: ScenarioId) -> Result<GenerateModelResponse> {
        // The scenario travels in the path; the body is an empty object.
        self.post(&format!("/tesla/model/{}", scenario), &json!({})).await
    }

    pub async fn sensitivity(&self, scenario: ScenarioId) -> Result<SensitivityResponse> {
        self.get(&format!("/tesla/sensitivity/{}", scenario)).await
    }

    pub async fn assumptions(&self, scenario: ScenarioId) -> Result<AssumptionsResponse> {
        self.get(&format!("/tesla/assumptions/{}", scenario)).await
    }

    pub async fn comparison(&self) -> Result<ComparisonResponse> {
        self.get("/tesla/comparison").await
    }

    pub async fn vehicle_data(&self) -> Result<VehicleDataResponse> {
        self.get("/tesla/test-enhanced").await
    }

    // -- Analytics endpoints ------------------------------------------------

    pub async fn analytics_overview(&self) -> Result<AnalyticsOverviewResponse> {
        self.get("/analytics/overview").await
    }

    pub async fn economic_variables(&self) -> Result<EconomicVariablesResponse> {
        self.get("/analytics/economic-variables").await
    }

    pub async fn lineups(&self) -> Result<LineupsResponse> {
        self.get("/analytics/lineups").await
    }

    pub async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResponse> {
        self.post("/analytics/forecast", request).await
    }

    pub async fn compare_forecasts(&self, request: &ForecastComparisonRequest) -> Result<ForecastComparisonResponse> {
        self.post("/analytics/compare-forecasts", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_joined_under_the_api_prefix() {
        let client = ApiClient::new("http://localhost:8001/");
        assert_eq!(client.base_url(), "http://localhost:8001");
        assert_eq!(client.url("/tesla/overview"), "http://localhost:8001/api/tesla/overview");
        assert_eq!(client.url("analytics/lineups"), "http://localhost:8001/api/analytics/lineups");
        assert_eq!(client.url("/"), "http://localhost:8001/api/");
    }
}
