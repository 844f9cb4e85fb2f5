//! Mock analysis backend shared by the integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tesla_dashboard::models::ScenarioId;
use tesla_dashboard::{ApiClient, Shell};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Path and arrival time of every recorded request, in arrival order.
pub type Arrivals = Arc<Mutex<Vec<(String, Instant)>>>;

pub fn arrivals() -> Arrivals {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn arrived_paths(arrivals: &Arrivals) -> Vec<String> {
    arrivals.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
}

struct Recorded {
    arrivals: Arrivals,
    template: ResponseTemplate,
}

impl Respond for Recorded {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals
            .lock()
            .unwrap()
            .push((request.url.path().to_string(), Instant::now()));
        self.template.clone()
    }
}

pub fn sample_model(scenario: ScenarioId, price: f64) -> Value {
    json!({
        "scenario": scenario.as_str(),
        "model_name": format!("Tesla {} Model", scenario.label()),
        "forecast_years": [2025, 2026],
        "income_statements": [
            {
                "year": 2025,
                "automotive_revenue": 90_000_000_000.0,
                "services_revenue": 15_000_000_000.0,
                "total_revenue": 105_000_000_000.0,
                "gross_margin": 0.19,
                "net_income": 9_000_000_000.0,
                "net_margin": 0.0857,
                "interest_income": 1_200_000_000.0
            },
            {
                "year": 2026,
                "automotive_revenue": 101_000_000_000.0,
                "services_revenue": 19_000_000_000.0,
                "total_revenue": 120_000_000_000.0,
                "gross_margin": 0.2,
                "net_income": 11_500_000_000.0,
                "net_margin": 0.0958
            }
        ],
        "balance_sheets": [{"year": 2025, "total_assets": 130_000_000_000.0}],
        "cash_flow_statements": [
            {"year": 2025, "operating_cash_flow": 15_000_000_000.0, "free_cash_flow": 6_000_000_000.0},
            {"year": 2026, "operating_cash_flow": 18_000_000_000.0, "free_cash_flow": 8_000_000_000.0}
        ],
        "dcf_valuation": {
            "wacc": 0.105,
            "terminal_growth_rate": 0.03,
            "projected_free_cash_flows": [6_000_000_000.0, 8_000_000_000.0],
            "enterprise_value": 780_000_000_000.0,
            "equity_value": 800_000_000_000.0,
            "price_per_share": price
        },
        "assumptions": [{"year": 2025, "tax_rate": 0.21}]
    })
}

pub fn model_ok(scenario: ScenarioId, price: f64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "message": format!("Generated {} model", scenario),
        "model": sample_model(scenario, price),
    }))
}

pub fn model_rejected(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": message}))
}

pub fn model_path(scenario: ScenarioId) -> String {
    format!("/api/tesla/model/{}", scenario)
}

/// Answers `POST /api/tesla/model/{scenario}` with `template`, recording arrivals.
pub async fn mount_model(server: &MockServer, arrivals: &Arrivals, scenario: ScenarioId, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(model_path(scenario)))
        .respond_with(Recorded {
            arrivals: arrivals.clone(),
            template,
        })
        .mount(server)
        .await;
}

/// Same as [`mount_model`] but only for the first `times` requests.
pub async fn mount_model_times(
    server: &MockServer,
    arrivals: &Arrivals,
    scenario: ScenarioId,
    template: ResponseTemplate,
    times: u64,
) {
    Mock::given(method("POST"))
        .and(path(model_path(scenario)))
        .respond_with(Recorded {
            arrivals: arrivals.clone(),
            template,
        })
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Every scenario answers successfully after `delay`, priced 300/250/150.
pub async fn mount_all_models(server: &MockServer, arrivals: &Arrivals, delay: Duration) {
    for (scenario, price) in [(ScenarioId::Best, 300.0), (ScenarioId::Base, 250.0), (ScenarioId::Worst, 150.0)] {
        mount_model(server, arrivals, scenario, model_ok(scenario, price).set_delay(delay)).await;
    }
}

pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn overview_body() -> Value {
    json!({
        "tesla_base_data": {
            "total_deliveries": 1_808_581,
            "total_revenue": 96_773_000_000.0,
            "automotive_revenue": 82_419_000_000.0,
            "services_revenue": 14_354_000_000.0,
            "net_income": 14_997_000_000.0,
            "shares_outstanding": 3_178_000_000.0
        },
        "macro_assumptions": {"risk_free_rate": 0.045, "tesla_beta": 2.3},
        "model_description": "Three-statement model with DCF valuation",
        "scenarios": ["best", "base", "worst"],
        "forecast_years": [2025, 2026, 2027, 2028, 2029]
    })
}

pub fn sensitivity_body(scenario: ScenarioId) -> Value {
    json!({
        "scenario": scenario.as_str(),
        "base_valuation": 250.0,
        "sensitivity_analysis": {
            "growth_rates": [0.02, 0.03],
            "wacc_rates": [0.09, 0.11],
            "price_matrix": [[280.0, 333.33], [210.0, 240.5]]
        },
        "key_assumptions": {"terminal_growth_rate": 0.03, "wacc": 0.105}
    })
}

pub fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri())
}

pub fn shell(server: &MockServer) -> Shell {
    Shell::new(client(server), Duration::from_millis(10))
}
