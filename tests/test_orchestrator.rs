mod common;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tesla_dashboard::models::{FinancialModel, ScenarioId};
use tesla_dashboard::{DashboardError, FetchOrchestrator, OutcomeStatus, ScenarioModelCache};
use wiremock::{MockServer, ResponseTemplate};

use common::{
    arrivals, arrived_paths, client, model_ok, model_path, model_rejected, mount_all_models, mount_model,
    mount_model_times, sample_model,
};

fn orchestrator(server: &MockServer, pacing: Duration) -> Arc<FetchOrchestrator> {
    Arc::new(FetchOrchestrator::new(
        client(server),
        Arc::new(ScenarioModelCache::new()),
        pacing,
    ))
}

#[tokio::test]
async fn generate_all_is_sequential_and_paced() {
    let server = MockServer::start().await;
    let hits = arrivals();
    let response_delay = Duration::from_millis(50);
    let pacing = Duration::from_millis(100);
    mount_all_models(&server, &hits, response_delay).await;

    let orchestrator = orchestrator(&server, pacing);
    let report = orchestrator.generate_all().await.unwrap();

    assert!(report.all_succeeded());
    assert_eq!(
        arrived_paths(&hits),
        vec![
            model_path(ScenarioId::Best),
            model_path(ScenarioId::Base),
            model_path(ScenarioId::Worst)
        ]
    );
    // Each request waits for the previous response and then the pacing delay.
    let times: Vec<_> = hits.lock().unwrap().iter().map(|(_, t)| *t).collect();
    for pair in times.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= response_delay + pacing);
    }
    assert!(orchestrator.cache().all_scenarios_present());
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn failed_scenario_is_reported_and_sequence_continues() {
    let server = MockServer::start().await;
    let hits = arrivals();
    mount_model(&server, &hits, ScenarioId::Best, model_ok(ScenarioId::Best, 300.0)).await;
    mount_model(&server, &hits, ScenarioId::Base, ResponseTemplate::new(500)).await;
    mount_model(&server, &hits, ScenarioId::Worst, model_ok(ScenarioId::Worst, 150.0)).await;

    let orchestrator = orchestrator(&server, Duration::from_millis(5));
    let report = orchestrator.generate_all().await.unwrap();

    assert_eq!(report.succeeded(), vec![ScenarioId::Best, ScenarioId::Worst]);
    assert_eq!(report.failed(), vec![ScenarioId::Base]);
    assert_eq!(report.outcomes[1].status, OutcomeStatus::Failed);
    assert!(report.outcomes[1].error.as_deref().unwrap().contains("500"));
    assert_eq!(arrived_paths(&hits).len(), 3);

    let cache = orchestrator.cache();
    assert!(cache.has(ScenarioId::Best));
    assert!(!cache.has(ScenarioId::Base));
    assert!(cache.has(ScenarioId::Worst));
    assert!(!cache.all_scenarios_present());
}

#[tokio::test]
async fn cached_model_equals_the_response_model() {
    let server = MockServer::start().await;
    let hits = arrivals();
    mount_model(&server, &hits, ScenarioId::Base, model_ok(ScenarioId::Base, 245.5)).await;

    let orchestrator = orchestrator(&server, Duration::from_millis(5));
    let returned = orchestrator.generate_one(ScenarioId::Base).await.unwrap();
    let cached = orchestrator.cache().get(ScenarioId::Base).unwrap();

    let expected: FinancialModel = serde_json::from_value(sample_model(ScenarioId::Base, 245.5)).unwrap();
    assert_eq!(*cached, expected);
    assert!(Arc::ptr_eq(&returned, &cached));
    assert!(cached.extra.contains_key("assumptions"));
}

#[tokio::test]
async fn failure_leaves_previous_entry_untouched() {
    let server = MockServer::start().await;
    let hits = arrivals();
    mount_model_times(&server, &hits, ScenarioId::Base, model_ok(ScenarioId::Base, 245.5), 1).await;
    mount_model(&server, &hits, ScenarioId::Base, model_rejected("Error generating model")).await;

    let orchestrator = orchestrator(&server, Duration::from_millis(5));
    let first = orchestrator.generate_one(ScenarioId::Base).await.unwrap();

    let err = orchestrator.generate_one(ScenarioId::Base).await.unwrap_err();
    assert!(matches!(&err, DashboardError::Rejected(m) if m == "Error generating model"));

    let cached = orchestrator.cache().get(ScenarioId::Base).unwrap();
    assert!(Arc::ptr_eq(&first, &cached));
    assert_eq!(cached.price_per_share(), Some(245.5));
    assert!(!orchestrator.is_generating(ScenarioId::Base));
}

#[tokio::test]
async fn second_generate_all_while_running_is_busy() {
    let server = MockServer::start().await;
    let hits = arrivals();
    mount_all_models(&server, &hits, Duration::from_millis(100)).await;

    let orchestrator = orchestrator(&server, Duration::from_millis(10));
    let running = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.generate_all().await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(orchestrator.is_loading());
    assert!(matches!(orchestrator.generate_all().await, Err(DashboardError::Busy)));

    let report = running.await.unwrap().unwrap();
    assert!(report.all_succeeded());
    assert_eq!(arrived_paths(&hits).len(), 3);
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn duplicate_request_for_a_scenario_is_rejected() {
    let server = MockServer::start().await;
    let hits = arrivals();
    mount_model(
        &server,
        &hits,
        ScenarioId::Best,
        model_ok(ScenarioId::Best, 300.0).set_delay(Duration::from_millis(150)),
    )
    .await;

    let orchestrator = orchestrator(&server, Duration::from_millis(5));
    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.generate_one(ScenarioId::Best).await })
    };
    tokio::time::sleep(Duration::from_millis(40)).await;

    assert!(orchestrator.is_generating(ScenarioId::Best));
    assert!(matches!(
        orchestrator.generate_one(ScenarioId::Best).await,
        Err(DashboardError::GenerationInFlight(ScenarioId::Best))
    ));

    assert!(first.await.unwrap().is_ok());
    assert_eq!(arrived_paths(&hits).len(), 1);
}

#[tokio::test]
async fn shutdown_stops_the_sequence_at_the_next_step() {
    let server = MockServer::start().await;
    let hits = arrivals();
    mount_all_models(&server, &hits, Duration::ZERO).await;

    let orchestrator = orchestrator(&server, Duration::from_millis(500));
    let running = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.generate_all().await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;
    orchestrator.shutdown();

    let report = running.await.unwrap().unwrap();
    assert_eq!(report.succeeded(), vec![ScenarioId::Best]);
    assert_eq!(report.cancelled(), vec![ScenarioId::Base, ScenarioId::Worst]);
    assert_eq!(arrived_paths(&hits), vec![model_path(ScenarioId::Best)]);
    assert!(!orchestrator.cache().has(ScenarioId::Base));
}
