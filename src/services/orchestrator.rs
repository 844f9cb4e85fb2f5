// src/services/orchestrator.rs
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Mutex as AsyncMutex};

use crate::error::{DashboardError, Result};
use crate::models::{FinancialModel, GenerateModelResponse, ScenarioId};
use crate::services::api_client::ApiClient;
use crate::services::cache::ScenarioModelCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: ScenarioId,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-scenario result of one generate-all run, in request order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl GenerationReport {
    pub fn succeeded(&self) -> Vec<ScenarioId> {
        self.with_status(OutcomeStatus::Succeeded)
    }

    pub fn failed(&self) -> Vec<ScenarioId> {
        self.with_status(OutcomeStatus::Failed)
    }

    pub fn cancelled(&self) -> Vec<ScenarioId> {
        self.with_status(OutcomeStatus::Cancelled)
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.len() == ScenarioId::ALL.len()
            && self.outcomes.iter().all(|o| o.status == OutcomeStatus::Succeeded)
    }

    fn with_status(&self, status: OutcomeStatus) -> Vec<ScenarioId> {
        self.outcomes
            .iter()
            .filter(|o| o.status == status)
            .map(|o| o.scenario)
            .collect()
    }
}

/// The only writer of the scenario model cache. Generation requests go through
/// a single lane, one at a time, and at most one request per scenario may be
/// queued or outstanding.
pub struct FetchOrchestrator {
    client: ApiClient,
    cache: Arc<ScenarioModelCache>,
    pacing: Duration,
    lane: AsyncMutex<()>,
    in_flight: Mutex<HashSet<ScenarioId>>,
    loading: AtomicBool,
    shutdown: watch::Sender<bool>,
}

struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<ScenarioId>>,
    scenario: ScenarioId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.scenario);
    }
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl FetchOrchestrator {
    pub fn new(client: ApiClient, cache: Arc<ScenarioModelCache>, pacing: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        FetchOrchestrator {
            client,
            cache,
            pacing,
            lane: AsyncMutex::new(()),
            in_flight: Mutex::new(HashSet::new()),
            loading: AtomicBool::new(false),
            shutdown,
        }
    }

    pub fn cache(&self) -> &Arc<ScenarioModelCache> {
        &self.cache
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// True while a generate-all sequence is running.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// True while a request for `scenario` is queued or outstanding.
    pub fn is_generating(&self, scenario: ScenarioId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&scenario)
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Stops any running sequence at its next step and refuses new requests.
    pub fn shutdown(&self) {
        info!("Shutting down fetch orchestrator");
        self.shutdown.send_replace(true);
    }

    fn claim(&self, scenario: ScenarioId) -> Result<InFlightGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(scenario) {
            return Err(DashboardError::GenerationInFlight(scenario));
        }
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            scenario,
        })
    }

    pub async fn generate_one(&self, scenario: ScenarioId) -> Result<Arc<FinancialModel>> {
        if self.is_shut_down() {
            return Err(DashboardError::Cancelled);
        }
        let _claim = self.claim(scenario)?;
        let _lane = self.lane.lock().await;
        if self.is_shut_down() {
            return Err(DashboardError::Cancelled);
        }

        info!("Generating financial model for {} scenario", scenario);
        let response = self.client.generate_model(scenario).await?;
        let model = accept(response)?;

        // Teardown while the request was outstanding: drop the response.
        if self.is_shut_down() {
            debug!("Discarding {} model received after shutdown", scenario);
            return Err(DashboardError::Cancelled);
        }
        Ok(self.cache.set(scenario, model))
    }

    pub async fn generate_all(&self) -> Result<GenerationReport> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DashboardError::Busy);
        }
        let _loading = LoadingGuard(&self.loading);
        let mut shutdown = self.shutdown.subscribe();
        let mut report = GenerationReport::default();

        for (step, scenario) in ScenarioId::ALL.into_iter().enumerate() {
            if step > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.pacing) => {}
                    _ = shutdown.wait_for(|stopped| *stopped) => {}
                }
            }
            if *shutdown.borrow() {
                report.outcomes.push(ScenarioOutcome {
                    scenario,
                    status: OutcomeStatus::Cancelled,
                    error: None,
                });
                continue;
            }

            let outcome = match self.generate_one(scenario).await {
                Ok(_) => ScenarioOutcome {
                    scenario,
                    status: OutcomeStatus::Succeeded,
                    error: None,
                },
                Err(DashboardError::Cancelled) => ScenarioOutcome {
                    scenario,
                    status: OutcomeStatus::Cancelled,
                    error: None,
                },
                Err(e) => {
                    warn!("Failed to generate {} scenario, continuing: {}", scenario, e);
                    ScenarioOutcome {
                        scenario,
                        status: OutcomeStatus::Failed,
                        error: Some(e.banner()),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            "Generate-all finished: {} succeeded, {} failed, {} cancelled",
            report.succeeded().len(),
            report.failed().len(),
            report.cancelled().len()
        );
        Ok(report)
    }
}

fn accept(response: GenerateModelResponse) -> Result<FinancialModel> {
    if !response.success {
        return Err(DashboardError::Rejected(
            response
                .message
                .unwrap_or_else(|| "model generation reported failure".to_string()),
        ));
    }
    response
        .model
        .ok_or_else(|| DashboardError::Rejected("response did not include a model".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_responses_do_not_yield_a_model() {
        let response = GenerateModelResponse {
            success: false,
            message: Some("Error generating model".into()),
            model: Some(FinancialModel::default()),
        };
        assert!(matches!(accept(response), Err(DashboardError::Rejected(m)) if m == "Error generating model"));

        let response = GenerateModelResponse {
            success: true,
            message: None,
            model: None,
        };
        assert!(matches!(accept(response), Err(DashboardError::Rejected(_))));
    }

    #[test]
    fn report_groups_outcomes() {
        let report = GenerationReport {
            outcomes: vec![
                ScenarioOutcome { scenario: ScenarioId::Best, status: OutcomeStatus::Succeeded, error: None },
                ScenarioOutcome { scenario: ScenarioId::Base, status: OutcomeStatus::Failed, error: Some("boom".into()) },
                ScenarioOutcome { scenario: ScenarioId::Worst, status: OutcomeStatus::Succeeded, error: None },
            ],
        };
        assert_eq!(report.succeeded(), vec![ScenarioId::Best, ScenarioId::Worst]);
        assert_eq!(report.failed(), vec![ScenarioId::Base]);
        assert!(report.cancelled().is_empty());
        assert!(!report.all_succeeded());
    }

    #[tokio::test]
    async fn duplicate_claims_are_rejected_until_released() {
        let orchestrator = FetchOrchestrator::new(
            ApiClient::new("http://127.0.0.1:9"),
            Arc::new(ScenarioModelCache::new()),
            Duration::from_millis(1),
        );
        let claim = orchestrator.claim(ScenarioId::Base).unwrap();
        assert!(orchestrator.is_generating(ScenarioId::Base));
        assert!(matches!(
            orchestrator.claim(ScenarioId::Base),
            Err(DashboardError::GenerationInFlight(ScenarioId::Base))
        ));
        assert!(orchestrator.claim(ScenarioId::Worst).is_ok());
        drop(claim);
        assert!(!orchestrator.is_generating(ScenarioId::Base));
    }

    #[tokio::test]
    async fn shutdown_refuses_new_work() {
        let orchestrator = FetchOrchestrator::new(
            ApiClient::new("http://127.0.0.1:9"),
            Arc::new(ScenarioModelCache::new()),
            Duration::from_millis(1),
        );
        orchestrator.shutdown();
        assert!(matches!(
            orchestrator.generate_one(ScenarioId::Best).await,
            Err(DashboardError::Cancelled)
        ));
        let report = orchestrator.generate_all().await.unwrap();
        assert_eq!(report.cancelled(), ScenarioId::ALL.to_vec());
        assert!(!orchestrator.cache().has(ScenarioId::Best));
        assert!(!orchestrator.is_loading());
    }
}
