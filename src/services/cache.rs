// src/services/cache.rs
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::models::{FinancialModel, ScenarioId};

/// Scenario id → last successfully generated model. Shared by every tab for
/// reading; only the orchestrator writes.
#[derive(Debug, Default)]
pub struct ScenarioModelCache {
    models: RwLock<HashMap<ScenarioId, Arc<FinancialModel>>>,
}

impl ScenarioModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scenario: ScenarioId) -> Option<Arc<FinancialModel>> {
        self.models
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&scenario)
            .cloned()
    }

    pub fn has(&self, scenario: ScenarioId) -> bool {
        self.models
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&scenario)
    }

    pub fn all_scenarios_present(&self) -> bool {
        ScenarioId::ALL.iter().all(|s| self.has(*s))
    }

    /// Present scenarios in best → base → worst order.
    pub fn present_scenarios(&self) -> Vec<ScenarioId> {
        ScenarioId::ALL.into_iter().filter(|s| self.has(*s)).collect()
    }

    pub(crate) fn set(&self, scenario: ScenarioId, model: FinancialModel) -> Arc<FinancialModel> {
        let model = Arc::new(model);
        debug!("Storing generated model for {} scenario", scenario);
        self.models
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(scenario, model.clone());
        model
    }
}
