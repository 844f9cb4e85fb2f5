// src/shell.rs
use log::{debug, info};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::{FinancialModel, ScenarioId, TabId};
use crate::services::api_client::ApiClient;
use crate::services::cache::ScenarioModelCache;
use crate::services::orchestrator::{FetchOrchestrator, GenerationReport};
use crate::views::bridge::BridgeView;
use crate::views::comparison::ComparisonView;
use crate::views::data_overview::DataOverviewView;
use crate::views::dcf::DcfView;
use crate::views::forecast::{ForecastParamsUpdate, ForecastView};
use crate::views::overview::OverviewView;
use crate::views::segments::SegmentsView;
use crate::views::statements::{StatementKind, StatementsView};
use crate::views::vehicle_models::VehicleModelsView;
use crate::views::{ScenarioView, ScenarioViewProps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveSelection {
    pub tab: TabId,
    pub scenario: ScenarioId,
}

impl Default for ActiveSelection {
    fn default() -> Self {
        ActiveSelection {
            tab: TabId::Overview,
            scenario: ScenarioId::Base,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShellStatus {
    pub tab: TabId,
    pub scenario: ScenarioId,
    pub scenarios_present: Vec<ScenarioId>,
    pub all_scenarios_present: bool,
    pub loading: bool,
    pub generating: Vec<ScenarioId>,
}

/// Owns the active tab and scenario and composes the cache, the orchestrator
/// and one controller per tab.
pub struct Shell {
    client: ApiClient,
    cache: Arc<ScenarioModelCache>,
    orchestrator: Arc<FetchOrchestrator>,
    selection: Mutex<ActiveSelection>,
    overview: OverviewView,
    vehicle_models: VehicleModelsView,
    statements: StatementsView,
    dcf: DcfView,
    segments: SegmentsView,
    bridge: BridgeView,
    comparison: ComparisonView,
    data_overview: DataOverviewView,
    forecast: ForecastView,
}

impl Shell {
    pub fn new(client: ApiClient, pacing: Duration) -> Self {
        let cache = Arc::new(ScenarioModelCache::new());
        let orchestrator = Arc::new(FetchOrchestrator::new(client.clone(), cache.clone(), pacing));
        Shell {
            client,
            cache,
            orchestrator,
            selection: Mutex::new(ActiveSelection::default()),
            overview: OverviewView::new(),
            vehicle_models: VehicleModelsView::new(),
            statements: StatementsView::new(),
            dcf: DcfView::new(),
            segments: SegmentsView::new(),
            bridge: BridgeView::new(),
            comparison: ComparisonView::new(),
            data_overview: DataOverviewView::new(),
            forecast: ForecastView::new(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(ApiClient::from_config(config), config.pacing)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &Arc<ScenarioModelCache> {
        &self.cache
    }

    pub fn orchestrator(&self) -> &Arc<FetchOrchestrator> {
        &self.orchestrator
    }

    pub fn overview(&self) -> &OverviewView {
        &self.overview
    }

    pub fn statements(&self) -> &StatementsView {
        &self.statements
    }

    pub fn dcf(&self) -> &DcfView {
        &self.dcf
    }

    pub fn forecast(&self) -> &ForecastView {
        &self.forecast
    }

    pub fn selection(&self) -> ActiveSelection {
        *self.selection.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Initial base-year overview fetch.
    pub async fn mount(&self) -> bool {
        info!("Mounting dashboard against {}", self.client.base_url());
        self.overview.load(&self.client).await
    }

    pub fn select_tab(&self, tab: TabId) -> bool {
        let mut selection = self.selection.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let changed = selection.tab != tab;
        selection.tab = tab;
        if changed {
            debug!("Active tab is now {}", tab);
        }
        changed
    }

    pub fn select_scenario(&self, scenario: ScenarioId) -> bool {
        let mut selection = self.selection.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let changed = selection.scenario != scenario;
        selection.scenario = scenario;
        if changed {
            debug!("Active scenario is now {}", scenario);
        }
        changed
    }

    pub fn select_statement(&self, kind: StatementKind) {
        self.statements.select(kind);
    }

    pub fn update_forecast(&self, update: ForecastParamsUpdate) -> Result<bool> {
        self.forecast.set_params(update)
    }

    /// Runs whatever fetches the active tab still needs for the current
    /// selection. Data already shown for the same inputs is not refetched.
    pub async fn activate(&self) {
        let ActiveSelection { tab, scenario } = self.selection();
        match tab {
            TabId::Overview => {
                if self.overview.base().state().is_idle() {
                    self.overview.load(&self.client).await;
                }
            }
            TabId::VehicleModels => {
                if self.vehicle_models.data().state().is_idle() {
                    self.vehicle_models.load(&self.client).await;
                }
            }
            TabId::Statements => {
                if self.statements.kind() == StatementKind::Assumptions {
                    self.statements.ensure_assumptions(&self.client, scenario).await;
                }
            }
            TabId::Dcf => {
                self.dcf
                    .refresh_sensitivity(&self.client, &self.cache, scenario, false)
                    .await;
            }
            TabId::Segments | TabId::Bridge => {}
            TabId::Comparison => {
                if self.comparison.summary().state().is_idle() && !self.cache.present_scenarios().is_empty() {
                    self.comparison.load(&self.client).await;
                }
            }
            TabId::DataOverview => {
                if self.data_overview.overview().state().is_idle() || self.data_overview.economic().state().is_idle() {
                    self.data_overview.load(&self.client).await;
                }
            }
            TabId::Forecast => {
                if self.forecast.lineups().state().is_idle() {
                    self.forecast.load_lineups(&self.client).await;
                }
                self.forecast.ensure_forecast(&self.client).await;
            }
        }
    }

    /// Explicit retrigger of the active tab's own fetches.
    pub async fn refresh(&self) {
        let ActiveSelection { tab, scenario } = self.selection();
        match tab {
            TabId::Overview => {
                self.overview.load(&self.client).await;
            }
            TabId::VehicleModels => {
                self.vehicle_models.load(&self.client).await;
            }
            TabId::Statements => {
                if self.statements.kind() == StatementKind::Assumptions {
                    self.statements.load_assumptions(&self.client, scenario).await;
                }
            }
            TabId::Dcf => {
                self.dcf
                    .refresh_sensitivity(&self.client, &self.cache, scenario, true)
                    .await;
            }
            TabId::Segments | TabId::Bridge => {}
            TabId::Comparison => {
                self.comparison.load(&self.client).await;
            }
            TabId::DataOverview => self.data_overview.load(&self.client).await,
            TabId::Forecast => self.forecast.load(&self.client).await,
        }
    }

    fn props(&self, scenario: ScenarioId) -> ScenarioViewProps {
        ScenarioViewProps {
            scenario,
            model: self.cache.get(scenario),
            loading: self.orchestrator.is_generating(scenario),
        }
    }

    pub fn header(&self) -> String {
        let selection = self.selection();
        let tabs: Vec<String> = TabId::ALL
            .iter()
            .map(|t| {
                if *t == selection.tab {
                    format!("[{}]", t.label())
                } else {
                    t.label().to_string()
                }
            })
            .collect();
        let scenarios: Vec<String> = ScenarioId::ALL
            .iter()
            .map(|s| {
                let mark = if self.cache.has(*s) { "x" } else { " " };
                let active = if *s == selection.scenario { "*" } else { "" };
                format!("[{}] {}{}", mark, s.label(), active)
            })
            .collect();
        let mut out = format!("Tesla Financial Model\n{}\nScenarios: {}", tabs.join(" | "), scenarios.join("  "));
        if self.orchestrator.is_loading() {
            out.push_str("  (generating all scenarios...)");
        }
        out.push_str("\n\n");
        out
    }

    /// Text of the active tab.
    pub fn render(&self) -> String {
        let selection = self.selection();
        let props = self.props(selection.scenario);
        let body = match selection.tab {
            TabId::Overview => self.overview.render(&props),
            TabId::VehicleModels => self.vehicle_models.render(),
            TabId::Statements => self.statements.render(&props),
            TabId::Dcf => self.dcf.render(&props),
            TabId::Segments => self.segments.render(&props),
            TabId::Bridge => self.bridge.render(&props),
            TabId::Comparison => self.comparison.render(&self.cache, &props),
            TabId::DataOverview => self.data_overview.render(),
            TabId::Forecast => self.forecast.render(),
        };
        let mut out = self.header();
        out.push_str(&body);
        out
    }

    /// The per-tab "Generate" affordance: generates the active scenario, then
    /// runs the fetches that depend on it.
    pub async fn generate_active(&self) -> Result<Arc<FinancialModel>> {
        let scenario = self.selection().scenario;
        self.generate(scenario).await
    }

    pub async fn generate(&self, scenario: ScenarioId) -> Result<Arc<FinancialModel>> {
        let model = self.orchestrator.generate_one(scenario).await?;
        self.after_generation(scenario).await;
        Ok(model)
    }

    pub async fn generate_all(&self) -> Result<GenerationReport> {
        let report = self.orchestrator.generate_all().await?;
        let scenario = self.selection().scenario;
        if report.succeeded().contains(&scenario) {
            self.after_generation(scenario).await;
        }
        Ok(report)
    }

    async fn after_generation(&self, scenario: ScenarioId) {
        let selection = self.selection();
        if selection.scenario != scenario {
            return;
        }
        match selection.tab {
            TabId::Dcf => {
                self.dcf
                    .refresh_sensitivity(&self.client, &self.cache, scenario, true)
                    .await;
            }
            TabId::Comparison => {
                self.comparison.load(&self.client).await;
            }
            _ => {}
        }
    }

    pub fn status(&self) -> ShellStatus {
        let selection = self.selection();
        ShellStatus {
            tab: selection.tab,
            scenario: selection.scenario,
            scenarios_present: self.cache.present_scenarios(),
            all_scenarios_present: self.cache.all_scenarios_present(),
            loading: self.orchestrator.is_loading(),
            generating: ScenarioId::ALL
                .into_iter()
                .filter(|s| self.orchestrator.is_generating(*s))
                .collect(),
        }
    }

    /// Stops the orchestrator and closes every fetch slot; responses still in
    /// flight are discarded.
    pub fn teardown(&self) {
        info!("Tearing down dashboard");
        self.orchestrator.shutdown();
        self.overview.teardown();
        self.vehicle_models.teardown();
        self.statements.teardown();
        self.dcf.teardown();
        self.comparison.teardown();
        self.data_overview.teardown();
        self.forecast.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(ApiClient::new("http://127.0.0.1:9"), Duration::from_millis(1))
    }

    #[test]
    fn defaults_to_overview_and_base() {
        let shell = shell();
        assert_eq!(shell.selection(), ActiveSelection::default());
        let status = shell.status();
        assert_eq!(status.tab, TabId::Overview);
        assert_eq!(status.scenario, ScenarioId::Base);
        assert!(status.scenarios_present.is_empty());
        assert!(!status.loading);
    }

    #[test]
    fn selection_changes_are_reported() {
        let shell = shell();
        assert!(shell.select_tab(TabId::Dcf));
        assert!(!shell.select_tab(TabId::Dcf));
        assert!(shell.select_scenario(ScenarioId::Worst));
        assert!(!shell.select_scenario(ScenarioId::Worst));
    }

    #[test]
    fn render_marks_active_tab_and_prompts_without_model() {
        let shell = shell();
        shell.select_tab(TabId::Statements);
        let text = shell.render();
        assert!(text.contains("[Statements]"));
        assert!(text.contains("[ ] Base Case*"));
        assert!(text.contains("Generate Model"));
    }

    #[tokio::test]
    async fn teardown_cancels_generation() {
        let shell = shell();
        shell.teardown();
        assert!(shell.generate_active().await.is_err());
        assert!(shell.orchestrator().is_shut_down());
    }
}
