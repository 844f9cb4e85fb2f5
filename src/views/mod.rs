// src/views/mod.rs
//! Per-tab view controllers.
//!
//! Tabs that read the scenario model cache implement [`ScenarioView`]; tabs
//! with their own data keep it in [`FetchSlot`]s so every fetch follows the
//! `idle → loading → success | error` cycle and late responses are dropped.

use log::{debug, error};
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::models::{FinancialModel, ScenarioId, TabId};

pub mod bridge;
pub mod comparison;
pub mod data_overview;
pub mod dcf;
pub mod forecast;
pub mod overview;
pub mod segments;
pub mod statements;
pub mod vehicle_models;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Handed out by [`FetchSlot::begin`]; only the newest ticket may settle the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
}

struct SlotInner<T> {
    state: FetchState<Arc<T>>,
    latest: Option<Arc<T>>,
    epoch: u64,
    /// Inputs of the newest request, when the caller named them.
    key: Option<String>,
    closed: bool,
}

/// Local loading/error state for one independent fetch.
///
/// `latest` keeps the last successful result until a newer fetch succeeds.
pub struct FetchSlot<T> {
    name: &'static str,
    inner: Mutex<SlotInner<T>>,
}

impl<T> FetchSlot<T> {
    pub fn new(name: &'static str) -> Self {
        FetchSlot {
            name,
            inner: Mutex::new(SlotInner {
                state: FetchState::Idle,
                latest: None,
                epoch: 0,
                key: None,
                closed: false,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> FetchState<Arc<T>> {
        self.lock().state.clone()
    }

    pub fn latest(&self) -> Option<Arc<T>> {
        self.lock().latest.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Enters `Loading`. Returns `None` once the slot has been torn down.
    pub fn begin(&self) -> Option<FetchTicket> {
        self.begin_with(None)
    }

    /// Like [`FetchSlot::begin`], recording `key` as the inputs of the request.
    pub fn begin_for(&self, key: impl Into<String>) -> Option<FetchTicket> {
        self.begin_with(Some(key.into()))
    }

    fn begin_with(&self, key: Option<String>) -> Option<FetchTicket> {
        let mut inner = self.lock();
        if inner.closed {
            return None;
        }
        inner.epoch += 1;
        inner.key = key;
        inner.state = FetchState::Loading;
        debug!(
            "{}: loading (request #{}{})",
            self.name,
            inner.epoch,
            inner.key.as_deref().map(|k| format!(", {}", k)).unwrap_or_default()
        );
        Some(FetchTicket { epoch: inner.epoch })
    }

    /// True when the newest request was made for `key` and is either still
    /// outstanding or succeeded.
    pub fn covers(&self, key: &str) -> bool {
        let inner = self.lock();
        inner.key.as_deref() == Some(key) && matches!(inner.state, FetchState::Loading | FetchState::Success(_))
    }

    /// The slot state as seen by a reader interested in `key`. A request made
    /// for other inputs counts as loading, since a fetch for `key` follows.
    pub fn state_for(&self, key: &str) -> FetchState<Arc<T>> {
        let inner = self.lock();
        if inner.state.is_idle() || inner.key.as_deref() == Some(key) {
            inner.state.clone()
        } else {
            FetchState::Loading
        }
    }

    /// Settles the slot with `result` if `ticket` is still the newest one.
    /// Returns whether the result was applied.
    pub fn finish(&self, ticket: FetchTicket, result: Result<T>) -> bool {
        let mut inner = self.lock();
        if inner.closed || ticket.epoch != inner.epoch {
            debug!("{}: discarding superseded response #{}", self.name, ticket.epoch);
            return false;
        }
        match result {
            Ok(data) => {
                let data = Arc::new(data);
                inner.latest = Some(data.clone());
                inner.state = FetchState::Success(data);
            }
            Err(e) => {
                error!("{}: fetch failed: {}", self.name, e);
                inner.state = FetchState::Error(e.banner());
            }
        }
        true
    }

    /// Runs `fetch` under a fresh ticket.
    pub async fn load<F>(&self, fetch: F) -> bool
    where
        F: Future<Output = Result<T>>,
    {
        let Some(ticket) = self.begin() else {
            return false;
        };
        let result = fetch.await;
        self.finish(ticket, result)
    }

    /// Runs `fetch` under a fresh ticket tagged with `key`.
    pub async fn load_for<F>(&self, key: impl Into<String>, fetch: F) -> bool
    where
        F: Future<Output = Result<T>>,
    {
        let Some(ticket) = self.begin_for(key) else {
            return false;
        };
        let result = fetch.await;
        self.finish(ticket, result)
    }

    /// Drops whatever is in flight; later responses are ignored.
    pub fn teardown(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.epoch += 1;
        if inner.state.is_loading() {
            inner.state = FetchState::Idle;
        }
    }
}

/// Inputs shared by every cache-reading view.
#[derive(Debug, Clone)]
pub struct ScenarioViewProps {
    pub scenario: ScenarioId,
    pub model: Option<Arc<FinancialModel>>,
    /// A generation request for `scenario` is queued or outstanding.
    pub loading: bool,
}

pub trait ScenarioView: Send + Sync {
    fn tab(&self) -> TabId;

    fn render_model(&self, props: &ScenarioViewProps, model: &FinancialModel) -> String;

    /// Renders the model, or the generate prompt when the scenario has none.
    fn render(&self, props: &ScenarioViewProps) -> String {
        match &props.model {
            Some(model) => self.render_model(props, model),
            None => generate_prompt(self.tab(), props),
        }
    }
}

pub fn generate_prompt(tab: TabId, props: &ScenarioViewProps) -> String {
    if props.loading {
        return format!(
            "{} - {}\nGenerating {} model...\n",
            tab.label(),
            props.scenario.label(),
            props.scenario.label()
        );
    }
    format!(
        "{} - {}\nNo financial model generated for this scenario yet.\n[ Generate Model ]  POST /dashboard/generate/{}\n",
        tab.label(),
        props.scenario.label(),
        props.scenario
    )
}

pub fn error_banner(message: &str) -> String {
    format!("! Error: {}\n", message)
}

/// Status line for a slot that has no data to show yet.
pub fn slot_status<T>(state: &FetchState<T>, what: &str) -> Option<String> {
    match state {
        FetchState::Idle => Some(format!("{} not loaded.\n", what)),
        FetchState::Loading => Some(format!("Loading {}...\n", what.to_lowercase())),
        FetchState::Error(message) => Some(error_banner(message)),
        FetchState::Success(_) => None,
    }
}

/// Fixed-width table: first column left aligned, the rest right aligned.
#[derive(Debug, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        TextTable {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) -> &mut Self {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let columns = self
            .rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for line in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in line.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| -> String {
            let mut out = String::new();
            for (i, width) in widths.iter().enumerate() {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                if i == 0 {
                    out.push_str(&format!("{:<width$}", cell, width = *width));
                } else {
                    out.push_str(&format!("  {:>width$}", cell, width = *width));
                }
            }
            out.trim_end().to_string()
        };

        let mut out = format_line(&self.headers);
        out.push('\n');
        let total: usize = widths.iter().sum::<usize>() + 2 * columns.saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_line(row));
            out.push('\n');
        }
        out
    }
}

/// `part / whole`, absent when either side is missing or the whole is zero.
pub fn ratio(part: Option<f64>, whole: Option<f64>) -> Option<f64> {
    match (part, whole) {
        (Some(p), Some(w)) if w != 0.0 => Some(p / w),
        _ => None,
    }
}

pub fn year_label(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "N/A".to_string())
}
