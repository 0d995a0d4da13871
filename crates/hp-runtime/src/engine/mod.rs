use std::collections::HashMap;
use std::time::Instant;

use hp_core::{HoneyPotError, HpValue, Path};

use crate::boundary::{EvalBoundary, EvalOutcome, EvalRequest, RequestId};
use crate::model::PathModel;
use crate::options::SyncOptions;
use crate::query::ViewState;

mod gateway;
mod lifecycle;
mod sync_loop;

pub use lifecycle::RootCandidate;

/// Everything the renderer needs to hear about, in the order it happened.
/// Errors from asynchronous completions only surface here.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Discovered {
        name: String,
        expression: String,
    },
    TitleResolved(String),
    FieldChanged {
        path: Path,
        editor_text: String,
        boolean_view: bool,
    },
    FieldWritten {
        path: Path,
    },
    Error(HoneyPotError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Armed { due: Instant },
}

#[derive(Debug, Clone)]
enum Pending {
    Title,
    Discovery {
        name: String,
        expression: String,
    },
    Poll,
    FieldRefresh {
        path: Path,
        expression: String,
    },
    Write {
        path: Path,
        value: HpValue,
        expression: String,
    },
}

/// Keeps a [`PathModel`], its locks and the external environment behind
/// `B` consistent under periodic polling.
pub struct SyncEngine<B: EvalBoundary> {
    boundary: B,
    options: SyncOptions,
    root_expression: String,
    model: PathModel,
    view: ViewState,
    title: Option<String>,
    poll_state: PollState,
    pending: HashMap<RequestId, Pending>,
    latest_write: HashMap<Path, RequestId>,
    request_counter: u64,
    discovery_remaining: usize,
    events: Vec<EngineEvent>,
}

impl<B: EvalBoundary> SyncEngine<B> {
    pub fn new(boundary: B, options: SyncOptions) -> Self {
        Self {
            boundary,
            options,
            root_expression: String::new(),
            model: PathModel::default(),
            view: ViewState::default(),
            title: None,
            poll_state: PollState::Idle,
            pending: HashMap::new(),
            latest_write: HashMap::new(),
            request_counter: 0,
            discovery_remaining: 0,
            events: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn boundary_mut(&mut self) -> &mut B {
        &mut self.boundary
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn root_expression(&self) -> &str {
        &self.root_expression
    }

    pub fn model(&self) -> &PathModel {
        &self.model
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn poll_state(&self) -> PollState {
        self.poll_state
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.poll_state {
            PollState::Idle => None,
            PollState::Armed { due } => Some(due),
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn poll_in_flight(&self) -> bool {
        self.pending
            .values()
            .any(|pending| matches!(pending, Pending::Poll))
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Delivers the outcome of an earlier request. Unknown ids (for example
    /// requests issued before a teardown) are ignored.
    pub fn complete(&mut self, id: RequestId, outcome: EvalOutcome, now: Instant) {
        let Some(pending) = self.pending.remove(&id) else {
            tracing::debug!(request = %id, "dropping completion for unknown request");
            return;
        };
        match pending {
            Pending::Title => self.finish_title(outcome),
            Pending::Discovery { name, expression } => {
                self.finish_discovery(name, expression, outcome, now)
            }
            Pending::Poll => self.finish_poll(outcome, now),
            Pending::FieldRefresh { path, expression } => {
                self.finish_refresh(&path, &expression, outcome)
            }
            Pending::Write {
                path,
                value,
                expression,
            } => self.finish_write(id, &path, value, &expression, outcome, now),
        }
    }

    pub fn filter_some(&mut self, pattern: &str) {
        self.view.filter_some(&self.model, pattern);
    }

    pub fn highlight_some(&mut self, pattern: &str) {
        self.view.highlight_some(&self.model, pattern);
    }

    pub fn find_with_values(&mut self, pattern: &str) -> Vec<Path> {
        self.view.find_with_values(&self.model, pattern)
    }

    pub fn expand_collapse_all(&mut self, collapse: bool) {
        self.view.expand_collapse_all(&self.model, collapse);
    }

    pub fn toggle_collapsed(&mut self, path: &Path) {
        self.view.toggle_collapsed(path);
    }

    fn submit(&mut self, pending: Pending, expression: String) -> RequestId {
        self.request_counter += 1;
        let id = RequestId(self.request_counter);
        tracing::trace!(request = %id, expression = %expression, "submit");
        self.pending.insert(id, pending);
        self.boundary.submit(EvalRequest { id, expression });
        id
    }

    fn report(&mut self, error: HoneyPotError) {
        tracing::warn!(code = %error.code, "{}", error.message);
        self.events.push(EngineEvent::Error(error));
    }
}

#[cfg(test)]
mod tests;
