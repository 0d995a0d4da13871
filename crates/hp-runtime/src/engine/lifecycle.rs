use std::time::Instant;

use hp_core::{HoneyPotError, HpValue, Path};

use super::{EngineEvent, Pending, PollState, SyncEngine};
use crate::boundary::{EvalBoundary, EvalOutcome};
use crate::model::{build_model, ControlHandle};

/// A named place where the external state object may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCandidate {
    pub name: String,
    pub expression: String,
}

impl RootCandidate {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

impl<B: EvalBoundary> SyncEngine<B> {
    /// Starts discovery: every candidate is probed at once and the first one
    /// that yields an object or sequence becomes the root expression.
    pub fn initialize(&mut self, candidates: &[RootCandidate]) {
        self.teardown();
        if let Some(title_expression) = self.options.title_expression.clone() {
            self.submit(Pending::Title, title_expression);
        }
        if candidates.is_empty() {
            self.report_undetected();
            return;
        }
        self.discovery_remaining = candidates.len();
        for candidate in candidates {
            let guarded = self.options.dialect.guard(&candidate.expression);
            self.submit(
                Pending::Discovery {
                    name: candidate.name.clone(),
                    expression: candidate.expression.clone(),
                },
                guarded,
            );
        }
    }

    /// Clears the model and root expression together; in-flight requests are
    /// forgotten so their late completions have no effect.
    pub fn teardown(&mut self) {
        if !self.root_expression.is_empty() {
            tracing::info!(root = %self.root_expression, "teardown");
        }
        self.root_expression.clear();
        self.model.clear();
        self.view.reset();
        self.title = None;
        self.poll_state = PollState::Idle;
        self.pending.clear();
        self.latest_write.clear();
        self.discovery_remaining = 0;
    }

    /// Hands the renderer's control for `path` to its entry. Once per entry.
    pub fn attach_control(
        &mut self,
        path: &Path,
        handle: ControlHandle,
    ) -> Result<(), HoneyPotError> {
        self.model.entry_mut(path)?.control.assign(handle)
    }

    pub(super) fn finish_title(&mut self, outcome: EvalOutcome) {
        match outcome {
            Ok(HpValue::String(title)) => {
                self.title = Some(title.clone());
                self.events.push(EngineEvent::TitleResolved(title));
            }
            Ok(other) => {
                tracing::debug!(kind = other.type_name(), "title is not a string");
            }
            Err(message) => {
                let expression = self.options.title_expression.clone().unwrap_or_default();
                self.report(HoneyPotError::eval_failed(&expression, &message));
            }
        }
    }

    pub(super) fn finish_discovery(
        &mut self,
        name: String,
        expression: String,
        outcome: EvalOutcome,
        now: Instant,
    ) {
        self.discovery_remaining = self.discovery_remaining.saturating_sub(1);
        match outcome {
            Ok(snapshot) if snapshot.is_container() && self.root_expression.is_empty() => {
                self.inspected(name, expression, snapshot, now);
            }
            Ok(_) => {}
            Err(message) => {
                tracing::debug!(candidate = %name, %message, "candidate failed");
            }
        }
        if self.discovery_remaining == 0 && self.root_expression.is_empty() {
            self.report_undetected();
        }
    }

    fn inspected(&mut self, name: String, expression: String, snapshot: HpValue, now: Instant) {
        tracing::info!(engine = %name, root = %expression, "state object detected");
        self.root_expression = expression.clone();
        self.model = build_model(&snapshot);
        self.view.reset();
        self.events.push(EngineEvent::Discovered { name, expression });
        self.schedule_update(now);
    }

    fn report_undetected(&mut self) {
        self.report(HoneyPotError::new(
            "DISCOVERY_FAILED",
            "No supported state object detected.",
        ));
    }
}
