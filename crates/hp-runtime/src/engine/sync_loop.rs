use std::time::Instant;

use hp_core::{HoneyPotError, HpValue, Path};

use super::{EngineEvent, Pending, PollState, SyncEngine};
use crate::boundary::{EvalBoundary, EvalOutcome};

impl<B: EvalBoundary> SyncEngine<B> {
    /// Arms the poll timer one interval from `now`, replacing any earlier deadline.
    pub fn schedule_update(&mut self, now: Instant) {
        let due = now + self.options.interval();
        tracing::trace!(interval_ms = self.options.interval().as_millis() as u64, "poll armed");
        self.poll_state = PollState::Armed { due };
    }

    /// Fires the timer if its deadline has passed. Returns whether it fired.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.poll_state {
            PollState::Armed { due } if due <= now => {
                self.poll_state = PollState::Idle;
                self.update_all_fields();
                true
            }
            _ => false,
        }
    }

    /// One timer tick: evaluates the root expression when polling is enabled.
    pub fn update_all_fields(&mut self) -> bool {
        if self.root_expression.is_empty() || !self.options.automatic {
            return false;
        }
        self.poll_now()
    }

    /// Evaluates the root expression regardless of the automatic flag.
    pub fn poll_now(&mut self) -> bool {
        if self.root_expression.is_empty() {
            return false;
        }
        let expression = self.root_expression.clone();
        self.submit(Pending::Poll, expression);
        true
    }

    pub fn set_automatic(&mut self, automatic: bool, now: Instant) {
        self.options.automatic = automatic;
        if automatic {
            self.schedule_update(now);
        }
    }

    /// Takes effect from the next time the timer is armed.
    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.options.interval_ms = interval_ms;
    }

    /// Re-reads one path, e.g. when its control gains focus.
    pub fn refresh_field(&mut self, path: &Path) -> Result<(), HoneyPotError> {
        let steps = self.model.entry(path)?.steps();
        let expression = self.options.dialect.access(&self.root_expression, path, steps);
        self.submit(
            Pending::FieldRefresh {
                path: path.clone(),
                expression: expression.clone(),
            },
            expression,
        );
        Ok(())
    }

    pub fn clear_all_changed(&mut self) {
        for entry in self.model.entries_mut() {
            entry.changed = false;
        }
    }

    pub(super) fn finish_poll(&mut self, outcome: EvalOutcome, now: Instant) {
        let snapshot = match outcome {
            Ok(snapshot) => snapshot,
            Err(message) => {
                let error = HoneyPotError::eval_failed(&self.root_expression, &message);
                self.report(error);
                return;
            }
        };

        for path in self.model.paths() {
            self.update_field_lock(&path);
            let observed = snapshot.resolve(&path).cloned().unwrap_or(HpValue::Null);
            if let Err(error) = self.update_field_value(&path, observed) {
                self.report(error);
            }
        }

        if self.options.automatic {
            self.schedule_update(now);
        }
    }

    pub(super) fn finish_refresh(&mut self, path: &Path, expression: &str, outcome: EvalOutcome) {
        let result = match outcome {
            Ok(observed) => self.update_field_value(path, observed).and_then(|_| {
                self.model.entry_mut(path)?.changed = false;
                Ok(())
            }),
            Err(message) => Err(HoneyPotError::eval_failed(expression, &message)),
        };
        if let Err(error) = result {
            self.report(error);
        }
    }

    /// Applies one observation. A locked entry keeps its locked value no
    /// matter what was observed. Returns whether the stored value changed.
    fn update_field_value(&mut self, path: &Path, observed: HpValue) -> Result<bool, HoneyPotError> {
        let entry = self.model.entry_mut(path)?;
        let next = if entry.locked {
            entry.locked_value.clone()
        } else {
            entry.leaf_type().normalize(observed)
        };
        if entry.value == next {
            return Ok(false);
        }
        entry.value = next;
        entry.changed = true;
        let event = EngineEvent::FieldChanged {
            path: path.clone(),
            editor_text: entry.editor_text(),
            boolean_view: entry.boolean_view(),
        };
        self.events.push(event);
        Ok(true)
    }
}
