use std::time::Instant;

use hp_core::{HoneyPotError, HpValue, Path};

use super::{EngineEvent, Pending, PollState, SyncEngine};
use crate::boundary::{EvalBoundary, EvalOutcome, RequestId};

impl<B: EvalBoundary> SyncEngine<B> {
    /// The user typed `editor_text` into the control for `path`.
    ///
    /// A locked entry takes the new text as its locked value and stored
    /// value at once, so later polls re-assert it. The external source is
    /// written only when the value actually differs. An unlocked entry's
    /// stored value follows once the write succeeds.
    pub fn on_edit(&mut self, path: &Path, editor_text: &str) -> Result<(), HoneyPotError> {
        let entry = self.model.entry_mut(path)?;
        let next = entry.leaf_type().from_editor_text(editor_text)?;
        let needs_write = entry.value != next;
        if entry.locked {
            entry.locked_value = next.clone();
            entry.value = next.clone();
        }
        if needs_write {
            self.set_field_value(path, next)?;
        }
        Ok(())
    }

    /// The user toggled the lock of `path`, holding the control's current text.
    pub fn on_lock(
        &mut self,
        path: &Path,
        locked: bool,
        editor_text: &str,
    ) -> Result<(), HoneyPotError> {
        let value = self.model.entry(path)?.leaf_type().from_editor_text(editor_text)?;
        let needs_write = self.model.set_lock(path, locked, value.clone())?;
        tracing::debug!(path = %path, locked, "lock toggled");
        if needs_write {
            self.set_field_value(path, value)?;
        }
        Ok(())
    }

    /// Pushes the locked value back out before the entry is reconciled.
    pub(super) fn update_field_lock(&mut self, path: &Path) {
        let locked_value = match self.model.get(path) {
            Some(entry) if entry.locked() => entry.locked_value().clone(),
            _ => return,
        };
        if let Err(error) = self.set_field_value(path, locked_value) {
            self.report(error);
        }
    }

    fn set_field_value(&mut self, path: &Path, value: HpValue) -> Result<(), HoneyPotError> {
        let entry = self.model.entry(path)?;
        let dialect = self.options.dialect;
        let literal = entry.leaf_type().to_source_literal(dialect, &value)?;
        let expression = dialect.assignment(&self.root_expression, path, entry.steps(), &literal);
        tracing::debug!(path = %path, %expression, "write issued");
        let id = self.submit(
            Pending::Write {
                path: path.clone(),
                value,
                expression: expression.clone(),
            },
            expression,
        );
        self.latest_write.insert(path.clone(), id);
        Ok(())
    }

    /// Applies a finished write as of now. A locked entry settles on its
    /// current locked value. An unlocked entry takes the written value only
    /// if no later write to the same path was issued meanwhile.
    pub(super) fn finish_write(
        &mut self,
        id: RequestId,
        path: &Path,
        value: HpValue,
        expression: &str,
        outcome: EvalOutcome,
        now: Instant,
    ) {
        if let Err(message) = outcome {
            self.report(HoneyPotError::new(
                "EVAL_FAILED",
                format!("Cannot set value for {} as {}: {}", path, expression, message),
            ));
            return;
        }
        let superseded = self.latest_write.get(path) != Some(&id);
        match self.model.entry_mut(path) {
            Ok(entry) => {
                if entry.locked {
                    entry.value = entry.locked_value.clone();
                } else if superseded {
                    tracing::debug!(path = %path, request = %id, "stale write result dropped");
                } else {
                    entry.value = value;
                }
                entry.changed = false;
            }
            Err(error) => {
                self.report(error);
                return;
            }
        }
        self.events.push(EngineEvent::FieldWritten { path: path.clone() });
        self.resume_polling(now);
    }

    /// A successful write restarts a loop that a failed tick left idle.
    fn resume_polling(&mut self, now: Instant) {
        if self.options.automatic
            && !self.root_expression.is_empty()
            && self.poll_state == PollState::Idle
            && !self.poll_in_flight()
        {
            tracing::debug!("polling resumed after write");
            self.schedule_update(now);
        }
    }
}
