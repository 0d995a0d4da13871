use std::collections::VecDeque;
use std::time::Instant;

use hp_core::{HoneyPotError, HpValue};
use hp_runtime::{EvalBoundary, EvalOutcome, EvalRequest, RequestId, SyncEngine};
use rhai::{Dynamic, Engine, Scope};

use crate::bridge::{dynamic_to_hpvalue, hpvalue_to_dynamic, json_to_hpvalue};

/// A live rhai environment the sync engine can inspect and write into.
///
/// Requests are queued by [`EvalBoundary::submit`] and only evaluated when
/// [`RhaiHost::drain`] runs, which keeps the engine's view of the boundary
/// asynchronous even though rhai itself is not.
#[derive(Debug)]
pub struct RhaiHost {
    engine: Engine,
    scope: Scope<'static>,
    queue: VecDeque<EvalRequest>,
}

impl Default for RhaiHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RhaiHost {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.on_print(|text| tracing::info!(target: "honeypot::script", "{}", text));
        engine.on_debug(|text, _, position| {
            tracing::debug!(target: "honeypot::script", %position, "{}", text)
        });
        Self {
            engine,
            scope: Scope::new(),
            queue: VecDeque::new(),
        }
    }

    /// Parses a JSON object and binds it to `name`.
    pub fn from_json_str(name: &str, raw: &str) -> Result<Self, HoneyPotError> {
        let json = serde_json::from_str::<serde_json::Value>(raw)
            .map_err(|error| HoneyPotError::new("HOST_STATE_INVALID", error.to_string()))?;
        let value = json_to_hpvalue(json);
        if !value.is_container() {
            return Err(HoneyPotError::new(
                "HOST_STATE_INVALID",
                format!("State for \"{}\" must be an object or array.", name),
            ));
        }
        let mut host = Self::new();
        host.set_variable(name, &value)?;
        Ok(host)
    }

    pub fn set_variable(&mut self, name: &str, value: &HpValue) -> Result<(), HoneyPotError> {
        let dynamic = hpvalue_to_dynamic(value)?;
        self.scope.set_or_push(name.to_string(), dynamic);
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Option<HpValue> {
        self.scope
            .get_value::<Dynamic>(name)
            .map(dynamic_to_hpvalue)
    }

    /// Runs a statement block against the live scope, the way game code would.
    pub fn run_script(&mut self, script: &str) -> Result<(), HoneyPotError> {
        self.engine
            .run_with_scope(&mut self.scope, script)
            .map_err(|error| {
                HoneyPotError::new("HOST_SCRIPT_FAILED", format!("Script failed: {}", error))
            })
    }

    pub fn eval(&mut self, expression: &str) -> EvalOutcome {
        self.engine
            .eval_with_scope::<Dynamic>(&mut self.scope, expression)
            .map(dynamic_to_hpvalue)
            .map_err(|error| error.to_string())
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Evaluates every queued request in submission order.
    pub fn drain(&mut self) -> Vec<(RequestId, EvalOutcome)> {
        let mut completions = Vec::with_capacity(self.queue.len());
        while let Some(request) = self.queue.pop_front() {
            let outcome = self.eval(&request.expression);
            if let Err(message) = &outcome {
                tracing::debug!(request = %request.id, %message, "evaluation failed");
            }
            completions.push((request.id, outcome));
        }
        completions
    }
}

impl EvalBoundary for RhaiHost {
    fn submit(&mut self, request: EvalRequest) {
        self.queue.push_back(request);
    }
}

/// Evaluates queued requests and feeds the outcomes back into `engine`
/// until nothing is left. Returns how many completions were delivered.
pub fn pump(engine: &mut SyncEngine<RhaiHost>, now: Instant) -> usize {
    let mut delivered = 0;
    loop {
        let completions = engine.boundary_mut().drain();
        if completions.is_empty() {
            return delivered;
        }
        for (id, outcome) in completions {
            engine.complete(id, outcome, now);
            delivered += 1;
        }
    }
}
