use std::fmt;

use hp_core::HpValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalRequest {
    pub id: RequestId,
    pub expression: String,
}

/// Parsed result, or the environment's human-readable error message.
pub type EvalOutcome = Result<HpValue, String>;

/// The only way the engine reaches the external environment.
///
/// `submit` must not block on the result: the host evaluates the request
/// whenever it likes and hands the outcome back through
/// [`SyncEngine::complete`](crate::SyncEngine::complete). Completions may
/// arrive in any order.
pub trait EvalBoundary {
    fn submit(&mut self, request: EvalRequest);
}
