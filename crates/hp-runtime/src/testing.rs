//! Test doubles for the evaluation boundary.

use crate::boundary::{EvalBoundary, EvalRequest, RequestId};

/// Records every submitted request so a test can complete them by hand,
/// in whatever order it wants.
#[derive(Debug, Default)]
pub struct ScriptedBoundary {
    requests: Vec<EvalRequest>,
}

impl ScriptedBoundary {
    pub fn requests(&self) -> &[EvalRequest] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<EvalRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Id of the most recent request whose expression equals `expression`.
    pub fn find(&self, expression: &str) -> Option<RequestId> {
        self.requests
            .iter()
            .rev()
            .find(|request| request.expression == expression)
            .map(|request| request.id)
    }

    pub fn count(&self, expression: &str) -> usize {
        self.requests
            .iter()
            .filter(|request| request.expression == expression)
            .count()
    }
}

impl EvalBoundary for ScriptedBoundary {
    fn submit(&mut self, request: EvalRequest) {
        self.requests.push(request);
    }
}
