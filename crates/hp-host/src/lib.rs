//! rhai-backed live environment for the sync engine.

mod bridge;
mod host;

pub use bridge::{dynamic_to_hpvalue, hpvalue_to_dynamic, json_to_hpvalue};
pub use host::{pump, RhaiHost};

use hp_runtime::RootCandidate;

/// Variable names probed, in order, when no root is given explicitly.
pub fn default_candidates() -> Vec<RootCandidate> {
    ["state", "variables", "game"]
        .into_iter()
        .map(|name| RootCandidate::new(name, name))
        .collect()
}
