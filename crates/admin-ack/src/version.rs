//! Cluster version resolution and gate applicability

use admin_ack_common::crd::{UpdateHistory, UpdateState};

/// Determine the version the cluster is currently running
///
/// Returns the first `Completed` entry of the newest-first history. If no
/// update completed, the oldest entry (the originally installed version) is
/// returned. An empty history, which only happens early in cluster startup,
/// yields the empty string.
pub fn current_version(history: &[UpdateHistory]) -> &str {
    history
        .iter()
        .find(|h| h.state == UpdateState::Completed)
        .or_else(|| history.last())
        .map(|h| h.version.as_str())
        .unwrap_or("")
}

/// Second dot-delimited component of a version, or `""` if there is none
///
/// Unparseable input maps to the empty string, which still compares
/// meaningfully for equivalence.
pub fn effective_minor(version: &str) -> &str {
    version.split('.').nth(1).unwrap_or("")
}

/// Whether a gate for `gate_version` applies to a cluster at `current_version`
pub fn gate_applicable(gate_version: &str, current_version: &str) -> bool {
    effective_minor(gate_version) == effective_minor(current_version)
}
