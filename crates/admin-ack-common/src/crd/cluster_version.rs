//! ClusterVersion resource (`config.openshift.io/v1`)
//!
//! The cluster version operator publishes the update history and the
//! Upgradeable condition here. Only the fields the verifier reads are
//! modelled; everything else is ignored on deserialization.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::ClusterOperatorStatusCondition;

/// Name of the singleton ClusterVersion object
pub const CLUSTER_VERSION_NAME: &str = "version";

/// Desired state of the cluster version
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "ClusterVersion",
    plural = "clusterversions",
    status = "ClusterVersionStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersionSpec {
    /// Unique identifier of the cluster
    #[serde(rename = "clusterID", default)]
    pub cluster_id: String,

    /// Update channel the cluster follows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Update service endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
}

/// Whether an update was fully applied
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum UpdateState {
    /// Every component reached the target version
    Completed,
    /// The update started but has not finished (or was abandoned)
    #[default]
    #[serde(other)]
    Partial,
}

impl std::fmt::Display for UpdateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Partial => write!(f, "Partial"),
        }
    }
}

/// One entry of the update history, newest first
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHistory {
    /// Whether the update completed
    pub state: UpdateState,

    /// Semantic version of the update (may be empty)
    #[serde(default)]
    pub version: String,

    /// Release image pull spec
    #[serde(default)]
    pub image: String,

    /// When the update started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_time: Option<DateTime<Utc>>,

    /// When the update completed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,

    /// Whether the release image signature was verified
    #[serde(default)]
    pub verified: bool,
}

impl UpdateHistory {
    /// Create a history entry for the given version and state
    pub fn new(version: impl Into<String>, state: UpdateState) -> Self {
        Self {
            state,
            version: version.into(),
            ..Default::default()
        }
    }
}

/// Observed state of the cluster version
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersionStatus {
    /// Update history, newest first
    #[serde(default)]
    pub history: Vec<UpdateHistory>,

    /// Status conditions, in no particular order
    #[serde(default)]
    pub conditions: Vec<ClusterOperatorStatusCondition>,

    /// Generation last acted on by the operator
    #[serde(default)]
    pub observed_generation: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ConditionStatus, CONDITION_UPGRADEABLE};

    #[test]
    fn status_parses_history_and_conditions() {
        let status: ClusterVersionStatus = serde_json::from_value(serde_json::json!({
            "history": [
                {"state": "Partial", "version": "4.16.2", "image": "quay.io/x@sha256:1", "verified": false},
                {"state": "Completed", "version": "4.16.1", "startedTime": "2024-05-01T10:00:00Z",
                 "completionTime": "2024-05-01T11:00:00Z"}
            ],
            "conditions": [
                {"type": "Upgradeable", "status": "False", "reason": "AdminAckRequired",
                 "message": "Kubernetes 1.29 removes several APIs"}
            ],
            "observedGeneration": 3,
            "desired": {"version": "4.16.2"}
        }))
        .unwrap();

        assert_eq!(status.history.len(), 2);
        assert_eq!(status.history[0].state, UpdateState::Partial);
        assert_eq!(status.history[1].state, UpdateState::Completed);
        assert!(status.history[1].completion_time.is_some());
        assert_eq!(status.conditions[0].type_, CONDITION_UPGRADEABLE);
        assert_eq!(status.conditions[0].status, ConditionStatus::False);
        assert_eq!(status.observed_generation, 3);
    }

    #[test]
    fn empty_status_defaults() {
        let status: ClusterVersionStatus = serde_json::from_str("{}").unwrap();
        assert!(status.history.is_empty());
        assert!(status.conditions.is_empty());
    }

    #[test]
    fn cluster_id_field_is_upper_case() {
        let spec: ClusterVersionSpec =
            serde_json::from_value(serde_json::json!({"clusterID": "abc", "channel": "stable-4.16"}))
                .unwrap();
        assert_eq!(spec.cluster_id, "abc");
        assert_eq!(spec.channel.as_deref(), Some("stable-4.16"));
    }
}
