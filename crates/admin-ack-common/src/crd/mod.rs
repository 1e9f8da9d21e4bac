//! Resource types read by the admin ack verifier
//!
//! The verifier never owns these resources; they are published by the
//! cluster version operator and only deserialized here.

mod cluster_version;
mod types;

pub use cluster_version::{
    ClusterVersion, ClusterVersionSpec, ClusterVersionStatus, UpdateHistory, UpdateState,
    CLUSTER_VERSION_NAME,
};
pub use types::{ClusterOperatorStatusCondition, ConditionStatus, CONDITION_UPGRADEABLE};
