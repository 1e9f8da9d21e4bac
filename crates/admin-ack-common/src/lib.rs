//! Common types for admin ack verification: errors, resources, and utilities

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod telemetry;

pub use error::{Error, FailureKind};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Namespace holding the gate definitions published with each release
pub const ADMIN_GATES_NAMESPACE: &str = "openshift-config-managed";

/// ConfigMap holding gate definitions (gate key -> description)
pub const ADMIN_GATES_CONFIGMAP: &str = "admin-gates";

/// Default namespace of the acknowledgment ConfigMap
pub const DEFAULT_ADMIN_ACKS_NAMESPACE: &str = "openshift-config";

/// ConfigMap holding acknowledgments (gate key -> "true")
pub const ADMIN_ACKS_CONFIGMAP: &str = "admin-acks";

/// Value that marks a gate as acknowledged
pub const ACK_VALUE: &str = "true";

/// Reason the cluster version operator sets when a gate blocks upgrades
pub const ADMIN_ACK_REQUIRED_REASON: &str = "AdminAckRequired";
