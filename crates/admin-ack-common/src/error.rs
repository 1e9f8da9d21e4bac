//! Error types for admin ack verification
//!
//! Every failure is terminal for a verification run. Variants carry the
//! resource or gate they concern plus a human-readable detail so callers and
//! tests can assert on the failure precisely.

use thiserror::Error;

/// Coarse failure category, used for matching without destructuring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Reading a ConfigMap or the ClusterVersion failed
    Retrieval,
    /// A gate definition is malformed
    Validation,
    /// An acknowledged gate is still blocking Upgradeable
    Contradiction,
    /// A poll exceeded its deadline
    Timeout,
    /// Writing the acknowledgment ConfigMap failed
    Update,
    /// The caller cancelled the run
    Cancelled,
}

/// Main error type for admin ack operations
#[derive(Debug, Error)]
pub enum Error {
    /// Fetching a remote object failed (other than the designed not-found case)
    #[error("error accessing {resource}: {message}")]
    Retrieval {
        /// Object being read (e.g. "configmap openshift-config/admin-acks")
        resource: String,
        /// Underlying cause
        message: String,
    },

    /// A gate definition does not meet the published format
    #[error("invalid gate {gate}: {message}")]
    Validation {
        /// Gate key as found in the gate ConfigMap
        gate: String,
        /// Description of what's invalid
        message: String,
    },

    /// A gate is acknowledged yet Upgradeable is False because of it
    #[error("gate {gate} contradicts Upgradeable: {message}")]
    Contradiction {
        /// Gate key
        gate: String,
        /// Description including the offending condition
        message: String,
    },

    /// A poll did not observe its expected state before the deadline
    #[error("timed out waiting for {waiting_for}. {last_observed}")]
    Timeout {
        /// What the poll was waiting for
        waiting_for: String,
        /// Snapshot of the last observed state
        last_observed: String,
    },

    /// Writing the acknowledgment ConfigMap failed
    #[error("unable to update {resource}: {message}")]
    Update {
        /// Object being written
        resource: String,
        /// Underlying cause
        message: String,
    },

    /// The run was cancelled by the caller
    #[error("cancelled while {operation}")]
    Cancelled {
        /// What was in progress
        operation: String,
    },
}

impl Error {
    /// Create a retrieval error for the given resource
    pub fn retrieval(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Retrieval {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error for a specific gate
    pub fn validation_for(gate: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            gate: gate.into(),
            message: msg.into(),
        }
    }

    /// Create a contradiction error for a specific gate
    pub fn contradiction(gate: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Contradiction {
            gate: gate.into(),
            message: msg.into(),
        }
    }

    /// Create a timeout error with the last observed state
    pub fn timeout(waiting_for: impl Into<String>, last_observed: impl Into<String>) -> Self {
        Self::Timeout {
            waiting_for: waiting_for.into(),
            last_observed: last_observed.into(),
        }
    }

    /// Create an update error for the given resource
    pub fn update(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Update {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Failure category of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Retrieval { .. } => FailureKind::Retrieval,
            Error::Validation { .. } => FailureKind::Validation,
            Error::Contradiction { .. } => FailureKind::Contradiction,
            Error::Timeout { .. } => FailureKind::Timeout,
            Error::Update { .. } => FailureKind::Update,
            Error::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    /// Get the gate key if this error concerns a specific gate
    pub fn gate(&self) -> Option<&str> {
        match self {
            Error::Validation { gate, .. } => Some(gate),
            Error::Contradiction { gate, .. } => Some(gate),
            _ => None,
        }
    }

    /// Get the remote resource if this error concerns one
    pub fn resource(&self) -> Option<&str> {
        match self {
            Error::Retrieval { resource, .. } => Some(resource),
            Error::Update { resource, .. } => Some(resource),
            _ => None,
        }
    }
}
