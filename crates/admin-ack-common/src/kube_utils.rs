//! Shared Kubernetes utilities using kube-rs
//!
//! Client construction, condition lookup, and the cancellable poll loop used
//! by every wait in the verifier.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::crd::ClusterOperatorStatusCondition;
use crate::Error;

/// Default interval between poll attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Default deadline for a single wait
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Conditions
// =============================================================================

/// Trait for types that carry a condition type
pub trait HasConditionFields {
    /// Get the condition type field value
    fn type_field(&self) -> &str;
}

impl HasConditionFields for ClusterOperatorStatusCondition {
    fn type_field(&self) -> &str {
        &self.type_
    }
}

/// Find the first condition of the given type
///
/// Conditions are an unordered list; no ordering is assumed. Returns `None`
/// when the type is absent.
pub fn find_condition<'a, T>(conditions: &'a [T], condition_type: &str) -> Option<&'a T>
where
    T: HasConditionFields,
{
    conditions.iter().find(|c| c.type_field() == condition_type)
}

// =============================================================================
// Polling
// =============================================================================

/// Interval and deadline for a poll loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollTiming {
    /// Time between attempts
    pub interval: Duration,
    /// Maximum total time to wait
    pub timeout: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollTiming {
    /// Create timing with the given interval and deadline
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Result of one poll attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Probe {
    /// Whether the awaited state was observed
    pub satisfied: bool,
    /// Human-readable snapshot of what was observed, reported on timeout
    pub observed: String,
}

impl Probe {
    /// The awaited state was observed
    pub fn done(observed: impl Into<String>) -> Self {
        Self {
            satisfied: true,
            observed: observed.into(),
        }
    }

    /// The awaited state was not observed yet
    pub fn pending(observed: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            observed: observed.into(),
        }
    }
}

/// Poll until a probe is satisfied, the deadline passes, or the caller cancels
///
/// The first attempt runs immediately, then one attempt per `timing.interval`.
/// A probe error ends the poll and is returned as-is. On deadline the error
/// is [`Error::Timeout`] carrying `waiting_for` and the last observed snapshot.
/// Cancellation is honoured during sleeps and in-flight probes.
pub async fn poll_until<F, Fut>(
    timing: PollTiming,
    cancel: &CancellationToken,
    waiting_for: impl Into<String>,
    mut probe_fn: F,
) -> Result<(), Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe, Error>>,
{
    let start = Instant::now();
    let waiting_for = waiting_for.into();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let probe = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(Error::cancelled(format!("waiting for {}", waiting_for)));
            }
            result = probe_fn() => result?,
        };

        if probe.satisfied {
            debug!(attempt, waiting_for = %waiting_for, "Poll condition met");
            return Ok(());
        }
        trace!(attempt, observed = %probe.observed, "Polling condition not yet met, retrying...");

        if start.elapsed() >= timing.timeout {
            return Err(Error::timeout(waiting_for, probe.observed));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(Error::cancelled(format!("waiting for {}", waiting_for)));
            }
            _ = tokio::time::sleep(timing.interval) => {}
        }
    }
}

// =============================================================================
// Clients
// =============================================================================

/// Create a kube client from optional kubeconfig path with default timeouts
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    create_client_with_timeout(kubeconfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT).await
}

/// Create a kube client from optional kubeconfig path with custom timeouts
///
/// Without a path the configuration is inferred (`KUBECONFIG`, `~/.kube/config`,
/// or in-cluster service account).
pub async fn create_client_with_timeout(
    kubeconfig: Option<&Path>,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::retrieval(
                    format!("kubeconfig {}", path.display()),
                    format!("failed to read kubeconfig: {}", e),
                )
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::retrieval(
                        format!("kubeconfig {}", path.display()),
                        format!("failed to load kubeconfig: {}", e),
                    )
                })?
        }
        None => Config::infer().await.map_err(|e| {
            Error::retrieval("kubeconfig", format!("failed to infer config: {}", e))
        })?,
    };

    config.connect_timeout = Some(connect_timeout);
    config.read_timeout = Some(read_timeout);
    Client::try_from(config)
        .map_err(|e| Error::retrieval("kube client", format!("failed to create client: {}", e)))
}
