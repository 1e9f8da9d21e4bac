//! Gate acknowledgment walker
//!
//! Drives the admin ack protocol end to end: every gate applicable to the
//! running version is (re-)acknowledged, and after each step the walker
//! confirms the cluster version operator reacted through the Upgradeable
//! condition.
//!
//! Per gate the walker moves through:
//!
//! ```text
//! Unacked -> AckRequiredPending -> Acked
//!    ^                               |
//!    +---- cleared if acked at start-+
//! ```
//!
//! and once every gate is acked it waits for Upgradeable to stop being False.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use admin_ack_common::crd::ClusterVersionStatus;
use admin_ack_common::kube_utils::{poll_until, PollTiming, Probe};
use admin_ack_common::{Error, Result, ACK_VALUE};

use crate::client::AdminAckClient;
use crate::gate::{parse_gates, GateDefinition};
use crate::upgradeable::{
    admin_ack_required_with_message, describe_upgradeable, is_explicitly_false,
};
use crate::version::{current_version, gate_applicable};

/// How a verification run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The release has no admin gates; nothing was checked or changed
    FeatureAbsent,
    /// Every applicable gate was acknowledged and Upgradeable cleared
    Verified(WalkReport),
}

/// Summary of a completed run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Version the gates were matched against
    pub current_version: String,
    /// Gates acknowledged during the run, in processing order
    pub acknowledged: Vec<String>,
    /// Gates that were already acknowledged and got cleared first
    pub cleared: Vec<String>,
    /// Gates that do not apply to the current version
    pub skipped: Vec<String>,
}

/// Walks every admin gate through the acknowledgment protocol
pub struct GateAcknowledgmentWalker {
    client: Arc<dyn AdminAckClient>,
    timing: PollTiming,
}

impl GateAcknowledgmentWalker {
    /// Create a walker using the given client and poll timing
    pub fn new(client: Arc<dyn AdminAckClient>, timing: PollTiming) -> Self {
        Self { client, timing }
    }

    /// Run the protocol to completion
    ///
    /// The first failure aborts the run. Cancelling `cancel` stops any
    /// in-flight call or wait and returns [`Error::Cancelled`].
    #[instrument(skip(self, cancel))]
    pub async fn run(&self, cancel: &CancellationToken) -> Result<WalkOutcome> {
        let gates = cancellable(cancel, "reading admin gates", self.client.admin_gates()).await?;
        let gates = match gates {
            Some(gates) if !gates.is_empty() => gates,
            _ => {
                info!("Skipping admin ack verification: not in this baseline or no gates defined");
                return Ok(WalkOutcome::FeatureAbsent);
            }
        };
        let acks = cancellable(cancel, "reading admin acks", self.client.admin_acks()).await?;
        let status = self.cluster_version_status(cancel).await?;

        let mut report = WalkReport {
            current_version: current_version(&status.history).to_string(),
            ..Default::default()
        };
        let gates = parse_gates(&gates)?;
        info!(
            gates = gates.len(),
            version = %report.current_version,
            "Verifying admin gates"
        );

        for gate in &gates {
            if !gate_applicable(&gate.version, &report.current_version) {
                debug!(
                    gate = %gate.key,
                    gate_version = %gate.version,
                    "Gate does not apply to current version"
                );
                report.skipped.push(gate.key.clone());
                continue;
            }

            if acks.get(&gate.key).map(String::as_str) == Some(ACK_VALUE) {
                self.check_acked_gate(gate, cancel).await?;
                cancellable(
                    cancel,
                    "clearing admin ack",
                    self.client.set_admin_ack(&gate.key, ""),
                )
                .await?;
                info!(gate = %gate.key, "Cleared existing admin ack");
                report.cleared.push(gate.key.clone());
            }

            self.wait_for_admin_ack_required(gate, cancel).await?;

            cancellable(
                cancel,
                "writing admin ack",
                self.client.set_admin_ack(&gate.key, ACK_VALUE),
            )
            .await?;
            info!(gate = %gate.key, "Acknowledged gate");
            report.acknowledged.push(gate.key.clone());
        }

        self.wait_for_upgradeable(cancel).await?;
        info!(
            acknowledged = report.acknowledged.len(),
            skipped = report.skipped.len(),
            "Admin ack verified"
        );
        Ok(WalkOutcome::Verified(report))
    }

    /// A gate acked before the run must not be the reason Upgradeable is False
    async fn check_acked_gate(
        &self,
        gate: &GateDefinition,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let status = self.cluster_version_status(cancel).await?;
        if !is_explicitly_false(&status) {
            return Ok(());
        }

        if admin_ack_required_with_message(&status, &gate.description) {
            return Err(Error::contradiction(
                &gate.key,
                format!(
                    "gate {} has been ack'ed but Upgradeable is false with reason \
                     AdminAckRequired and message {:?}",
                    gate.key, gate.description
                ),
            ));
        }

        warn!(
            gate = %gate.key,
            upgradeable = %describe_upgradeable(&status),
            "Gate has been ack'ed; Upgradeable is false but not due to this gate"
        );
        Ok(())
    }

    async fn cluster_version_status(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ClusterVersionStatus> {
        cancellable(
            cancel,
            "reading cluster version",
            self.client.cluster_version_status(),
        )
        .await
    }

    async fn wait_for_admin_ack_required(
        &self,
        gate: &GateDefinition,
        cancel: &CancellationToken,
    ) -> Result<()> {
        info!(gate = %gate.key, "Waiting for Upgradeable to be AdminAckRequired");
        let client = &self.client;
        let message = gate.description.as_str();

        poll_until(
            self.timing,
            cancel,
            format!("Upgradeable to go AdminAckRequired with message {:?}", message),
            || async move {
                let status = client.cluster_version_status().await?;
                let observed = describe_upgradeable(&status);
                if admin_ack_required_with_message(&status, message) {
                    Ok(Probe::done(observed))
                } else {
                    Ok(Probe::pending(observed))
                }
            },
        )
        .await
    }

    async fn wait_for_upgradeable(&self, cancel: &CancellationToken) -> Result<()> {
        info!("Waiting for Upgradeable true");
        let client = &self.client;

        poll_until(self.timing, cancel, "Upgradeable to go true", || async move {
            let status = client.cluster_version_status().await?;
            let observed = describe_upgradeable(&status);
            if is_explicitly_false(&status) {
                Ok(Probe::pending(observed))
            } else {
                Ok(Probe::done(observed))
            }
        })
        .await
    }
}

/// Await a remote call unless the caller cancels first
async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled(operation)),
        result = fut => result,
    }
}
