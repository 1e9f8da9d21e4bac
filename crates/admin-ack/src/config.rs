//! Verifier configuration
//!
//! Resolution order for every setting (highest priority first):
//! 1. Command-line flag
//! 2. Environment variable (`ADMIN_ACK_KUBECONFIG`, `ADMIN_ACK_NAMESPACE`,
//!    `ADMIN_ACK_POLL_INTERVAL_SECS`, `ADMIN_ACK_TIMEOUT_SECS`)
//! 3. Built-in default; for the kubeconfig that is kube's own inference
//!    (`KUBECONFIG` / `~/.kube/config` / in-cluster)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use admin_ack_common::kube_utils::{create_client, PollTiming};
use admin_ack_common::{Result, DEFAULT_ADMIN_ACKS_NAMESPACE};

use crate::client::{AdminAckClient, KubeAdminAckClient};

/// Connection and timing flags shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Path to kubeconfig (defaults to kube's standard resolution)
    #[arg(long, env = "ADMIN_ACK_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace holding the admin-acks ConfigMap
    #[arg(long, env = "ADMIN_ACK_NAMESPACE", default_value = DEFAULT_ADMIN_ACKS_NAMESPACE)]
    pub acks_namespace: String,

    /// Seconds between Upgradeable checks
    #[arg(
        long,
        env = "ADMIN_ACK_POLL_INTERVAL_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    /// Seconds to wait for each Upgradeable transition
    #[arg(
        long,
        env = "ADMIN_ACK_TIMEOUT_SECS",
        default_value_t = 180,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

/// Resolved configuration for a verifier run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Explicit kubeconfig, or `None` to infer
    pub kubeconfig: Option<PathBuf>,
    /// Namespace holding the admin-acks ConfigMap
    pub acks_namespace: String,
    /// Interval and deadline for every wait
    pub timing: PollTiming,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            acks_namespace: DEFAULT_ADMIN_ACKS_NAMESPACE.to_string(),
            timing: PollTiming::default(),
        }
    }
}

impl From<&ConnectionArgs> for VerifierConfig {
    fn from(args: &ConnectionArgs) -> Self {
        Self {
            kubeconfig: args.kubeconfig.clone(),
            acks_namespace: args.acks_namespace.clone(),
            timing: PollTiming::new(
                Duration::from_secs(args.poll_interval_secs),
                Duration::from_secs(args.timeout_secs),
            ),
        }
    }
}

impl VerifierConfig {
    /// Connect to the cluster and build the admin ack client
    pub async fn connect(&self) -> Result<Arc<dyn AdminAckClient>> {
        let client = create_client(self.kubeconfig.as_deref()).await?;
        Ok(Arc::new(KubeAdminAckClient::with_acks_namespace(
            client,
            self.acks_namespace.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        connection: ConnectionArgs,
    }

    const ENV_FALLBACKS: [&str; 4] = [
        "ADMIN_ACK_KUBECONFIG",
        "ADMIN_ACK_NAMESPACE",
        "ADMIN_ACK_POLL_INTERVAL_SECS",
        "ADMIN_ACK_TIMEOUT_SECS",
    ];

    #[test]
    fn defaults_match_protocol_timing() {
        // Flag defaults are only observable when no env fallback is set
        if ENV_FALLBACKS.iter().any(|var| std::env::var_os(var).is_some()) {
            return;
        }
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        let config = VerifierConfig::from(&cli.connection);
        assert_eq!(config.acks_namespace, "openshift-config");
        assert_eq!(config.timing, PollTiming::default());
        assert_eq!(config, VerifierConfig {
            kubeconfig: cli.connection.kubeconfig.clone(),
            ..VerifierConfig::default()
        });
    }

    #[test]
    fn flags_override_defaults() {
        let cli = TestCli::try_parse_from([
            "test",
            "--kubeconfig",
            "/tmp/kc",
            "--acks-namespace",
            "my-config",
            "--poll-interval-secs",
            "2",
            "--timeout-secs",
            "30",
        ])
        .unwrap();
        let config = VerifierConfig::from(&cli.connection);
        assert_eq!(config.kubeconfig, Some(PathBuf::from("/tmp/kc")));
        assert_eq!(config.acks_namespace, "my-config");
        assert_eq!(config.timing.interval, Duration::from_secs(2));
        assert_eq!(config.timing.timeout, Duration::from_secs(30));
    }

    #[test]
    fn default_config_uses_protocol_timing() {
        let config = VerifierConfig::default();
        assert_eq!(config.kubeconfig, None);
        assert_eq!(config.acks_namespace, DEFAULT_ADMIN_ACKS_NAMESPACE);
        assert_eq!(config.timing.interval, Duration::from_secs(10));
        assert_eq!(config.timing.timeout, Duration::from_secs(180));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(TestCli::try_parse_from(["test", "--poll-interval-secs", "0"]).is_err());
    }
}
