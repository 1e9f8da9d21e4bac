//! Admin ack verifier
//!
//! Exercises the admin ack upgrade-gating protocol of the cluster version
//! operator: every admin gate applicable to the running release is
//! acknowledged, and the Upgradeable condition on `ClusterVersion/version` is
//! checked to react at each step.
//!
//! # Modules
//!
//! - [`gate`] - Gate key format and validation
//! - [`version`] - Current version resolution and gate applicability
//! - [`upgradeable`] - Upgradeable condition inspection
//! - [`client`] - Cluster access trait and kube-backed implementation
//! - [`walker`] - The acknowledgment protocol itself
//! - [`inspect`] - Read-only gate report
//! - [`config`] - Flags, environment, and client construction

#![deny(missing_docs)]

pub mod client;
pub mod config;
pub mod gate;
pub mod inspect;
pub mod upgradeable;
pub mod version;
pub mod walker;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use admin_ack_common::telemetry::LogFormat;
use admin_ack_common::Result;

use crate::config::{ConnectionArgs, VerifierConfig};
use crate::walker::{GateAcknowledgmentWalker, WalkOutcome};

/// Verify the admin ack upgrade-gating protocol of a cluster
#[derive(Parser, Debug)]
#[command(name = "admin-ack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (text or json)
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acknowledge every applicable gate and verify Upgradeable reacts
    Verify(VerifyArgs),
    /// Show gates and their acknowledgment state without changing anything
    Inspect(InspectArgs),
}

/// Arguments for `verify`
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Cluster connection and timing
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Arguments for `inspect`
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Cluster connection
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Run the selected subcommand
    ///
    /// `cancel` aborts an in-progress verification.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        match self.command {
            Commands::Verify(args) => run_verify(args, &cancel).await,
            Commands::Inspect(args) => run_inspect(args).await,
        }
    }
}

async fn run_verify(args: VerifyArgs, cancel: &CancellationToken) -> Result<()> {
    let config = VerifierConfig::from(&args.connection);
    let client = config.connect().await?;
    let walker = GateAcknowledgmentWalker::new(client, config.timing);

    match walker.run(cancel).await? {
        WalkOutcome::FeatureAbsent => {
            println!("Admin ack is not part of this release; nothing to verify");
        }
        WalkOutcome::Verified(report) => {
            info!(
                version = %report.current_version,
                cleared = report.cleared.len(),
                "Verification complete"
            );
            println!(
                "Admin ack verified on {} ({} acknowledged, {} not applicable)",
                report.current_version,
                report.acknowledged.len(),
                report.skipped.len()
            );
            for gate in &report.acknowledged {
                println!("  acknowledged {}", gate);
            }
        }
    }
    Ok(())
}

async fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = VerifierConfig::from(&args.connection);
    let client = config.connect().await?;
    let inspection = inspect::inspect(client.as_ref()).await?;

    if args.json {
        println!("{}", inspection.to_json()?);
        return Ok(());
    }

    println!("Current version: {}", inspection.current_version);
    println!("{}", inspection.upgradeable);
    if inspection.gates.is_empty() {
        println!("No admin gates defined");
        return Ok(());
    }
    for gate in &inspection.gates {
        println!(
            "  {:<50} applicable={:<5} acked={:<5} {}",
            gate.key, gate.applicable, gate.acknowledged, gate.description
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verify_with_global_log_format() {
        let cli = Cli::try_parse_from(["admin-ack", "verify", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Verify(_)));
    }

    #[test]
    fn parses_inspect_json() {
        let cli = Cli::try_parse_from(["admin-ack", "inspect", "--json"]).unwrap();
        match cli.command {
            Commands::Inspect(args) => assert!(args.json),
            _ => panic!("Expected Inspect"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["admin-ack"]).is_err());
    }
}
