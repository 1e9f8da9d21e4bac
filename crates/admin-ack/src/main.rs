//! admin-ack CLI
//!
//! Verifies the admin ack upgrade-gating protocol against the cluster in the
//! current kubeconfig. Ctrl-C cancels an in-progress verification.

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use admin_ack::Cli;
use admin_ack_common::telemetry::init_logging;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("{}", e);
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    match cli.run(cancel).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(
                kind = ?e.kind(),
                gate = ?e.gate(),
                resource = ?e.resource(),
                "Admin ack verification failed"
            );
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
