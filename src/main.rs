//! header-strip-sync
//!
//! Regenerates the proxy's header-stripping middleware from the OWASP
//! Secure Headers reference list when it changes.
//!
//! # Architecture Overview
//!
//! ```text
//!   remote JSON ──▶ source ──▶ ┌──────────────────────┐ ◀── document::version
//!                             │ lifecycle::transaction│
//!                             └──────────┬───────────┘
//!                                        │ snapshot, write
//!                                        ▼
//!                              document::writer ──▶ middleware .yaml
//!                                        │
//!                                        ▼ restart (optional)
//!                              health::passive ◀── proxy log
//!                                        │
//!                                        ▼
//!                               commit │ rollback
//! ```
//!
//! # Exit codes
//! - `0` already up to date
//! - `10` updated
//! - `1` failed, nothing changed
//! - `3` failed after the write, rolled back

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use header_strip_sync::config::{resolve_config, Overrides};
use header_strip_sync::lifecycle::{CommandRestarter, UpdateOrchestrator, UpdateOutcome};
use header_strip_sync::observability::{init_console, init_logging};
use header_strip_sync::source::CommandFetcher;

const EXIT_UP_TO_DATE: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_ROLLED_BACK: u8 = 3;
const EXIT_UPDATED: u8 = 10;

#[derive(Parser)]
#[command(name = "header-strip-sync", version)]
#[command(about = "Sync the proxy's header-stripping middleware with the OWASP reference list", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(cli.config.as_deref(), cli.overrides) {
        Ok(config) => config,
        Err(e) => {
            let _console = init_console();
            tracing::error!(error = %e, "Cannot load configuration");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let _logging = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            let _console = init_console();
            tracing::error!(error = %e, "Cannot start logging");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    tracing::info!(
        url = %config.source.url,
        document = %config.document.path.display(),
        restart = config.restart.enabled,
        window_secs = config.monitor.window_secs,
        proxy_log = ?config.monitor.log_path,
        "Configuration loaded"
    );

    let fetcher = CommandFetcher::from_command_line(&config.source.fetch_command);
    let restarter = CommandRestarter::new(config.restart.command.clone());
    let orchestrator = UpdateOrchestrator::new(config, fetcher, restarter);

    match orchestrator.run().await {
        Ok(UpdateOutcome::UpToDate { .. }) => ExitCode::from(EXIT_UP_TO_DATE),
        Ok(UpdateOutcome::Updated { .. }) => ExitCode::from(EXIT_UPDATED),
        Err(failure) if failure.rolled_back => ExitCode::from(EXIT_ROLLED_BACK),
        Err(_) => ExitCode::from(EXIT_FAILED),
    }
}
