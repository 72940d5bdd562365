use crate::{
    commands::Commands,
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use engine_config::settings::MigrationSettings;
use engine_core::progress::{Reporter, TracingSink};
use engine_runtime::execution::service::MigrationService;
use std::{path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "legacy-migrate",
    version = "0.1.0",
    about = "Migrates the legacy ERP database into the financial dashboard schema"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Env file to load (defaults to ./.env when present)")]
    env_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Print results as JSON instead of text")]
    json: bool,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so --json output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let shutdown = ShutdownCoordinator::new(cancel.clone());
    shutdown.register_handlers();

    let succeeded = match run(cli, cancel).await {
        Ok(succeeded) => succeeded,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            false
        }
    };

    let code = ExitCode::resolve(succeeded, shutdown.is_shutdown_requested());
    std::process::exit(code.as_i32());
}

/// Runs the command; `Ok(false)` means it ran but something failed.
async fn run(cli: Cli, cancel: CancellationToken) -> Result<bool, CliError> {
    if let Commands::Entities = cli.command {
        output::print_entities();
        return Ok(true);
    }

    let env = EnvManager::load(cli.env_file.as_deref())?;
    let settings = MigrationSettings::from_vars(env.all())?;
    info!(?settings, "Settings loaded");

    let reporter = Reporter::new(Arc::new(TracingSink));
    let service = MigrationService::from_settings(&settings, reporter, cancel)?;

    let outcome = execute(&service, cli.command, cli.json).await;
    service.close().await;
    outcome
}

async fn execute(service: &MigrationService, command: Commands, json: bool) -> Result<bool, CliError> {
    match command {
        Commands::Migrate => {
            let summary = service.execute_full_migration().await?;
            output::print_summary(&summary, json)?;
            Ok(summary.success)
        }
        Commands::Entity { name } => {
            let report = service.execute_entity_migration(&name).await?;
            output::print_entity_report(&report, json)?;
            Ok(report.success)
        }
        Commands::TestConn => {
            let check = service.test_connections().await;
            output::print_connection_check(&check, json)?;
            Ok(check.is_ok())
        }
        Commands::Entities => {
            output::print_entities();
            Ok(true)
        }
    }
}
