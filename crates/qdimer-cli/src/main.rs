//! qdimer Command-Line Interface
//!
//! Runs the tunneling-dimer circuits for every initial state on the local
//! simulator or a remote device and appends the outcome histograms to a CSV
//! log.
//!
//! ```text
//! qdimer --list-backends
//! qdimer --backend simulator --seed 7 --delta 1000 --start 1 --end 5
//! qdimer --no-test --backend least_busy --count 8192 --noise
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::style;
use qdimer_hal::HalError;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::common::{BackendSet, load_config};
use commands::{backends, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_filter()))
        .with_target(false)
        .init();

    if !cli.has_action() {
        eprintln!(
            "{} specify --backend <NAME> to run or --list-backends to see the choices",
            style("Nothing to do:").yellow().bold()
        );
        std::process::exit(1);
    }

    if let Err(e) = execute(&cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        if e
            .downcast_ref::<HalError>()
            .is_some_and(HalError::is_credential_error)
        {
            eprintln!(
                "  Put an IBM Quantum token on the first line of the credential file \
                 or set IBM_QUANTUM_TOKEN"
            );
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let backend_set = BackendSet::discover(&config, cli.no_test).await?;

    if cli.list_backends {
        return backends::execute(&backend_set).await;
    }

    match &cli.backend {
        Some(name) => run::execute(&backend_set, name, &config, cli.emit_qasm.as_deref()).await,
        None => Ok(()),
    }
}
