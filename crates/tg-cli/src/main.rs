//! tgcli binary entrypoint.
//!
//! This is the main entry point for the `tg` command-line tool.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use tg_cli::cli::{Cli, Commands};
use tg_cli::client::CloudClient;
use tg_cli::commands::{CloudCommand, ConfCommand, SecretInput, ServerCommand, VersionCommand};
use tg_cli::CliError;
use tg_config::ConfigStore;

/// Printed when the process is interrupted.
const FAREWELL: &str = "\nTerminating tgcli, Good Bye!";

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let runtime = match build_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    runtime.spawn(async {
        match wait_for_interrupt().await {
            Ok(()) => {
                println!("{FAREWELL}");
                std::process::exit(0);
            }
            Err(e) => warn!(error = %e, "interrupt handler unavailable"),
        }
    });

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create async runtime")
}

async fn wait_for_interrupt() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl-C")?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    Ok(())
}

fn open_store(dir: Option<PathBuf>) -> Result<ConfigStore, CliError> {
    let dir = match dir {
        Some(dir) => dir,
        None => ConfigStore::default_dir()?,
    };
    let store = ConfigStore::open(dir)?;
    debug!(dir = %store.dir().display(), "config opened");
    Ok(store)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Unlocked: the interrupt handler prints too.
    let mut stdout = io::stdout();
    let mut stdin = io::stdin().lock();

    match cli.command {
        Commands::Version => VersionCommand::new().execute(&mut stdout)?,
        Commands::Cloud { command } => {
            let client = CloudClient::new(&cli.cloud_url, &cli.tigertool_url)?;
            let mut cmd = CloudCommand::new(client, open_store(cli.config_dir)?)
                .with_secret_input(SecretInput::detect());
            cmd.execute(&mut stdin, &mut stdout, &command).await?;
        }
        Commands::Server { command } => {
            let cmd = ServerCommand::new(open_store(cli.config_dir)?);
            cmd.execute(&mut stdin, &mut stdout, &command).await?;
        }
        Commands::Conf { command } => {
            let client = CloudClient::new(&cli.cloud_url, &cli.tigertool_url)?;
            let mut cmd = ConfCommand::new(open_store(cli.config_dir)?, client)
                .with_secret_input(SecretInput::detect());
            cmd.execute(&mut stdin, &mut stdout, &command).await?;
        }
    }

    Ok(())
}
