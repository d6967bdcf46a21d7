// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod notifier;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::watch as shutdown;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, LoadedConfig};
use crate::engine::{DedupQueue, SyncWorker};
use crate::exec::{locate_binary, ShellProcessRunner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::notifier::DesktopNotifier;
use crate::watch::WatchSet;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - rsync binary lookup (fatal when missing)
/// - the shared queue and the single sync worker
/// - one file watch per repository
/// - Ctrl-C / SIGTERM handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    info!(config = ?config_path, "using config");
    let cfg = load_and_validate(&config_path)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let rsync = locate_binary(&args.rsync_binary, fs.as_ref())?;
    info!(rsync = ?rsync, "rsync binary resolved");

    if args.dry_run {
        print_dry_run(&cfg, &rsync);
        return Ok(());
    }

    let queue = Arc::new(DedupQueue::new());
    let (shutdown_tx, shutdown_rx) = shutdown::channel(false);

    let worker = SyncWorker::new(
        Arc::clone(&queue),
        ShellProcessRunner,
        Arc::new(DesktopNotifier),
        rsync,
    )
    .spawn(shutdown_rx);

    let watches = WatchSet::start(&cfg.repos, Arc::clone(&queue), fs);

    if watches.is_empty() {
        let _ = shutdown_tx.send(true);
        worker.await?;
        bail!("none of the configured repositories could be watched");
    }

    wait_for_shutdown_signal().await;
    info!("shutdown requested; stopping watches");

    watches.stop().await;
    let _ = shutdown_tx.send(true);
    worker.await?;

    info!("shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTERM; only Ctrl+C will stop syncwatch");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = wait_for_ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Simple dry-run output: print repositories and what would be run.
fn print_dry_run(cfg: &LoadedConfig, rsync: &Path) {
    println!("syncwatch dry-run");
    println!("  rsync = {}", rsync.display());
    println!();

    println!("repositories ({}):", cfg.repos.len());
    for repo in &cfg.repos {
        println!("  - {}", repo.name);
        println!("      source: {}", repo.source.display());
        println!("      destinations: {:?}", repo.destinations);
        println!("      includes: {:?}", repo.includes);
        if !repo.excludes.is_empty() {
            println!("      excludes: {:?}", repo.excludes);
        }
        if !repo.filters.is_empty() {
            println!("      filters: {:?}", repo.filters);
        }
        println!("      options: {:?}", repo.options);
        if repo.notify {
            println!("      notify: true");
        }
    }

    if !cfg.rejected.is_empty() {
        println!();
        println!("rejected ({}):", cfg.rejected.len());
        for rejected in &cfg.rejected {
            println!("  - {}: {}", rejected.name, rejected.error);
        }
    }
}
