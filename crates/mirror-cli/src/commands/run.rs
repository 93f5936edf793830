//! The long-running mirror daemon

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use mirror_core::{Daemon, DaemonOptions, SyncConfig, Synchronizer};
use mirror_fs::CaseSensitivity;
use mirror_fs::path::is_within;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::logging;

/// Merge the config file (if any) with command-line values; flags win.
pub fn resolve_config(args: &RunArgs) -> Result<SyncConfig> {
    let mut config = match &args.config {
        Some(path) => SyncConfig::load(path)?,
        None => {
            let (Some(source), Some(replica)) = (&args.source, &args.replica) else {
                return Err(CliError::user("source and replica directories are required"));
            };
            SyncConfig::new(source, replica)
        }
    };

    if let Some(source) = &args.source {
        config.source = source.clone();
    }
    if let Some(replica) = &args.replica {
        config.replica = replica.clone();
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = Some(log_file.clone());
    }
    if let Some(interval) = args.interval_seconds {
        config.interval_secs = interval;
    }
    if let Some(debounce) = args.debounce_ms {
        config.debounce_ms = debounce;
    }
    if args.case_sensitive {
        config.case_sensitivity = CaseSensitivity::Sensitive;
    }
    if args.no_watch {
        config.watch = false;
    }

    config.validate()?;
    Ok(config)
}

/// Run the daemon until Ctrl-C.
pub fn run_daemon(args: &RunArgs, verbose: bool) -> Result<()> {
    let config = resolve_config(args)?;
    let log_file: PathBuf = config
        .log_file
        .clone()
        .ok_or_else(|| CliError::user("a log file is required"))?;
    ensure_log_outside_source(&log_file, &config.source)?;
    logging::init(verbose, Some(&log_file))?;

    let options = DaemonOptions::from(&config);
    let synchronizer = match Synchronizer::new(config) {
        Ok(synchronizer) => Arc::new(synchronizer),
        Err(err) => {
            tracing::error!(error = %err, "cannot start mirror");
            return Err(err.into());
        }
    };

    println!(
        "{} Mirroring {} -> {} every {}s{}",
        "=>".blue().bold(),
        synchronizer.source().display().to_string().cyan(),
        synchronizer.replica().display().to_string().cyan(),
        options.interval.as_secs(),
        if options.watch { " and on change" } else { "" }
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let stats = runtime.block_on(Daemon::new(synchronizer, options).run(shutdown_signal()))?;

    println!(
        "{} Stopped after {} run(s): {} action(s), {} error(s), {} failed run(s)",
        "OK".green().bold(),
        stats.runs,
        stats.actions,
        stats.errors,
        stats.failed_runs
    );
    Ok(())
}

/// A log file inside the source tree would make every run look like a
/// change to the watcher, which would trigger another run.
fn ensure_log_outside_source(log_file: &Path, source: &Path) -> Result<()> {
    let log = match log_file.file_name() {
        Some(name) => {
            let parent = log_file
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            comparable(parent).join(name)
        }
        None => comparable(log_file),
    };

    if is_within(&log, &comparable(source)) {
        return Err(CliError::user(format!(
            "log file {} must not be inside the source directory {}",
            log_file.display(),
            source.display()
        )));
    }
    Ok(())
}

/// Best-effort absolute form; symlinks are resolved when the path exists.
fn comparable(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}
