//! One-shot synchronization and dry runs

use colored::Colorize;
use mirror_core::{EventKind, LogEvent, SyncConfig, SyncPlan, SyncReport, Synchronizer};
use mirror_fs::CaseSensitivity;

use super::styled_kind;
use crate::cli::OnceArgs;
use crate::error::Result;

/// Run the once command
///
/// Performs a single synchronization, or only plans it with `--dry-run`.
pub fn run_once(args: &OnceArgs) -> Result<()> {
    let mut config = SyncConfig::new(&args.source, &args.replica);
    if args.case_sensitive {
        config = config.with_case_sensitivity(CaseSensitivity::Sensitive);
    }
    let synchronizer = Synchronizer::new(config)?;

    if args.dry_run {
        let plan = synchronizer.plan()?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let report = synchronizer.synchronize()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_plan(plan: &SyncPlan) {
    if plan.is_empty() {
        println!("{} Replica is up to date.", "OK".green().bold());
        return;
    }
    println!(
        "{} {} action(s) would be performed:",
        "=>".blue().bold(),
        plan.action_count()
    );
    for line in plan.to_string().lines() {
        let (kind, rest) = line.split_once(' ').unwrap_or((line, ""));
        println!("   {} {}", kind.bold(), rest);
    }
    for warning in &plan.warnings {
        print_event(warning);
    }
}

fn print_event(event: &LogEvent) {
    let paths = event
        .paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    match event.message() {
        Some(message) => println!("   {} {} ({})", styled_kind(event.kind()), paths, message.dimmed()),
        None => println!("   {} {}", styled_kind(event.kind()), paths),
    }
}

fn print_report(report: &SyncReport) {
    for event in &report.events {
        print_event(event);
    }

    let errors = report.count(EventKind::Error);
    let summary = format!(
        "{} action(s), {} warning(s), {} error(s)",
        report.action_count(),
        report.count(EventKind::Warning),
        errors
    );
    if errors == 0 {
        println!("{} {}", "OK".green().bold(), summary);
    } else {
        println!("{} {}", "DONE".yellow().bold(), summary);
    }
}
