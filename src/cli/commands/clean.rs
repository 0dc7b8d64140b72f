//! Clean command - remove cached packages no project uses

use super::{inventory, used};
use crate::cleanup::{
    CancelFlag, CleanupExecutor, CleanupMode, CleanupReport, DispositionCounts, OrphanCandidate,
};
use crate::cli::args::{CleanArgs, OutputFormat};
use crate::cli::RunStatus;
use crate::conan::{ConanCli, InventoryEntry};
use crate::config::Config;
use crate::error::CleanupResult;
use crate::journal::RemovalJournal;
use crate::reconcile::reconcile;
use crate::ui::{self, PromptConfirmer, RemovalProgress, UiContext};
use crate::usage::{SkippedDescriptor, Usage};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Machine-readable summary of a clean run
#[derive(Serialize)]
struct CleanSummary<'a> {
    root: &'a Path,
    dry_run: bool,
    mode: &'a str,
    descriptors_scanned: usize,
    skipped_descriptors: &'a [SkippedDescriptor],
    used_packages: usize,
    cache_entries: usize,
    counts: DispositionCounts,
    pruned_counts: DispositionCounts,
    reclaimed_bytes: u64,
    candidates: &'a [OrphanCandidate],
    pruned: &'a [OrphanCandidate],
}

/// Execute the clean command
pub async fn execute(args: CleanArgs, config: &Config) -> CleanupResult<RunStatus> {
    let ctx = UiContext::detect().with_quiet(args.format.is_machine());
    ui::intro(&ctx, "conan-cleanup");

    let usage = used::scan(&ctx, &args.scan, &config.cleanup).await?;

    let conan = ConanCli::new(&args.conan.apply(&config.conan));
    let entries = inventory::query(&ctx, &conan).await?;

    let orphans = reconcile(&usage.used, &entries);
    info!("{} orphan(s) found", orphans.len());

    let report = if args.dry_run || orphans.is_empty() {
        CleanupReport {
            mode: if args.dry_run { "dry-run" } else { "none" },
            candidates: orphans,
            pruned: Vec::new(),
        }
    } else {
        if usage.is_incomplete() {
            ui::step_warn_hint(
                &ctx,
                &format!("{} descriptor(s) could not be read", usage.skipped.len()),
                "packages only they reference are listed as orphans",
            );
        }
        remove(&ctx, &args, config, &conan, &usage, &entries, orphans).await
    };

    let summary = CleanSummary {
        root: &args.scan.root,
        dry_run: args.dry_run,
        mode: report.mode,
        descriptors_scanned: usage.scanned,
        skipped_descriptors: &usage.skipped,
        used_packages: usage.used.len(),
        cache_entries: entries.len(),
        counts: report.counts(),
        pruned_counts: report.pruned_counts(),
        reclaimed_bytes: report.reclaimed_bytes(),
        candidates: &report.candidates,
        pruned: &report.pruned,
    };

    match args.format {
        OutputFormat::Table => print_summary(&ctx, &summary, &report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => print_plain(&report),
    }

    if report.has_failures() {
        Ok(RunStatus::RemovalsFailed)
    } else {
        Ok(RunStatus::Success)
    }
}

async fn remove(
    ctx: &UiContext,
    args: &CleanArgs,
    config: &Config,
    conan: &ConanCli,
    usage: &Usage,
    entries: &[InventoryEntry],
    orphans: Vec<OrphanCandidate>,
) -> CleanupReport {
    let cancel = CancelFlag::new();
    let listener = cancel.listen_for_ctrl_c();
    let journal = RemovalJournal::new(config);

    let confirmer = PromptConfirmer::new(ctx.clone());
    let mode = if args.auto {
        CleanupMode::Automatic
    } else {
        ui::section(ctx, &format!("{} orphan(s) in the cache", orphans.len()));
        CleanupMode::Interactive(&confirmer)
    };

    let progress = args
        .auto
        .then(|| RemovalProgress::new(ctx, orphans.len()));
    let observer = |candidate: &OrphanCandidate| match &progress {
        Some(progress) => progress.on_candidate(candidate),
        None => ui::candidate_outcome(ctx, candidate),
    };

    let report = CleanupExecutor::new(conan, mode)
        .prune_empty_recipes(config.cleanup.prune_empty_recipes && !args.keep_empty_recipes)
        .with_cancel(cancel)
        .with_journal(&journal)
        .with_observer(&observer)
        .run(orphans, &usage.used, entries)
        .await;

    if let Some(progress) = progress {
        progress.finish();
    }
    listener.abort();
    report
}

fn print_counts(ctx: &UiContext, label: &str, counts: &DispositionCounts) {
    ui::key_value(
        ctx,
        label,
        &format!(
            "{} removed, {} failed, {} skipped",
            counts.removed, counts.failed, counts.skipped
        ),
    );
}

fn print_summary(ctx: &UiContext, summary: &CleanSummary<'_>, report: &CleanupReport) {
    if summary.dry_run && !report.candidates.is_empty() {
        ui::section(ctx, "Would remove");
        for candidate in &report.candidates {
            match candidate.entry().size {
                Some(size) => ui::remark(
                    ctx,
                    &format!("{} ({})", candidate, ui::format_size(size)),
                ),
                None => ui::remark(ctx, &candidate.to_string()),
            }
        }
    }

    ui::section(ctx, "Summary");
    ui::key_value(ctx, "Descriptors scanned", &summary.descriptors_scanned.to_string());
    ui::key_value(
        ctx,
        "Descriptors skipped",
        &summary.skipped_descriptors.len().to_string(),
    );
    ui::key_value(ctx, "Packages in use", &summary.used_packages.to_string());
    ui::key_value(ctx, "Cache entries", &summary.cache_entries.to_string());
    ui::key_value(ctx, "Orphans", &report.candidates.len().to_string());

    if !summary.dry_run && !report.candidates.is_empty() {
        print_counts(ctx, "Outcome", &summary.counts);
    }
    if !report.pruned.is_empty() {
        print_counts(ctx, "Empty recipes", &summary.pruned_counts);
    }
    if summary.reclaimed_bytes > 0 {
        ui::key_value(ctx, "Reclaimed", &ui::format_size(summary.reclaimed_bytes));
    }

    for skipped in summary.skipped_descriptors {
        ui::step_warn_hint(
            ctx,
            &format!("Skipped descriptor {}", skipped.path.display()),
            &skipped.reason,
        );
    }
    for candidate in report.skipped() {
        ui::candidate_outcome(ctx, candidate);
    }
    for candidate in report.failures() {
        ui::candidate_outcome(ctx, candidate);
    }

    let failed = summary.counts.failed + summary.pruned_counts.failed;
    if failed > 0 {
        ui::outro_error(ctx, &format!("{} removal(s) failed", failed));
    } else if summary.dry_run {
        ui::outro_success(ctx, "Dry run, nothing removed");
    } else if report.candidates.is_empty() {
        ui::outro_success(ctx, "Cache is clean");
    } else if !summary.skipped_descriptors.is_empty() {
        ui::outro_warn(ctx, "Done, some descriptors were skipped");
    } else {
        ui::outro_success(ctx, "Done");
    }
}

fn print_plain(report: &CleanupReport) {
    for candidate in report.candidates.iter().chain(&report.pruned) {
        println!("{}\t{}", candidate.disposition().label(), candidate);
    }
}
