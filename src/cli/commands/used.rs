//! Used command - show the packages projects reference

use crate::cli::args::{OutputFormat, ScanArgs, UsedArgs};
use crate::config::{CleanupConfig, Config};
use crate::error::CleanupResult;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::usage::{aggregate, Usage};
use console::style;

/// Execute the used command
pub async fn execute(args: UsedArgs, config: &Config) -> CleanupResult<()> {
    let ctx = UiContext::detect().with_quiet(args.format.is_machine());
    let usage = scan(&ctx, &args.scan, &config.cleanup).await?;

    match args.format {
        OutputFormat::Table => print_table(&ctx, &usage),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&usage)?),
        OutputFormat::Plain => {
            for reference in usage.used.references() {
                println!("{}", reference);
            }
        }
    }

    Ok(())
}

/// Discover and parse every descriptor under the scan root
pub(crate) async fn scan(
    ctx: &UiContext,
    args: &ScanArgs,
    config: &CleanupConfig,
) -> CleanupResult<Usage> {
    let walker = args.walker(config);
    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("Scanning {}", walker.root().display()));

    let discovery = match walker.discover() {
        Ok(discovery) => discovery,
        Err(e) => {
            spinner.stop_error("Scan failed");
            return Err(e);
        }
    };
    let mut usage = aggregate(&discovery.descriptors, args.concurrency(config)).await;
    usage.skipped.extend(discovery.unreadable);
    usage.skipped.sort_by(|a, b| a.path.cmp(&b.path));

    spinner.stop(&format!(
        "{} package(s) in use across {} descriptor(s)",
        usage.used.len(),
        usage.scanned
    ));
    Ok(usage)
}

/// Warn about every descriptor left out of the used set
fn report_skipped(ctx: &UiContext, usage: &Usage) {
    for skipped in &usage.skipped {
        ui::step_warn_hint(
            ctx,
            &format!("Skipped {}", skipped.path.display()),
            &skipped.reason,
        );
    }
}

fn print_table(ctx: &UiContext, usage: &Usage) {
    if usage.used.is_empty() {
        ui::step_info(ctx, "No package references found");
    }

    for (reference, sources) in usage.used.iter() {
        println!("{}", style(reference).bold());
        for source in sources {
            println!(
                "    {}",
                style(format!("{}:{}", source.path.display(), source.line)).dim()
            );
        }
    }

    report_skipped(ctx, usage);
    println!();
    println!(
        "{} package(s), {} descriptor(s) scanned, {} skipped",
        usage.used.len(),
        usage.scanned,
        usage.skipped.len()
    );
}
