//! Inventory command - list the local Conan cache

use crate::cli::args::{InventoryArgs, OutputFormat};
use crate::conan::{ConanCli, InventoryEntry, PackageCache};
use crate::config::Config;
use crate::error::CleanupResult;
use crate::ui::{self, TaskSpinner, UiContext};
use console::style;

/// Execute the inventory command
pub async fn execute(args: InventoryArgs, config: &Config) -> CleanupResult<()> {
    let ctx = UiContext::detect().with_quiet(args.format.is_machine());
    let conan = ConanCli::new(&args.conan.apply(&config.conan));
    let entries = query(&ctx, &conan).await?;

    match args.format {
        OutputFormat::Table => print_table(&ctx, &entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry);
            }
        }
    }

    Ok(())
}

/// Read the cache inventory, sorted by reference
pub(crate) async fn query(
    ctx: &UiContext,
    cache: &dyn PackageCache,
) -> CleanupResult<Vec<InventoryEntry>> {
    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("Querying the {} cache", cache.name()));

    match cache.inventory().await {
        Ok(mut entries) => {
            entries.sort_by(|a, b| a.reference.cmp(&b.reference));
            spinner.stop(&format!("Cache holds {} entries", entries.len()));
            Ok(entries)
        }
        Err(e) => {
            spinner.stop_error("Cache inventory unavailable");
            Err(e)
        }
    }
}

fn print_table(ctx: &UiContext, entries: &[InventoryEntry]) {
    if entries.is_empty() {
        ui::step_info(ctx, "The cache is empty");
        return;
    }

    println!(
        "{:<60} {:>10}",
        style("REFERENCE").bold(),
        style("SIZE").bold()
    );
    println!("{}", "-".repeat(71));

    for entry in entries {
        let size = entry.size.map(ui::format_size).unwrap_or_else(|| "-".to_string());
        println!("{:<60} {:>10}", entry.to_string(), size);
    }

    println!();
    println!("{} cache entries", entries.len());
}
