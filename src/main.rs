//! conan-cleanup - Conan cache reconciliation
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use conan_cleanup::cli::args::{ConfigAction, ConfigArgs};
use conan_cleanup::cli::{commands, Cli, Commands, RunStatus};
use conan_cleanup::config::{Config, ConfigManager};
use conan_cleanup::error::CleanupResult;
use conan_cleanup::ui;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CleanupResult<RunStatus> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // `config init` must be able to replace a broken file
    let config = match config_manager.load().await {
        Ok(config) => config,
        Err(_) if is_config_init(&cli.command) => Config::default(),
        Err(e) => return Err(e),
    };

    init_logging(cli.verbose, &config.general.log_format);
    debug!("Using config {}", config_manager.path().display());
    ui::init_theme(theme_accent(&cli.command));

    match cli.command {
        Commands::Clean(args) => commands::clean(args, &config).await,
        Commands::Used(args) => commands::used(args, &config)
            .await
            .map(|()| RunStatus::Success),
        Commands::Inventory(args) => commands::inventory(args, &config)
            .await
            .map(|()| RunStatus::Success),
        Commands::Config(args) => commands::config(args, &config, &config_manager)
            .await
            .map(|()| RunStatus::Success),
    }
}

fn is_config_init(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Init { .. })
        })
    )
}

fn theme_accent(command: &Commands) -> ui::Accent {
    match command {
        Commands::Clean(args) if !args.dry_run => ui::Accent::Destructive,
        _ => ui::Accent::ReadOnly,
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug
///
/// Logs go to stderr so JSON summaries on stdout stay parseable.
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("conan_cleanup=warn"),
        1 => EnvFilter::new("conan_cleanup=info"),
        _ => EnvFilter::new("conan_cleanup=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
