//! CLI argument definitions using clap derive

use crate::config::{CleanupConfig, ConanApi, ConanConfig};
use crate::usage::DescriptorWalker;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// conan-cleanup - remove Conan packages no project uses
///
/// Collects the packages referenced by every conaninfo.txt under a project
/// root, compares them with the local Conan cache and removes the rest.
#[derive(Parser, Debug)]
#[command(name = "conan-cleanup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CONAN_CLEANUP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove cached packages no project uses
    Clean(CleanArgs),

    /// Show the packages projects under a root use
    Used(UsedArgs),

    /// List the packages in the local Conan cache
    Inventory(InventoryArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Where to look for descriptors
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory holding project build trees
    pub root: PathBuf,

    /// Descriptor file name to look for (repeatable; default: conaninfo.txt)
    #[arg(long = "descriptor", value_name = "NAME")]
    pub descriptor_names: Vec<String>,

    /// Descriptors parsed concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Do not follow symlinks while walking the root
    #[arg(long)]
    pub no_follow_links: bool,
}

impl ScanArgs {
    pub fn walker(&self, config: &CleanupConfig) -> DescriptorWalker {
        let names = if self.descriptor_names.is_empty() {
            config.descriptor_names.clone()
        } else {
            self.descriptor_names.clone()
        };
        DescriptorWalker::new(&self.root)
            .with_names(names)
            .follow_links(config.follow_links && !self.no_follow_links)
    }

    pub fn concurrency(&self, config: &CleanupConfig) -> usize {
        self.jobs.unwrap_or(config.parse_concurrency).max(1)
    }
}

/// Overrides for the Conan executable
#[derive(Args, Debug, Default)]
pub struct ConanArgs {
    /// Conan executable name or path
    #[arg(long = "conan", value_name = "PATH")]
    pub binary: Option<String>,

    /// Conan command-line dialect
    #[arg(long = "conan-api", value_enum)]
    pub api: Option<ConanApi>,

    /// Timeout for each conan invocation, in seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl ConanArgs {
    /// Config values with command-line overrides applied
    pub fn apply(&self, config: &ConanConfig) -> ConanConfig {
        let mut merged = config.clone();
        if let Some(ref binary) = self.binary {
            merged.binary = binary.clone();
        }
        if let Some(api) = self.api {
            merged.api = api;
        }
        if let Some(secs) = self.timeout_secs {
            merged.timeout_secs = secs;
        }
        merged
    }
}

/// Arguments for the clean command
#[derive(Parser, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Remove every orphan without asking
    #[arg(short = 'f', long, visible_alias = "force")]
    pub auto: bool,

    /// Report orphans without removing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Keep recipes whose binaries were all removed
    #[arg(long)]
    pub keep_empty_recipes: bool,

    /// Output format for the summary
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub conan: ConanArgs,
}

/// Arguments for the used command
#[derive(Parser, Debug)]
pub struct UsedArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the inventory command
#[derive(Parser, Debug)]
pub struct InventoryArgs {
    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub conan: ConanArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listings and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

impl OutputFormat {
    /// Whether stdout is reserved for machine-readable output
    pub fn is_machine(self) -> bool {
        !matches!(self, Self::Table)
    }
}
