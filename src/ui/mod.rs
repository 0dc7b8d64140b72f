//! UI module for consistent, modern CLI experience
//!
//! Uses `cliclack` for interactive prompts and spinners with automatic
//! fallback to plain output in CI/non-interactive environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use conan_cleanup::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//!
//! ui::intro(&ctx, "conan-cleanup");
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Querying the Conan cache...");
//! // ... do work ...
//! spinner.stop("Cache holds 42 packages");
//!
//! ui::step_warn_hint(&ctx, "1 descriptor skipped", "see the summary");
//! ui::outro_success(&ctx, "Cache is clean");
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    candidate_outcome, format_size, intro, key_value, outro_error, outro_success, outro_warn,
    remark, section, step_error_detail, step_info, step_ok, step_warn_hint,
};
pub use progress::{RemovalProgress, TaskSpinner};
pub use prompts::{confirm_inline, select, PromptConfirmer};
pub use theme::{init_theme, Accent, CleanupTheme};
