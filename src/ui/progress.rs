//! Progress indicators with CI fallback

use super::context::UiContext;
use super::output;
use crate::cleanup::OrphanCandidate;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
    quiet: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
            quiet: ctx.is_quiet(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else if !self.quiet {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if !self.quiet {
            let mark = if self.interactive { "✓" } else { "[OK]" };
            println!("{} {}", style(mark).green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if !self.quiet {
            let mark = if self.interactive { "✗" } else { "[FAIL]" };
            println!("{} {}", style(mark).red(), message);
        }
    }
}

const REMOVAL_TEMPLATE: &str =
    "  {spinner:.yellow} Removing  {bar:20.yellow/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}";

/// Progress bar over an automatic removal batch
///
/// Shows an indicatif bar in interactive mode and one line per candidate
/// otherwise.

pub struct RemovalProgress {
    bar: Option<ProgressBar>,
    ctx: UiContext,
}

impl RemovalProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            let template = ProgressStyle::default_bar()
                .template(REMOVAL_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(
                template
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };
        Self {
            bar,
            ctx: ctx.clone(),
        }
    }

    /// Advance past a candidate that reached a terminal disposition
    pub fn on_candidate(&self, candidate: &OrphanCandidate) {
        match self.bar {
            Some(ref bar) => {
                bar.inc(1);
                bar.set_message(candidate.to_string());
            }
            None => output::candidate_outcome(&self.ctx, candidate),
        }
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
