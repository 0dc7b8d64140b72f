//! Conan package manager integration
//!
//! Provides the cache abstraction the cleanup pipeline works against and
//! its implementation on top of the `conan` executable (1.x or 2.x).

pub mod cache;
mod cli;
pub mod search;

pub use cache::{InventoryEntry, PackageCache};
pub use cli::ConanCli;

/// Max number of output lines to include in error details.
const ERROR_TAIL_LINES: usize = 20;

/// Extract the useful tail of command output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `ERROR_TAIL_LINES`
/// non-empty lines.
pub(crate) fn command_output_tail(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();
    let total = lines.len();
    let tail = if total > ERROR_TAIL_LINES {
        &lines[total - ERROR_TAIL_LINES..]
    } else {
        &lines[..]
    };
    tail.join("\n")
}
