//! CLI command implementations

pub mod clean;
pub mod config;
pub mod inventory;
pub mod used;

pub use clean::execute as clean;
pub use config::execute as config;
pub use inventory::execute as inventory;
pub use used::execute as used;
