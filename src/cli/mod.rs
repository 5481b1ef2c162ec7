//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod report;
mod version;

pub use commands::{handle_config_command, ConfigSubcommand};
pub use logging::init_logging;
pub use report::{handle_report_command, handle_types_command, resolve_catalog, OutputFormat};
pub use version::display_version;
