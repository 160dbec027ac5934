pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CatalogCommands, CliArgs, Commands, DetectArgs};
pub use output::{DetectionOutput, OutputFormat, OutputFormatter};
