use stackprobe::cli::commands::{CatalogCommands, CliArgs, Commands};
use stackprobe::cli::handlers::{handle_catalog_show, handle_catalog_validate, handle_detect};
use stackprobe::util::{init_logging, LoggingConfig};
use stackprobe::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("stackprobe v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args, args.quiet).await,
        Commands::Catalog(CatalogCommands::Validate(validate_args)) => {
            handle_catalog_validate(validate_args, args.quiet)
        }
        Commands::Catalog(CatalogCommands::Show(show_args)) => handle_catalog_show(show_args),
    };

    std::process::exit(exit_code);
}
