#[cfg(not(debug_assertions))]
use human_panic::setup_panic;

#[cfg(debug_assertions)]
extern crate better_panic;

use std::process::ExitCode;
use utils::app_config::AppConfig;

/// Exit code for configuration errors (missing key, missing transfer tool, ...)
const EXIT_CONFIGURATION: u8 = 1;

/// The main entry point of the application.
#[tokio::main]
async fn main() -> ExitCode {
    // Human Panic. Only enabled when *not* debugging.
    #[cfg(not(debug_assertions))]
    {
        setup_panic!();
    }

    // Better Panic. Only enabled *when* debugging.
    #[cfg(debug_assertions)]
    {
        better_panic::Settings::debug()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .install();
    }

    // Initialize Configuration first
    let config_contents = include_str!("resources/default_config.toml");
    if let Err(e) = AppConfig::init(Some(config_contents)) {
        eprintln!("dirsync: {}", e);
        return ExitCode::from(EXIT_CONFIGURATION);
    }

    // Parse CLI arguments, set up logging and run the command
    match cli::cli_match().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dirsync: {}", e);
            ExitCode::from(EXIT_CONFIGURATION)
        }
    }
}
