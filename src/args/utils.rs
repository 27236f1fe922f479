//! Shared utilities for argument processing.

use crate::args::Args;
use crate::config::Settings;

/// What: Determine the log level from the arguments and settings.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error)
///
/// Details:
/// - The verbose flag overrides `--log-level` and the settings file.
#[must_use]
pub fn determine_log_level(args: &Args, settings: &Settings) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        settings.log_level.clone()
    }
}
