// ============================================================================
// vremix-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger setup for the vremix CLI
//
// The CLI logs through the `log` facade with `env_logger` as the backend.
// `--verbose` selects Debug, otherwise Info; RUST_LOG still overrides the
// level when set.

use console::style;
use log::LevelFilter;
use std::io::Write;

/// Level used when RUST_LOG is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes the global logger.
///
/// Info lines are printed bare so terminal output stays readable; other
/// levels carry a timestamp and a colored level tag.
pub fn init(verbose: bool) {
    let level = default_level(verbose);

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            if record.level() == log::Level::Info {
                return writeln!(buf, "{}", record.args());
            }

            let level_str = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            };

            writeln!(
                buf,
                "{} {} {}",
                style(get_timestamp()).dim(),
                level_str,
                record.args()
            )
        });

    // A logger may already be installed (e.g. in tests)
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Returns the current local time formatted as "HH:MM:SS%.3f".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), LevelFilter::Debug);
        assert_eq!(default_level(false), LevelFilter::Info);
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = get_timestamp();
        // HH:MM:SS.mmm
        assert_eq!(ts.len(), 12);
        assert_eq!(&ts[2..3], ":");
        assert_eq!(&ts[8..9], ".");
    }
}
