//! Logging bootstrap for the CLI.
//!
//! Level and format come from the `[logging]` config section; the
//! `--verbose` / `--json-logs` flags and `RUST_LOG` win over the file.
//! Everything goes to stderr so stdout stays clean for `--json` summaries.

use capshot_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber from config plus CLI overrides.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let level = if verbose {
        "debug"
    } else {
        clamp_level(&config.level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr = fmt::layer().with_writer(std::io::stderr);
    if json_logs || config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr.with_target(false).with_ansi(true))
            .init();
    }
}

/// Clamp a configured level string to one EnvFilter understands.
fn clamp_level(configured: &str) -> &str {
    match configured {
        "error" | "warn" | "info" | "debug" | "trace" => configured,
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_level_passes_known_levels() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert_eq!(clamp_level(level), level);
        }
    }

    #[test]
    fn test_clamp_level_defaults_unknown_to_info() {
        assert_eq!(clamp_level("verbose"), "info");
        assert_eq!(clamp_level(""), "info");
    }
}
