//! Structured logging setup for the binary.

use std::env;
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives, e.g. `debug` or `solvekit_lang=trace`
pub const LOG_ENV: &str = "SOLVEKIT_LOG";
/// `pretty` (default) or `json`
pub const LOG_FORMAT_ENV: &str = "SOLVEKIT_LOG_FORMAT";

/// Install a stderr subscriber configured from the environment.
///
/// Logging is `off` unless `SOLVEKIT_LOG` is set. Returns `Ok(false)` when a
/// subscriber was already installed.
pub fn init() -> Result<bool, String> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level = env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
    let filter = if level.eq_ignore_ascii_case("off") {
        EnvFilter::default().add_directive(LevelFilter::OFF.into())
    } else {
        EnvFilter::try_new(&level).map_err(|err| format!("Invalid {LOG_ENV} filter: {err}"))?
    };

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());
    let use_json = format.eq_ignore_ascii_case("json");
    if !use_json && !format.eq_ignore_ascii_case("pretty") {
        return Err(format!("Invalid {LOG_FORMAT_ENV} (expected 'json' or 'pretty')"));
    }

    // stdout carries results and the server protocol
    let registry = tracing_subscriber::registry().with(filter);
    let result = if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).pretty())
            .try_init()
    };
    result.map_err(|err| format!("Failed to initialize logging: {err}"))?;

    Ok(true)
}
