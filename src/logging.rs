//! Logging setup for FreshKart.
//!
//! Three sinks share one registry: the console, the main log file, and an
//! optional audit file that only receives events on
//! [`AUDIT_TARGET`](crate::auth::AUDIT_TARGET). Each sink carries its own
//! filter, so `RUST_LOG` narrows the console and main file without dropping
//! audit records.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::auth::AUDIT_TARGET;
use crate::config::{LogFormat, LoggingConfig};
use crate::{FreshkartError, Result};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Parse log level string to tracing Level.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(parse_level(level).into())
}

fn audit_filter() -> Targets {
    Targets::new().with_target(AUDIT_TARGET, Level::INFO)
}

/// Open `path` for writing, creating parent directories.
fn open_log_file(path: &str) -> Result<Arc<File>> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(Arc::new(File::create(path)?))
}

fn formatted<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_current_span(false)
            .with_filter(filter)
            .boxed(),
    }
}

/// Initialize logging from configuration.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = vec![
        formatted(
            config.format,
            std::io::stdout,
            config.format == LogFormat::Text,
            level_filter(&config.level),
        ),
        formatted(
            config.format,
            open_log_file(&config.file)?,
            false,
            level_filter(&config.level),
        ),
    ];

    if let Some(path) = config.audit_file.as_deref().filter(|p| !p.is_empty()) {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(open_log_file(path)?)
                .with_current_span(false)
                .with_filter(audit_filter())
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| FreshkartError::Config(format!("failed to initialize logging: {e}")))
}

/// Console-only logging, used when the configured sinks cannot be opened.
pub fn init_console_only(level: &str) {
    // Already installed is fine (tests, repeated calls).
    let _ = tracing_subscriber::registry()
        .with(formatted(
            LogFormat::Text,
            std::io::stdout,
            true,
            level_filter(level),
        ))
        .try_init();
}
