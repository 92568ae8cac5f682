//! Tracing subscriber setup: a stderr layer plus an optional log file

use anyhow::{Context, Result};
use clap::ValueEnum;
use creator_core::output::OUTPUT_TARGET;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Level for the log file; `notset` leaves the file untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Notset,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn filter(self) -> Option<LevelFilter> {
        match self {
            LogLevel::Notset => None,
            LogLevel::Debug => Some(LevelFilter::DEBUG),
            LogLevel::Info => Some(LevelFilter::INFO),
            LogLevel::Warning => Some(LevelFilter::WARN),
            LogLevel::Error | LogLevel::Critical => Some(LevelFilter::ERROR),
        }
    }
}

pub struct LogOptions {
    pub verbosity: u8,
    pub file: PathBuf,
    pub level: LogLevel,
    pub append: bool,
    pub ansi: bool,
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the stderr level. Messages already shown to the user
/// through `Output` are kept off stderr but still reach the log file.
pub fn init(opts: &LogOptions) -> Result<()> {
    let default_level = match opts.verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level))
        .add_directive(format!("{}=off", OUTPUT_TARGET).parse()?);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(opts.ansi)
        .with_target(false)
        .with_filter(stderr_filter);

    let file_layer = match opts.level.filter() {
        Some(level) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(opts.append)
                .truncate(!opts.append)
                .open(&opts.file)
                .with_context(|| format!("Failed to open log file: {}", opts.file.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(level),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;
    Ok(())
}
