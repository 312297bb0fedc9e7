//! Lightweight verbose logging helpers for the CLI.
//!
//! This is the diagnostic console: request failures are reported through
//! [`error`] in addition to being rendered in the UI. Every message is also a
//! `tracing` event; while the TUI owns the terminal those events are the only
//! record, so the TUI installs [`init_file_log`] first.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::palette;

static VERBOSE: AtomicBool = AtomicBool::new(false);
static SUSPENDED: AtomicBool = AtomicBool::new(false);

/// Enable or disable verbose logging output.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::SeqCst);
}

/// Check whether verbose logging is enabled.
#[must_use]
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Silence stderr while the alternate screen owns the terminal.
pub fn set_suspended(suspended: bool) {
    SUSPENDED.store(suspended, Ordering::SeqCst);
}

fn enabled() -> bool {
    is_verbose() && !SUSPENDED.load(Ordering::SeqCst)
}

/// Emit a verbose info message (no-op when verbosity is disabled).
pub fn info(message: impl AsRef<str>) {
    tracing::info!("{}", message.as_ref());
    if enabled() {
        let (r, g, b) = palette::BLUE_RGB;
        eprintln!("{} {}", "info".truecolor(r, g, b).bold(), message.as_ref());
    }
}

/// Emit a verbose warning message (no-op when verbosity is disabled).
pub fn warn(message: impl AsRef<str>) {
    tracing::warn!("{}", message.as_ref());
    if enabled() {
        let (r, g, b) = palette::ORANGE_RGB;
        eprintln!("{} {}", "warn".truecolor(r, g, b).bold(), message.as_ref());
    }
}

/// Emit a verbose error message (no-op when verbosity is disabled).
pub fn error(message: impl AsRef<str>) {
    tracing::error!("{}", message.as_ref());
    if enabled() {
        let (r, g, b) = palette::RED_RGB;
        eprintln!("{} {}", "error".truecolor(r, g, b).bold(), message.as_ref());
    }
}

// === Log File ===

/// Append diagnostics to `path` for the rest of the process.
///
/// Warnings and errors are always written; `verbose` adds the info-level
/// request lifecycle. `RUST_LOG` overrides both.
pub fn init_file_log(path: &Path, verbose: bool) -> Result<()> {
    let file = open_log_file(path)?;
    file_subscriber(file, verbose)
        .try_init()
        .context("A tracing subscriber is already installed")
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn file_subscriber(file: File, verbose: bool) -> impl Subscriber + Send + Sync + 'static {
    let default = if verbose {
        "brain=info"
    } else {
        "brain=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
}
