// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Configures a suitable default [`tracing`] implementation for apps built on a [`Hierarchy`](crate::Hierarchy).
//!
//! This uses a compact log format, and will write all logs to a temporary file in debug mode.
//! This also uses a default filter, which can be overwritten using `RUST_LOG`.
//! This will include all [`DEBUG`](tracing::Level::DEBUG) messages in debug mode,
//! and all [`INFO`](tracing::Level::INFO) level messages in release mode.
//!
//! Reconciliation passes are logged in a `reconcile` span, and layout-only passes in a
//! `relayout` span. Individual element mutations are logged at `TRACE` level.
//!
//! If a `tracing` backend is already configured, this will not overwrite that.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::time::{SystemTime, UNIX_EPOCH};

use time::macros::format_description;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

/// Constructs a default tracing subscriber with a given `default_level` filter.
///
/// Returns the subscriber, and the error in case of a (recoverable) error.
pub fn default_tracing_subscriber(
    default_level: LevelFilter,
) -> (impl Subscriber, Option<Box<dyn Error>>) {
    // Use EnvFilter to allow the user to override the log level without recompiling.
    let env_filter_builder = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("RUST_LOG");
    let err = env_filter_builder
        .from_env()
        .err()
        .map(|err| format!("failed to parse RUST_LOG environment variable: {err:#}").into());
    let env_filter = env_filter_builder.from_env_lossy();

    // Time without the date, with millisecond precision, and no target.
    let timer = UtcTime::new(format_description!(
        // We append a `Z` here to indicate clearly that this is a UTC time
        "[hour repr:24]:[minute]:[second].[subsecond digits:3]Z"
    ));
    // If modifying, also update the module level docs
    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(timer.clone())
        .with_target(false)
        .with_filter(env_filter);

    // We skip the layer which stores to a file in `--release` mode for performance.
    let log_file_layer = if cfg!(debug_assertions) {
        log_file().map(|(file, path)| {
            #[allow(clippy::print_stderr, reason = "Can only use stderr")]
            {
                // Tracing isn't set up yet, and might be configured to eat this message.
                eprintln!("---");
                eprintln!("Writing full logs to {}", path.display());
                eprintln!("---");
            }
            // Note that this layer does not use the provided filter, and instead logs all events.
            tracing_subscriber::fmt::layer()
                .with_timer(timer)
                .with_writer(file)
                .with_ansi(false)
        })
    } else {
        None
    };

    let registry = tracing_subscriber::registry()
        .with(console_layer)
        .with(log_file_layer);

    (registry, err)
}

fn log_file() -> Option<(File, std::path::PathBuf)> {
    let id = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_millis();
    let path = std::env::temp_dir().join(format!("render-core-{id:016}-dense.log"));
    let file = File::create(&path).ok()?;
    Some((file, path))
}

/// An Error indicating that a tracing subscriber has been set before.
#[derive(Debug)]
pub struct TracingSubscriberHasBeenSetError;

impl fmt::Display for TracingSubscriberHasBeenSetError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.pad("A tracing subscriber has been set before.")
    }
}

impl Error for TracingSubscriberHasBeenSetError {}

fn init_with_default_level(default_level: LevelFilter) -> Result<(), TracingSubscriberHasBeenSetError> {
    let (subscriber, err) = default_tracing_subscriber(default_level);

    // Setting the global default only fails if a subscriber already exists.
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| TracingSubscriberHasBeenSetError)?;
    if let Some(err) = err {
        tracing::error!("Initialising logging encountered recoverable error: {err}");
    }

    Ok(())
}

/// Initialise tracing with a default subscriber for a unit test.
/// This ignores most messages to limit noise (but will still log all messages to a file).
pub fn try_init_test_tracing() -> Result<(), TracingSubscriberHasBeenSetError> {
    init_with_default_level(LevelFilter::WARN)
}

/// Initialise tracing with a default subscriber for an end-user application.
pub fn try_init_tracing() -> Result<(), TracingSubscriberHasBeenSetError> {
    // Default level is DEBUG in --dev, INFO in --release, unless a level is passed.
    // DEBUG prints one summary per pass. INFO should only print logs for noteworthy things.
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    init_with_default_level(default_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_init_test_tracing_errors() {
        let _first_result = try_init_test_tracing();
        let second_result = try_init_test_tracing();
        assert!(second_result.is_err());
    }
}
