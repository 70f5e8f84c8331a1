//! Tracing setup for applications built on Rivulet.
//!
//! The runtime only emits `tracing` events; nothing is printed until a
//! subscriber is installed. [`install_tracing`] installs a formatted stderr
//! subscriber filtered by `RUST_LOG`.

use std::sync::{Mutex, Once};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

static TRACING_INSTALLED: Once = Once::new();
static FALLBACK_LEVEL: Mutex<LevelFilter> = Mutex::new(DEFAULT_LOG_LEVEL);

/// Sets the level used when `RUST_LOG` is unset or invalid.
///
/// Only affects a later [`install_tracing`] call.
pub fn set_default_level(level: LevelFilter) {
    if let Ok(mut guard) = FALLBACK_LEVEL.lock() {
        *guard = level;
    }
}

/// The level used when `RUST_LOG` is unset or invalid.
#[must_use]
pub fn default_level() -> LevelFilter {
    FALLBACK_LEVEL
        .lock()
        .map_or(DEFAULT_LOG_LEVEL, |guard| *guard)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level().into()))
}

/// Install the stderr subscriber (idempotent).
///
/// Does nothing if another global subscriber is already set.
pub fn install_tracing() {
    TRACING_INSTALLED.call_once(|| {
        let result = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_filter(env_filter()),
            )
            .try_init();

        if result.is_err() {
            eprintln!("rivulet: a global tracing subscriber is already installed");
        }
    });
}
