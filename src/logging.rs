//! Diagnostic logging setup.
//!
//! User-facing progress goes through [crate::ui]; this only wires `tracing`
//! events to stderr. `RUST_LOG` overrides the level picked from the CLI.

use crate::error::{ReleaseError, Result};
use std::io;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "obs_release=debug"
    } else {
        "obs_release=warn"
    }
}

pub fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .map_err(|e| ReleaseError::config(format!("invalid log filter: {}", e)))?;

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()
        .map_err(|e| ReleaseError::config(format!("cannot initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "obs_release=debug");
        assert_eq!(default_directive(false), "obs_release=warn");
        assert!(EnvFilter::try_new(default_directive(false)).is_ok());
    }
}
