//! Logging configuration helpers.
//!
//! The analyzers emit structured events through the `tracing` crate: spans
//! around each profiling operation, warnings whenever a tolerated sub-query
//! fails and a field is omitted. This module provides a small configuration
//! surface for embedding applications that do not bring their own
//! subscriber.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for engine components.
    pub base_level: Level,
    /// Whether to include per-query debug events.
    pub log_queries: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_queries: false,
        }
    }
}

impl LogConfig {
    /// Verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_queries: true,
        }
    }

    /// Minimal configuration for production embedding.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_queries: false,
        }
    }

    /// The `EnvFilter` directive equivalent of this configuration.
    ///
    /// `RUST_LOG` still wins when set, so operators can override without a
    /// rebuild.
    pub fn filter(&self) -> EnvFilter {
        let directive = if self.log_queries {
            format!("sqlite_eda={}", self.base_level).to_lowercase()
        } else {
            format!(
                "sqlite_eda={},sqlite_eda::sources=warn",
                self.base_level
            )
            .to_lowercase()
        };

        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    }
}

/// Installs a global subscriber for the given configuration.
///
/// Returns quietly if a subscriber is already installed, so library users
/// who configured their own logging are never clobbered.
pub fn init(config: &LogConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .try_init();
}
