//! Subscriber setup for binaries embedding a mux.
//!
//! The library itself only emits `tracing` events. Call
//! [`LogConfig::try_init`] once at startup to print them.
//!
//! ```no_run
//! use funcmux::logging::LogConfig;
//! use tracing::Level;
//!
//! LogConfig::new().level(Level::DEBUG).ansi(false).try_init().ok();
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Error from installing the global subscriber.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Log output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level when `RUST_LOG` is unset.
    pub level: Level,
    /// Whether to print the event target.
    pub include_target: bool,
    /// Whether to color the output.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            include_target: true,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum log level.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets whether to include the target module path.
    #[must_use]
    pub fn include_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Sets whether to emit ANSI colors.
    #[must_use]
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Verbose settings for local development.
    #[must_use]
    pub fn development() -> Self {
        Self::new().level(Level::DEBUG)
    }

    /// The filter this configuration installs: `RUST_LOG` when set,
    /// otherwise the configured level.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_ascii_lowercase()))
    }

    /// Install a global fmt subscriber.
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already installed.
    pub fn try_init(self) -> Result<(), InitError> {
        tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_target(self.include_target)
            .with_ansi(self.ansi)
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = LogConfig::new().level(Level::WARN).include_target(false).ansi(false);
        assert_eq!(config.level, Level::WARN);
        assert!(!config.include_target);
        assert!(!config.ansi);
        assert_eq!(LogConfig::development().level, Level::DEBUG);
    }
}
