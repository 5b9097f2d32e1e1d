//! Mux configuration.

use funcmux_core::DEFAULT_MAX_BODY_SIZE;

/// Configuration for a [`ServeMux`](crate::ServeMux).
///
/// # Example
///
/// ```
/// use funcmux::MuxConfig;
///
/// let config = MuxConfig::new()
///     .name("users")
///     .max_body_size(64 * 1024)
///     .debug(true);
/// assert_eq!(config.max_body_size, 65_536);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxConfig {
    /// Name used in log events.
    pub name: String,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Include error messages in 500 responses.
    pub debug: bool,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            name: String::from("funcmux"),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            debug: false,
        }
    }
}

impl MuxConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mux name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the maximum request body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Enables or disables debug mode.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
