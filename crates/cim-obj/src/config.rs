//! Process-independent switches consulted during value and entity construction.

/// Construction-time configuration.
///
/// The defaults match the behaviour expected by WBEM servers: integer ranges
/// are enforced, NULL keybinding values are rejected and deprecation events
/// carry no caller location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Reject sized integers outside their `[min, max]` range.
    pub enforce_integer_range: bool,
    /// Accept NULL as a keybinding value.
    pub ignore_null_key_value: bool,
    /// Attach the caller location to deprecation events.
    pub debug_origin: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enforce_integer_range: true,
            ignore_null_key_value: false,
            debug_origin: false,
        }
    }
}

impl Config {
    /// Return a copy with integer range enforcement switched on or off.
    pub fn with_integer_range(mut self, enforce: bool) -> Self {
        self.enforce_integer_range = enforce;
        self
    }

    /// Return a copy with NULL keybinding tolerance switched on or off.
    pub fn with_null_key_values(mut self, allow: bool) -> Self {
        self.ignore_null_key_value = allow;
        self
    }

    /// Return a copy with caller locations on deprecation events.
    pub fn with_debug_origin(mut self, enable: bool) -> Self {
        self.debug_origin = enable;
        self
    }
}
