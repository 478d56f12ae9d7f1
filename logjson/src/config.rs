//! Encoder configuration.

use serde::Deserialize;

use crate::{Error, Result};

/// Deepest supported cycle detection threshold. Encoding recurses once per
/// nesting level, so thresholds beyond this risk exhausting the stack before
/// a cycle is ever detected.
pub const MAX_CYCLE_DETECTION_DEPTH: usize = 1024;

/// Tuning knobs for a [`LogJson`](crate::LogJson) instance.
///
/// Deserializable so it can sit inside an application's own config file;
/// missing fields take their defaults.
///
/// ```
/// use logjson::Config;
///
/// let config = Config::default().with_cycle_detection_depth(16);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Containers are only checked for cycles once the output is nested
    /// deeper than this.
    pub cycle_detection_depth: usize,
    /// Maximum number of idle encoders kept for reuse.
    pub pool_capacity: usize,
    /// Encoders whose buffer grew beyond this many bytes are dropped rather
    /// than pooled.
    pub max_pooled_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_detection_depth: 128,
            pool_capacity: 32,
            max_pooled_buffer: 64 * 1024,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_cycle_detection_depth(mut self, depth: usize) -> Self {
        self.cycle_detection_depth = depth;
        self
    }

    #[must_use]
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_max_pooled_buffer(mut self, bytes: usize) -> Self {
        self.max_pooled_buffer = bytes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle_detection_depth > MAX_CYCLE_DETECTION_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "cycle_detection_depth must be at most {MAX_CYCLE_DETECTION_DEPTH} (got {})",
                self.cycle_detection_depth
            )));
        }
        if self.pool_capacity > 0 && self.max_pooled_buffer == 0 {
            return Err(Error::InvalidConfig(
                "max_pooled_buffer must be non-zero when pooling is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
