//! # Global supervisor configuration.
//!
//! Provides [`Config`], centralized settings for the recording supervisor.
//!
//! ## Field semantics
//! - `kill_grace`: delay between a forced stop and the OS-level kill
//! - `channel_capacity`: per-process event channel size (min 1; clamped)
//! - `defaults`: baseline [`RecordingOptions`] that caller patches merge over

use std::time::Duration;

use crate::options::RecordingOptions;

/// Global configuration for the recording supervisor.
#[derive(Clone, Debug)]
pub struct Config {
    /// How long a forcefully stopped process gets to wind down before the
    /// supervisor sends an OS-level kill. The kill is a safety net; the
    /// interrupt tokens written to stdin are the primary mechanism.
    pub kill_grace: Duration,

    /// Capacity of each process's bounded event channel.
    ///
    /// The per-process monitor blocks on a full channel, so a slow sink
    /// applies backpressure to that one recording only. Minimum value is 1.
    pub channel_capacity: usize,

    /// Default recording options; caller patches merge over these key by key.
    pub defaults: RecordingOptions,
}

impl Config {
    /// Returns the channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn channel_capacity_clamped(&self) -> usize {
        self.channel_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `kill_grace = 5s`
    /// - `channel_capacity = 64`
    /// - `defaults = RecordingOptions::default()`
    fn default() -> Self {
        Self {
            kill_grace: Duration::from_secs(5),
            channel_capacity: 64,
            defaults: RecordingOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_clamped_to_one() {
        let cfg = Config {
            channel_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.channel_capacity_clamped(), 1);
    }
}
