//! Per-invocation settings.

use std::time::Duration;

use log::LevelFilter;

use crate::context::Context;

/// Settings shared by every command of one invocation.
///
/// Built once from the command line and handed to whatever needs it; there
/// is no global configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use keylight_rs::Config;
///
/// let config = Config::new()
///     .light("192.168.1.10")
///     .timeout(Duration::from_secs(3));
/// assert_eq!(config.lights, ["192.168.1.10"]);
/// assert_eq!(config.timeout, Duration::from_secs(3));
/// assert_eq!(config.log_level, log::LevelFilter::Info);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicit light addresses; empty means "discover".
    pub lights: Vec<String>,
    pub log_level: LevelFilter,
    /// Upper bound on the whole invocation, discovery included.
    pub timeout: Duration,
}

impl Config {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn light(mut self, address: &str) -> Self {
        self.lights.push(String::from(address));
        self
    }

    pub fn lights(mut self, lights: Vec<String>) -> Self {
        self.lights = lights;
        self
    }

    pub fn log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The context a command runs under: `parent` bounded by the timeout.
    pub fn context(&self, parent: &Context) -> Context {
        parent.with_timeout(self.timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lights: Vec::new(),
            log_level: LevelFilter::Info,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
