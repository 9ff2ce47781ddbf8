use std::time::Duration;

use serde::Deserialize;

use crate::form::{FormError, FormResult};

/// Timings of the simulated submission.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Delay between entering `Submitting` and the success notification.
    pub submit_delay_ms: u64,
    /// Delay between the success notification and the form reset.
    pub reset_delay_ms: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            submit_delay_ms: 300,
            reset_delay_ms: 2_000,
        }
    }
}

impl EngineOptions {
    pub fn from_toml_str(source: &str) -> FormResult<Self> {
        toml::from_str(source).map_err(|error| FormError::ConfigInvalid(error.to_string()))
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}
