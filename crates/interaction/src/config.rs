use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

/// Tunable constants of the interaction pipeline. All fields default when
/// absent from a TOML source, so a partial file only overrides what it names.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionTuning {
    /// Degrees a reading must travel past the current sector's edge before a
    /// new sector is adopted. Observed behavior bounds this between roughly
    /// 2 and 24.
    pub hysteresis_degrees: f64,
    /// Half-width of the no-change band around the 0/180 sort-order
    /// boundaries, roughly 5 to 15 degrees.
    pub sort_deadband_degrees: f64,
    /// Quiet window before a debounced chart refresh or backend call fires.
    pub debounce_ms: u64,
    /// Marker pose polling period.
    pub poll_interval_ms: u64,
    /// Capacity of the per-marker rotation smoothing window.
    pub smoothing_window: usize,
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            hysteresis_degrees: 15.0,
            sort_deadband_degrees: 12.0,
            debounce_ms: 550,
            poll_interval_ms: 50,
            smoothing_window: 5,
        }
    }
}

impl InteractionTuning {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
