//! Controller configuration.
//!
//! All tunable parameters for the heating controller.  Loaded from a JSON
//! file through [`ConfigPort`](crate::app::ports::ConfigPort); a missing
//! file means defaults.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::fsm::ControlState;
use crate::pins;
use crate::thermostat::SetpointComparison;

/// GPIO line numbers (BCM) for the four relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPins {
    pub legacy_override: u32,
    pub hot_water: u32,
    pub central_heating: u32,
    pub dhw_inhibit: u32,
}

impl Default for RelayPins {
    fn default() -> Self {
        Self {
            legacy_override: pins::LEGACY_OVERRIDE_GPIO,
            hot_water: pins::HOT_WATER_GPIO,
            central_heating: pins::CENTRAL_HEATING_GPIO,
            dhw_inhibit: pins::DHW_INHIBIT_GPIO,
        }
    }
}

impl RelayPins {
    pub fn as_array(&self) -> [u32; 4] {
        [
            self.legacy_override,
            self.hot_water,
            self.central_heating,
            self.dhw_inhibit,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Control policy ---
    /// State entered at boot before any command arrives.
    pub boot_state: ControlState,
    /// Treatment of a reading exactly at the setpoint.
    pub setpoint_comparison: SetpointComparison,
    /// Setpoint (°C) used until a `CH=` command or a restored value.
    pub default_target_c: f64,
    /// Re-run the thermostat every cycle while a setpoint is active.
    pub reevaluate_each_cycle: bool,
    /// Reload the last persisted setpoint at boot.
    pub restore_target_on_boot: bool,
    /// Hand the relays back to the mechanical programmer on shutdown.
    pub release_to_legacy_on_exit: bool,

    // --- Timing ---
    /// Seconds between controller cycles.
    pub poll_interval_secs: u64,
    /// Readings older than this are treated as invalid.
    pub max_reading_age_secs: u64,
    /// Cycles between status snapshots (0 = never).
    pub status_interval_cycles: u64,

    // --- Fault handling ---
    /// Extra attempts after a failed relay write before degrading.
    pub hardware_retries: u8,
    /// Sensor read attempts per cycle.
    pub sensor_attempts: u8,
    /// Delay between sensor read attempts (milliseconds).
    pub sensor_retry_delay_ms: u64,

    // --- Hardware ---
    pub pins: RelayPins,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            boot_state: ControlState::LegacyOverride,
            setpoint_comparison: SetpointComparison::Strict,
            default_target_c: 20.0,
            reevaluate_each_cycle: true,
            restore_target_on_boot: true,
            release_to_legacy_on_exit: true,

            poll_interval_secs: 5,
            max_reading_age_secs: 300,
            status_interval_cycles: 60,

            hardware_retries: 1,
            sensor_attempts: 3,
            sensor_retry_delay_ms: 200,

            pins: RelayPins::default(),
        }
    }
}

/// Upper bound for `max_reading_age_secs` (one day).
pub const MAX_READING_AGE_LIMIT_SECS: u64 = 86_400;

/// Upper bound for `(sensor_attempts - 1) * sensor_retry_delay_ms`.
pub const MAX_SENSOR_BLOCK_MS: u64 = 2_000;

impl ControllerConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_target_c.is_finite() || !(5.0..=35.0).contains(&self.default_target_c) {
            return Err(ConfigError::ValidationFailed(
                "default_target_c must be 5.0–35.0",
            ));
        }
        if !(1..=3600).contains(&self.poll_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_secs must be 1–3600",
            ));
        }
        if self.max_reading_age_secs < self.poll_interval_secs {
            return Err(ConfigError::ValidationFailed(
                "max_reading_age_secs must be >= poll_interval_secs",
            ));
        }
        if self.max_reading_age_secs > MAX_READING_AGE_LIMIT_SECS {
            return Err(ConfigError::ValidationFailed(
                "max_reading_age_secs must be <= 86400",
            ));
        }
        if self.hardware_retries > 5 {
            return Err(ConfigError::ValidationFailed("hardware_retries must be 0–5"));
        }
        if !(1..=10).contains(&self.sensor_attempts) {
            return Err(ConfigError::ValidationFailed("sensor_attempts must be 1–10"));
        }
        if self.sensor_retry_delay_ms > 5000 {
            return Err(ConfigError::ValidationFailed(
                "sensor_retry_delay_ms must be 0–5000",
            ));
        }
        // The sensor read blocks the control loop between retries.
        let blocked_ms = u64::from(self.sensor_attempts.saturating_sub(1)) * self.sensor_retry_delay_ms;
        if blocked_ms > MAX_SENSOR_BLOCK_MS {
            return Err(ConfigError::ValidationFailed(
                "sensor retries may block for at most 2000 ms per read",
            ));
        }
        let pins = self.pins.as_array();
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                return Err(ConfigError::ValidationFailed("relay pins must be distinct"));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> core::time::Duration {
        core::time::Duration::from_secs(self.poll_interval_secs)
    }
}
