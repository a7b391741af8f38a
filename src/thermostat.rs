//! Thermostat decision: should central heating run?
//!
//! Pure and deterministic.  Comparison at the setpoint is configurable;
//! the default is strict (a room exactly at target is warm enough).

use serde::{Deserialize, Serialize};

use crate::error::InvalidReading;

/// How a reading equal to the target is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SetpointComparison {
    /// Heat while `actual < target`.
    #[default]
    Strict,
    /// Heat while `actual <= target`.
    Inclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermostatDecision {
    pub should_heat: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThermostatEngine {
    comparison: SetpointComparison,
}

impl ThermostatEngine {
    pub const fn new(comparison: SetpointComparison) -> Self {
        Self { comparison }
    }

    pub const fn comparison(&self) -> SetpointComparison {
        self.comparison
    }

    /// Decide from an actual and a target temperature (°C).
    ///
    /// A non-finite reading never resolves to "heat on"; the caller keeps
    /// the previous CH demand instead.
    pub fn decide(&self, actual_c: f64, target_c: f64) -> Result<ThermostatDecision, InvalidReading> {
        if !actual_c.is_finite() {
            return Err(InvalidReading::NotFinite);
        }
        if !target_c.is_finite() {
            return Err(InvalidReading::InvalidTarget);
        }
        let should_heat = match self.comparison {
            SetpointComparison::Strict => actual_c < target_c,
            SetpointComparison::Inclusive => actual_c <= target_c,
        };
        Ok(ThermostatDecision { should_heat })
    }
}
