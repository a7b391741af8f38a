//! Shared mutable context threaded through every FSM handler.
//!
//! Handlers read the latest reading and setpoint from here and write the
//! desired relay configuration back.  The controller compares
//! [`ControllerContext::relays`] with the bank after each dispatch and
//! applies the difference.

use crate::error::InvalidReading;
use crate::relay::RelayConfig;
use crate::thermostat::ThermostatEngine;

pub struct ControllerContext {
    // -- Outputs --
    /// Desired relay configuration.  Always interlock-consistent.
    pub relays: RelayConfig,

    // -- Setpoint --
    /// Most recent CH setpoint (°C).  Survives state changes.
    pub target_c: f64,
    /// A `CH=` command is in effect and the thermostat should drive CH
    /// whenever the controller is in charge.  Survives state changes;
    /// cleared only by `CHoff`.
    pub heating_requested: bool,

    // -- Inputs --
    /// Latest usable room temperature, already checked for age.
    pub reading: Result<f64, InvalidReading>,
    pub thermostat: ThermostatEngine,

    // -- Diagnostics --
    /// Set when a thermostat evaluation was skipped; taken by the
    /// controller after each dispatch.
    pub rejected_reading: Option<InvalidReading>,
}

impl ControllerContext {
    pub fn new(thermostat: ThermostatEngine, target_c: f64) -> Self {
        Self {
            relays: RelayConfig::legacy_override(),
            target_c,
            heating_requested: false,
            reading: Err(InvalidReading::Missing),
            thermostat,
            rejected_reading: None,
        }
    }

    /// Drive CH from the thermostat.  An invalid reading or target holds
    /// the current CH demand.
    pub fn apply_thermostat(&mut self) {
        let decision = self
            .reading
            .and_then(|actual| self.thermostat.decide(actual, self.target_c));
        match decision {
            Ok(d) => self.relays = self.relays.with_central_heating(d.should_heat),
            Err(e) => self.rejected_reading = Some(e),
        }
    }

    pub fn take_rejected_reading(&mut self) -> Option<InvalidReading> {
        self.rejected_reading.take()
    }
}
