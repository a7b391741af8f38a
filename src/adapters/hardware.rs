//! Hardware adapter: bridges output pins to the [`RelayPort`] trait.
//!
//! Owns one `OutputPin` per relay and the electrical polarity of each.
//! This is the only place where logical "active" becomes a pin level.
//! The legacy override line is wired through a normally-closed contact,
//! so it is active LOW.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::{RelayPort, TemperaturePort};
use crate::error::{HardwareFault, InvalidReading};
use crate::relay::RelayOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    pub const fn pin_state(self, active: bool) -> PinState {
        let high = match self {
            Self::ActiveHigh => active,
            Self::ActiveLow => !active,
        };
        if high { PinState::High } else { PinState::Low }
    }
}

/// Concrete [`RelayPort`] over four output pins, indexed in
/// [`RelayOutput::ALL`] order.
pub struct GpioRelayDriver<P: OutputPin> {
    pins: [P; 4],
    polarity: [Polarity; 4],
}

impl<P: OutputPin> GpioRelayDriver<P> {
    /// Board wiring: legacy override active LOW, the rest active HIGH.
    pub fn new(legacy_override: P, hot_water: P, central_heating: P, dhw_inhibit: P) -> Self {
        Self {
            pins: [legacy_override, hot_water, central_heating, dhw_inhibit],
            polarity: [
                Polarity::ActiveLow,
                Polarity::ActiveHigh,
                Polarity::ActiveHigh,
                Polarity::ActiveHigh,
            ],
        }
    }

    #[must_use]
    pub fn with_polarity(mut self, output: RelayOutput, polarity: Polarity) -> Self {
        self.polarity[output as usize] = polarity;
        self
    }

    pub fn polarity(&self, output: RelayOutput) -> Polarity {
        self.polarity[output as usize]
    }
}

impl<P: OutputPin> RelayPort for GpioRelayDriver<P> {
    fn write(&mut self, output: RelayOutput, active: bool) -> Result<(), HardwareFault> {
        let idx = output as usize;
        let state = self.polarity[idx].pin_state(active);
        self.pins[idx].set_state(state).map_err(|e| {
            warn!("GPIO: {} write failed: {:?}", output.name(), e);
            HardwareFault::new(output)
        })
    }
}

// ── Board ─────────────────────────────────────────────────────

/// The relay driver and thermometer as one adapter, for
/// [`Controller::run_cycle`](crate::app::service::Controller::run_cycle).
pub struct Board<R, T> {
    pub relays: R,
    pub thermometer: T,
}

impl<R: RelayPort, T> RelayPort for Board<R, T> {
    fn write(&mut self, output: RelayOutput, active: bool) -> Result<(), HardwareFault> {
        self.relays.write(output, active)
    }
}

impl<R, T: TemperaturePort> TemperaturePort for Board<R, T> {
    fn read_celsius(&mut self) -> Result<f64, InvalidReading> {
        self.thermometer.read_celsius()
    }
}

/// Fixed room temperature for `--simulate` runs.
pub struct SimThermometer {
    celsius: f64,
}

impl SimThermometer {
    pub fn new(celsius: f64) -> Self {
        Self { celsius }
    }

    pub fn set(&mut self, celsius: f64) {
        self.celsius = celsius;
    }
}

impl TemperaturePort for SimThermometer {
    fn read_celsius(&mut self) -> Result<f64, InvalidReading> {
        Ok(self.celsius)
    }
}
