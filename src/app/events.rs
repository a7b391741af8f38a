//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use chrono::{DateTime, Utc};

use crate::command::{Channel, CommandText};
use crate::error::{HardwareFault, InvalidReading, PersistenceError};
use crate::fsm::ControlState;
use crate::relay::RelayConfig;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(ControlState),

    /// The FSM transitioned between states.
    StateChanged { from: ControlState, to: ControlState },

    /// A new configuration reached the hardware.
    RelaysApplied(RelayConfig),

    /// Command text on `channel` matched no known token.
    CommandUnrecognized { channel: Channel, text: CommandText },

    /// A relay write failed.  `attempt` counts from 1.
    HardwareFault { fault: HardwareFault, attempt: u8 },

    /// Retries exhausted; control was handed back to the programmer.
    Degraded(HardwareFault),

    /// A thermostat evaluation was skipped.
    ReadingInvalid(InvalidReading),

    /// A status or setpoint record could not be stored.
    PersistenceFailed(PersistenceError),

    /// Periodic snapshot.
    Status(ControllerStatus),
}

/// A point-in-time view of the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerStatus {
    pub state: ControlState,
    pub relays: RelayConfig,
    pub target_c: f64,
    pub heating_requested: bool,
    /// Latest reading in °C, if one is usable.
    pub temperature_c: Option<f64>,
    pub reading_taken_at: Option<DateTime<Utc>>,
    pub cycles: u64,
    pub hardware_faults: u32,
}
