//! Port traits: the hexagonal boundary between control logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (relays, thermometer, mailboxes, state store, event
//! sinks) implement these traits.  The
//! [`Controller`](super::service::Controller) consumes them via generics,
//! so the domain core never touches GPIO or the filesystem directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::Channel;
use crate::config::ControllerConfig;
use crate::error::{CommandSourceError, HardwareFault, InvalidReading, PersistenceError};
use crate::relay::RelayOutput;

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for a single relay output.
///
/// `active` is the logical level; the adapter owns electrical polarity.
pub trait RelayPort {
    fn write(&mut self, output: RelayOutput, active: bool) -> Result<(), HardwareFault>;
}

// ───────────────────────────────────────────────────────────────
// Temperature port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Room temperature in °C.  Failure is explicit, never a sentinel value.
pub trait TemperaturePort {
    fn read_celsius(&mut self) -> Result<f64, InvalidReading>;
}

// ───────────────────────────────────────────────────────────────
// Command source port (driving adapter: mailboxes → domain)
// ───────────────────────────────────────────────────────────────

/// Delivers the most recent raw command text per channel.
///
/// Each call consumes what it returns: the next poll yields `None` until
/// a newer command arrives.  Older pending commands are discarded.
pub trait CommandSource {
    fn poll(&mut self, channel: Channel) -> Result<Option<String>, CommandSourceError>;
}

// ───────────────────────────────────────────────────────────────
// Persistence port (driven adapter: domain → state store)
// ───────────────────────────────────────────────────────────────

/// Write-behind history of channel status and setpoint changes.
///
/// Failures are reported to the caller but never block relay control.
pub trait PersistencePort {
    fn record_status(&mut self, record: &StatusRecord) -> Result<(), PersistenceError>;

    fn record_target(&mut self, record: &TargetRecord) -> Result<(), PersistenceError>;

    /// Most recently recorded setpoint, if any.
    fn last_target(&self) -> Result<Option<TargetRecord>, PersistenceError>;
}

/// On/off status written for a channel whenever its relay changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelStatus {
    #[serde(rename = "on")]
    On,
    #[serde(rename = "off")]
    Off,
}

impl From<bool> for ChannelStatus {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub channel: Channel,
    pub status: ChannelStatus,
    pub timestamp: DateTime<Utc>,
}

/// CH setpoint and whether the thermostat should follow it.  Written on
/// every `CH=` and `CHoff`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub target_c: f64,
    /// False after `CHoff`, and in records written before the field existed.
    #[serde(default)]
    pub heating_requested: bool,
    pub timestamp: DateTime<Utc>,
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ config file)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Returns [`ControllerConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;

    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
