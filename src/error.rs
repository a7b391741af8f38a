//! Unified error types for the heating controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! controller loop's error handling uniform.  All variants are `Copy` so
//! they can be passed through the state machine and event sink without
//! allocation.
//!
//! Only [`HardwareFault`] may force a state transition (to
//! `LegacyOverride`); every other kind is absorbed by the cycle that
//! produced it.

use core::fmt;

use crate::relay::RelayOutput;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A relay output could not be written.
    Hardware(HardwareFault),
    /// The temperature reading is missing, stale or not a number.
    Reading(InvalidReading),
    /// A relay configuration breaks the wiring interlocks.
    Interlock(InterlockViolation),
    /// The persistence collaborator rejected a write.
    Persistence(PersistenceError),
    /// The command source could not be polled.
    CommandSource(CommandSourceError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Reading(e) => write!(f, "reading: {e}"),
            Self::Interlock(e) => write!(f, "interlock: {e}"),
            Self::Persistence(e) => write!(f, "persistence: {e}"),
            Self::CommandSource(e) => write!(f, "command source: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Hardware faults
// ---------------------------------------------------------------------------

/// A write to one relay output failed.  Callers must not assume any of the
/// other outputs in the same `apply` took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareFault {
    pub output: RelayOutput,
}

impl HardwareFault {
    pub const fn new(output: RelayOutput) -> Self {
        Self { output }
    }
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write to {} failed", self.output.name())
    }
}

impl From<HardwareFault> for Error {
    fn from(e: HardwareFault) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Temperature readings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReading {
    /// Reading was NaN or infinite.
    NotFinite,
    /// The setpoint itself is not a finite number.
    InvalidTarget,
    /// No reading has been taken yet.
    Missing,
    /// The last reading is older than the configured maximum age.
    Stale,
    /// The sensor reported a failure.
    SensorFailed,
}

impl fmt::Display for InvalidReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinite => write!(f, "reading is not finite"),
            Self::InvalidTarget => write!(f, "target is not finite"),
            Self::Missing => write!(f, "no reading available"),
            Self::Stale => write!(f, "reading is stale"),
            Self::SensorFailed => write!(f, "sensor read failed"),
        }
    }
}

impl From<InvalidReading> for Error {
    fn from(e: InvalidReading) -> Self {
        Self::Reading(e)
    }
}

// ---------------------------------------------------------------------------
// Interlock violations
// ---------------------------------------------------------------------------

/// Wiring interlock violations.  Accumulated as a bitmask by
/// [`crate::safety::check`] so that several can be reported at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterlockViolation {
    /// An automatic relay is energised while the legacy programmer is in
    /// control.
    AutomaticUnderOverride = 0b0000_0001,
    /// The inhibit relay disagrees with `CH && !HW`.
    InhibitMismatch = 0b0000_0010,
}

impl InterlockViolation {
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for InterlockViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutomaticUnderOverride => write!(f, "automatic relay energised under legacy override"),
            Self::InhibitMismatch => write!(f, "dhw inhibit does not match CH and not HW"),
        }
    }
}

impl From<InterlockViolation> for Error {
    fn from(e: InterlockViolation) -> Self {
        Self::Interlock(e)
    }
}

// ---------------------------------------------------------------------------
// Persistence / command source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceError {
    /// Backend I/O failed.
    IoError,
    /// Stored state could not be decoded.
    Corrupted,
    /// Record could not be encoded.
    Encode,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored state corrupted"),
            Self::Encode => write!(f, "record encoding failed"),
        }
    }
}

impl From<PersistenceError> for Error {
    fn from(e: PersistenceError) -> Self {
        Self::Persistence(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSourceError {
    /// The source could not be reached.
    Unavailable,
    /// A command was present but not valid UTF-8 text.
    InvalidText,
}

impl fmt::Display for CommandSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "command source unavailable"),
            Self::InvalidText => write!(f, "command is not valid text"),
        }
    }
}

impl From<CommandSourceError> for Error {
    fn from(e: CommandSourceError) -> Self {
        Self::CommandSource(e)
    }
}

impl From<crate::app::ports::ConfigError> for Error {
    fn from(e: crate::app::ports::ConfigError) -> Self {
        use crate::app::ports::ConfigError;
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::Corrupted => Self::Config("config file corrupted"),
            ConfigError::IoError => Self::Config("config file unreadable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
