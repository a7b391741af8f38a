//! Command interpretation.
//!
//! Raw command text arrives per [`Channel`]; the command source routes text
//! to the right channel before [`interpret`] is called.  Matching is
//! substring based and case sensitive, and each channel only recognises its
//! own tokens:
//!
//! | Channel          | Mailbox | Tokens (checked in this order) |
//! |------------------|---------|--------------------------------|
//! | `LegacyOverride` | `st699` | `st699on`, `st699off`          |
//! | `HotWater`       | `HW`    | `HWoff`, `HWon`                |
//! | `CentralHeating` | `CH`    | `CHoff`, `CH=<number>`         |

use serde::{Deserialize, Serialize};

/// Capacity of the text kept for an unrecognised command.
pub const COMMAND_TEXT_CAP: usize = 64;

/// Original text of an unrecognised command, truncated to
/// [`COMMAND_TEXT_CAP`] bytes on a char boundary.
pub type CommandText = heapless::String<COMMAND_TEXT_CAP>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "st699")]
    LegacyOverride,
    #[serde(rename = "HW")]
    HotWater,
    #[serde(rename = "CH")]
    CentralHeating,
}

impl Channel {
    /// Polling order within one cycle: override first so HW/CH commands
    /// in the same cycle see the new state.
    pub const ALL: [Self; 3] = [Self::LegacyOverride, Self::HotWater, Self::CentralHeating];

    /// Mailbox (folder / spool file) name for this channel.
    pub const fn mailbox(self) -> &'static str {
        match self {
            Self::LegacyOverride => "st699",
            Self::HotWater => "HW",
            Self::CentralHeating => "CH",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LegacyOverrideOn,
    LegacyOverrideOff,
    HotWaterOn,
    HotWaterOff,
    CentralHeatingOff,
    /// New setpoint in °C.  Always finite.
    CentralHeatingSetTarget(f64),
    Unrecognized(CommandText),
}

impl Command {
    /// Build an `Unrecognized` carrying as much of `raw` as fits.
    pub fn unrecognized(raw: &str) -> Self {
        let mut text = CommandText::new();
        for c in raw.chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        Self::Unrecognized(text)
    }

    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

/// Map raw command text on `channel` to a [`Command`].  Never panics.
pub fn interpret(channel: Channel, raw: &str) -> Command {
    match channel {
        Channel::LegacyOverride => {
            if raw.contains("st699on") {
                Command::LegacyOverrideOn
            } else if raw.contains("st699off") {
                Command::LegacyOverrideOff
            } else {
                Command::unrecognized(raw)
            }
        }
        Channel::HotWater => {
            if raw.contains("HWoff") {
                Command::HotWaterOff
            } else if raw.contains("HWon") {
                Command::HotWaterOn
            } else {
                Command::unrecognized(raw)
            }
        }
        Channel::CentralHeating => {
            if raw.contains("CHoff") {
                Command::CentralHeatingOff
            } else if let Some(idx) = raw.find("CH=") {
                match parse_target(&raw[idx + 3..]) {
                    Some(target) => Command::CentralHeatingSetTarget(target),
                    None => Command::unrecognized(raw),
                }
            } else {
                Command::unrecognized(raw)
            }
        }
    }
}

/// First whitespace-delimited token up to the next `=`, as a finite float.
fn parse_target(rest: &str) -> Option<f64> {
    let segment = rest.split('=').next()?;
    let token = segment.split_whitespace().next()?;
    token.parse::<f64>().ok().filter(|t| t.is_finite())
}
