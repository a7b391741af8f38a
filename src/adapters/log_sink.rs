//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  Each line starts with a fixed tag so the journal can
//! be grepped by kind.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::RelaysApplied(r) => {
                info!(
                    "RELAYS | st699={} dhw_on={} ch_on={} dhw_off={}",
                    u8::from(r.legacy_override_active),
                    u8::from(r.hot_water_demand),
                    u8::from(r.central_heating_demand),
                    u8::from(r.domestic_hot_water_inhibit),
                );
            }
            AppEvent::CommandUnrecognized { channel, text } => {
                warn!("CMD | {:?} unrecognised: {:?}", channel, text.as_str());
            }
            AppEvent::HardwareFault { fault, attempt } => {
                warn!("FAULT | {} (attempt {})", fault, attempt);
            }
            AppEvent::Degraded(fault) => {
                error!("FAULT | {} -> degraded to programmer control", fault);
            }
            AppEvent::ReadingInvalid(reason) => {
                warn!("TEMP | {}, CH demand held", reason);
            }
            AppEvent::PersistenceFailed(e) => {
                warn!("STORE | {}", e);
            }
            AppEvent::Status(s) => {
                info!(
                    "STATUS | state={:?} | T={} target={:.1}\u{00b0}C active={} | \
                     hw={} ch={} | cycles={} faults={}",
                    s.state,
                    s.temperature_c
                        .map_or_else(|| "n/a".to_owned(), |t| format!("{t:.2}\u{00b0}C")),
                    s.target_c,
                    s.heating_requested,
                    u8::from(s.relays.hot_water_demand),
                    u8::from(s.relays.central_heating_demand),
                    s.cycles,
                    s.hardware_faults,
                );
            }
        }
    }
}
