//! Mock adapters for integration tests.
//!
//! Records every relay write and event so tests can assert on the full
//! history without touching real GPIO.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use piheat::app::events::AppEvent;
use piheat::app::ports::{CommandSource, EventSink, RelayPort, TemperaturePort};
use piheat::command::Channel;
use piheat::error::{CommandSourceError, HardwareFault, InvalidReading};
use piheat::relay::{RelayConfig, RelayOutput};

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Every successful write in order.
    pub writes: Vec<(RelayOutput, bool)>,
    /// Logical level per output, indexed like `RelayOutput::ALL`.
    pub levels: [bool; 4],
    /// Fail every write to this output while set.
    pub fail_output: Option<RelayOutput>,
    /// Next temperature sample.
    pub temperature: Result<f64, InvalidReading>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            levels: [false; 4],
            fail_output: None,
            temperature: Ok(20.0),
        }
    }

    /// What the wire shows, as a logical configuration.
    pub fn observed(&self) -> RelayConfig {
        RelayConfig {
            legacy_override_active: self.levels[RelayOutput::LegacyOverride as usize],
            hot_water_demand: self.levels[RelayOutput::HotWaterOn as usize],
            central_heating_demand: self.levels[RelayOutput::CentralHeatingOn as usize],
            domestic_hot_water_inhibit: self.levels[RelayOutput::DomesticHotWaterInhibit as usize],
        }
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayPort for MockHardware {
    fn write(&mut self, output: RelayOutput, active: bool) -> Result<(), HardwareFault> {
        if self.fail_output == Some(output) {
            return Err(HardwareFault::new(output));
        }
        self.levels[output as usize] = active;
        self.writes.push((output, active));
        Ok(())
    }
}

impl TemperaturePort for MockHardware {
    fn read_celsius(&mut self) -> Result<f64, InvalidReading> {
        self.temperature
    }
}

// ── MockMailbox ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockMailbox {
    pending: HashMap<Channel, VecDeque<String>>,
    pub unavailable: bool,
}

#[allow(dead_code)]
impl MockMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, channel: Channel, text: &str) {
        self.pending.entry(channel).or_default().push_back(text.to_owned());
    }
}

impl CommandSource for MockMailbox {
    /// Newest message wins; older ones are dropped.
    fn poll(&mut self, channel: Channel) -> Result<Option<String>, CommandSourceError> {
        if self.unavailable {
            return Err(CommandSourceError::Unavailable);
        }
        let queue = self.pending.entry(channel).or_default();
        let newest = queue.pop_back();
        queue.clear();
        Ok(newest)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Time ──────────────────────────────────────────────────────

#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200 + secs, 0).unwrap()
}
