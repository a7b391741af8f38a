//! Controller: the hexagonal core.
//!
//! [`Controller`] owns the FSM, the relay bank and the shared context.
//! All I/O flows through port traits injected at call sites, so the whole
//! service runs against mock adapters in tests.
//!
//! ```text
//!  CommandSource ──▶ ┌──────────────────────────┐ ──▶ EventSink
//! TemperaturePort ──▶│        Controller         │ ──▶ PersistencePort
//!       RelayPort ◀──│  FSM · Thermostat · Bank  │
//!                    └──────────────────────────┘
//! ```
//!
//! Relay writes are retried `hardware_retries` times.  When every attempt
//! fails the controller degrades: it forces `LegacyOverride` and hands the
//! boiler back to the mechanical programmer.  Persistence is write-behind
//! and its failures never block relay control.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::command::{Channel, Command, interpret};
use crate::config::ControllerConfig;
use crate::error::{Error, HardwareFault, InvalidReading};
use crate::fsm::context::ControllerContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{ControlState, ControllerStateMachine, Transition};
use crate::relay::{RelayBank, RelayConfig};
use crate::thermostat::ThermostatEngine;

use super::events::{AppEvent, ControllerStatus};
use super::ports::{
    CommandSource, EventSink, PersistencePort, RelayPort, StatusRecord, TargetRecord,
    TemperaturePort,
};

/// A successful sensor sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub celsius: f64,
    pub taken_at: DateTime<Utc>,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    fsm: ControllerStateMachine,
    ctx: ControllerContext,
    bank: RelayBank,
    config: ControllerConfig,
    latest: Option<Reading>,
    sensor_fault: Option<InvalidReading>,
    cycles: u64,
    hardware_faults: u32,
}

impl Controller {
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig) -> Self {
        let thermostat = ThermostatEngine::new(config.setpoint_comparison);
        let ctx = ControllerContext::new(thermostat, config.default_target_c);
        let fsm = ControllerStateMachine::new(build_state_table(), config.boot_state);

        Self {
            fsm,
            ctx,
            // Unpowered outputs leave the programmer in charge.
            bank: RelayBank::new(RelayConfig::legacy_override()),
            config,
            latest: None,
            sensor_fault: None,
            cycles: 0,
            hardware_faults: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Reload the last persisted setpoint and CH request, if enabled and
    /// present.  The thermostat picks them up on the first tick in
    /// `AutomaticControl`.
    pub fn restore_target(&mut self, store: &impl PersistencePort) {
        if !self.config.restore_target_on_boot {
            return;
        }
        match store.last_target() {
            Ok(Some(rec)) if rec.target_c.is_finite() => {
                info!(
                    "Controller: restored setpoint {:.1}°C (requested={}) from {}",
                    rec.target_c, rec.heating_requested, rec.timestamp
                );
                self.ctx.target_c = rec.target_c;
                self.ctx.heating_requested = rec.heating_requested;
            }
            Ok(Some(rec)) => warn!("Controller: ignoring stored setpoint {}", rec.target_c),
            Ok(None) => debug!("Controller: no stored setpoint"),
            Err(e) => warn!("Controller: could not load setpoint: {e}"),
        }
    }

    /// Enter the boot state and drive every output to match it.
    pub fn start(
        &mut self,
        hw: &mut impl RelayPort,
        store: &mut impl PersistencePort,
        now: DateTime<Utc>,
        sink: &mut impl EventSink,
    ) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("Controller started in {:?}", self.fsm.current_state());
        self.commit(hw, store, now, sink, true);
    }

    /// Hand control back to the programmer before exit, if configured.
    pub fn shutdown(
        &mut self,
        hw: &mut impl RelayPort,
        store: &mut impl PersistencePort,
        now: DateTime<Utc>,
        sink: &mut impl EventSink,
    ) {
        if !self.config.release_to_legacy_on_exit {
            info!("Controller: leaving relays as {:?}", self.bank.read());
            return;
        }
        info!("Controller: releasing control to programmer");
        self.force_state(ControlState::LegacyOverride, sink);
        self.commit(hw, store, now, sink, false);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// One full controller cycle: sample → pending writes → mailboxes →
    /// thermostat → status.
    ///
    /// The `hw` parameter satisfies **both** [`TemperaturePort`] and
    /// [`RelayPort`] to avoid a double mutable borrow.
    pub fn run_cycle(
        &mut self,
        source: &mut impl CommandSource,
        hw: &mut (impl TemperaturePort + RelayPort),
        store: &mut impl PersistencePort,
        now: DateTime<Utc>,
        sink: &mut impl EventSink,
    ) {
        self.cycles += 1;

        // 1. Sample the room
        let sample = hw.read_celsius();
        self.update_reading(sample, now);

        // 2. Retry anything a previous cycle failed to write
        if self.bank.read() != self.ctx.relays {
            self.commit(hw, store, now, sink, false);
        }

        // 3. Mailboxes, override first
        for channel in Channel::ALL {
            match source.poll(channel) {
                Ok(Some(raw)) => {
                    self.handle_command(channel, &raw, hw, store, now, sink);
                }
                Ok(None) => {}
                Err(e) => warn!("Controller: {} mailbox: {e}", channel.mailbox()),
            }
        }

        // 4. Thermostat follow-up
        if self.config.reevaluate_each_cycle {
            self.ctx.reading = self.current_reading(now);
            let t = self.fsm.tick(&mut self.ctx);
            self.report_transition(t, sink);
            self.report_rejected_reading(sink);
            self.commit(hw, store, now, sink, false);
        }

        // 5. Status
        let every = self.config.status_interval_cycles;
        if every > 0 && self.cycles % every == 0 {
            sink.emit(&AppEvent::Status(self.status(now)));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Interpret `raw` on `channel`, dispatch it and apply the result.
    pub fn handle_command(
        &mut self,
        channel: Channel,
        raw: &str,
        hw: &mut impl RelayPort,
        store: &mut impl PersistencePort,
        now: DateTime<Utc>,
        sink: &mut impl EventSink,
    ) -> Transition {
        let command = interpret(channel, raw);
        info!("Controller: {} -> {:?}", channel.mailbox(), command);

        if let Command::Unrecognized(text) = &command {
            sink.emit(&AppEvent::CommandUnrecognized {
                channel,
                text: text.clone(),
            });
        }

        self.ctx.reading = self.current_reading(now);
        let transition = self.fsm.handle(&command, &mut self.ctx);
        self.report_transition(transition, sink);
        self.report_rejected_reading(sink);

        if matches!(
            command,
            Command::CentralHeatingSetTarget(_) | Command::CentralHeatingOff
        ) {
            let rec = TargetRecord {
                target_c: self.ctx.target_c,
                heating_requested: self.ctx.heating_requested,
                timestamp: now,
            };
            if let Err(e) = store.record_target(&rec) {
                warn!("Controller: setpoint not persisted: {e}");
                sink.emit(&AppEvent::PersistenceFailed(e));
            }
        }

        self.commit(hw, store, now, sink, false);
        transition
    }

    /// Record a sensor sample.  Failures keep the previous reading, which
    /// then ages out after `max_reading_age_secs`.
    pub fn update_reading(&mut self, sample: Result<f64, InvalidReading>, now: DateTime<Utc>) {
        match sample {
            Ok(celsius) if celsius.is_finite() => {
                self.latest = Some(Reading {
                    celsius,
                    taken_at: now,
                });
                self.sensor_fault = None;
            }
            Ok(_) => {
                warn!("Controller: sensor returned a non-finite value");
                self.sensor_fault = Some(InvalidReading::NotFinite);
            }
            Err(e) => {
                warn!("Controller: sensor read failed: {e}");
                self.sensor_fault = Some(e);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// The reading the thermostat would use at `now`.
    pub fn current_reading(&self, now: DateTime<Utc>) -> Result<f64, InvalidReading> {
        match self.latest {
            None => Err(self.sensor_fault.unwrap_or(InvalidReading::Missing)),
            Some(r) => {
                let age = now.signed_duration_since(r.taken_at);
                let max_age = i64::try_from(self.config.max_reading_age_secs).unwrap_or(i64::MAX);
                if age.num_seconds() > max_age {
                    Err(InvalidReading::Stale)
                } else {
                    Ok(r.celsius)
                }
            }
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> ControllerStatus {
        ControllerStatus {
            state: self.fsm.current_state(),
            relays: self.bank.read(),
            target_c: self.ctx.target_c,
            heating_requested: self.ctx.heating_requested,
            temperature_c: self.current_reading(now).ok(),
            reading_taken_at: self.latest.map(|r| r.taken_at),
            cycles: self.cycles,
            hardware_faults: self.hardware_faults,
        }
    }

    pub fn state(&self) -> ControlState {
        self.fsm.current_state()
    }

    /// Configuration last applied to the hardware.
    pub fn relays(&self) -> RelayConfig {
        self.bank.read()
    }

    pub fn target_c(&self) -> f64 {
        self.ctx.target_c
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn force_state(&mut self, next: ControlState, sink: &mut impl EventSink) {
        let from = self.fsm.current_state();
        self.fsm.force_transition(next, &mut self.ctx);
        self.report_transition(Transition { from, to: next }, sink);
    }

    fn report_transition(&self, t: Transition, sink: &mut impl EventSink) {
        if t.changed() {
            sink.emit(&AppEvent::StateChanged {
                from: t.from,
                to: t.to,
            });
        }
    }

    fn report_rejected_reading(&mut self, sink: &mut impl EventSink) {
        if let Some(reason) = self.ctx.take_rejected_reading() {
            sink.emit(&AppEvent::ReadingInvalid(reason));
        }
    }

    /// Drive the bank to the context's desired configuration.
    ///
    /// `force` writes even when nothing changed and records every channel.
    fn commit(
        &mut self,
        hw: &mut impl RelayPort,
        store: &mut impl PersistencePort,
        now: DateTime<Utc>,
        sink: &mut impl EventSink,
        force: bool,
    ) {
        let desired = self.ctx.relays;
        let before = self.bank.read();
        if desired == before && !force {
            return;
        }

        let attempts = self.config.hardware_retries.saturating_add(1);
        let mut last_fault = None;
        for attempt in 1..=attempts {
            match self.bank.apply(desired, hw) {
                Ok(()) => {
                    sink.emit(&AppEvent::RelaysApplied(desired));
                    persist_changes(before, desired, force, store, now, sink);
                    return;
                }
                Err(Error::Hardware(fault)) => {
                    self.hardware_faults = self.hardware_faults.saturating_add(1);
                    warn!("Controller: {fault} (attempt {attempt}/{attempts})");
                    sink.emit(&AppEvent::HardwareFault { fault, attempt });
                    last_fault = Some(fault);
                }
                Err(e) => {
                    error!("Controller: {e}, keeping {:?}", before);
                    return;
                }
            }
        }

        if let Some(fault) = last_fault {
            self.degrade(fault, hw, store, now, sink);
        }
    }

    /// Retries exhausted: hand the boiler back to the programmer.  If even
    /// that write fails, the pending configuration is retried next cycle.
    fn degrade(
        &mut self,
        fault: HardwareFault,
        hw: &mut impl RelayPort,
        store: &mut impl PersistencePort,
        now: DateTime<Utc>,
        sink: &mut impl EventSink,
    ) {
        error!("Controller: {fault}, degrading to LegacyOverride");
        self.force_state(ControlState::LegacyOverride, sink);
        sink.emit(&AppEvent::Degraded(fault));

        let before = self.bank.read();
        let legacy = self.ctx.relays;
        match self.bank.apply(legacy, hw) {
            Ok(()) => {
                sink.emit(&AppEvent::RelaysApplied(legacy));
                persist_changes(before, legacy, false, store, now, sink);
            }
            Err(e) => error!("Controller: release to programmer failed: {e}"),
        }
    }
}

const fn channel_level(config: &RelayConfig, channel: Channel) -> bool {
    match channel {
        Channel::LegacyOverride => config.legacy_override_active,
        Channel::HotWater => config.hot_water_demand,
        Channel::CentralHeating => config.central_heating_demand,
    }
}

/// Write a status record for every channel whose relay changed.
fn persist_changes(
    before: RelayConfig,
    after: RelayConfig,
    all: bool,
    store: &mut impl PersistencePort,
    now: DateTime<Utc>,
    sink: &mut impl EventSink,
) {
    for channel in Channel::ALL {
        let on = channel_level(&after, channel);
        if !all && channel_level(&before, channel) == on {
            continue;
        }
        let rec = StatusRecord {
            channel,
            status: on.into(),
            timestamp: now,
        };
        if let Err(e) = store.record_status(&rec) {
            warn!("Controller: {} status not persisted: {e}", channel.mailbox());
            sink.emit(&AppEvent::PersistenceFailed(e));
        }
    }
}
