//! Integration tests for the mailbox → Controller → RelayBank pipeline.

use crate::mock_hw::{MockHardware, MockMailbox, RecordingSink, at};

use piheat::adapters::state_store::MemoryStore;
use piheat::app::events::AppEvent;
use piheat::app::ports::ChannelStatus;
use piheat::app::service::Controller;
use piheat::command::Channel;
use piheat::config::ControllerConfig;
use piheat::fsm::ControlState;
use piheat::relay::RelayConfig;
use piheat::thermostat::SetpointComparison;

struct Rig {
    ctl: Controller,
    hw: MockHardware,
    mail: MockMailbox,
    store: MemoryStore,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: ControllerConfig) -> Self {
        let mut rig = Self {
            ctl: Controller::new(config),
            hw: MockHardware::new(),
            mail: MockMailbox::new(),
            store: MemoryStore::default(),
            sink: RecordingSink::new(),
        };
        rig.ctl.start(&mut rig.hw, &mut rig.store, at(0), &mut rig.sink);
        rig
    }

    fn automatic() -> Self {
        Self::new(ControllerConfig {
            boot_state: ControlState::AutomaticControl,
            ..ControllerConfig::default()
        })
    }

    fn cycle(&mut self, secs: i64) {
        self.ctl.run_cycle(
            &mut self.mail,
            &mut self.hw,
            &mut self.store,
            at(secs),
            &mut self.sink,
        );
    }

    fn command(&mut self, channel: Channel, text: &str, secs: i64) {
        self.ctl.handle_command(
            channel,
            text,
            &mut self.hw,
            &mut self.store,
            at(secs),
            &mut self.sink,
        );
    }
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boots_into_legacy_override_by_default() {
    let rig = Rig::new(ControllerConfig::default());
    assert_eq!(rig.ctl.state(), ControlState::LegacyOverride);
    assert_eq!(rig.hw.observed(), RelayConfig::legacy_override());
}

#[test]
fn boot_state_is_configurable() {
    let rig = Rig::automatic();
    assert_eq!(rig.ctl.state(), ControlState::AutomaticControl);
    assert_eq!(rig.hw.observed(), RelayConfig::all_off());
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn hot_water_then_central_heating() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(18.0);
    rig.cycle(0);

    rig.command(Channel::HotWater, "HWon", 1);
    let r = rig.ctl.relays();
    assert!(r.hot_water_demand);
    assert!(!r.domestic_hot_water_inhibit);

    rig.command(Channel::CentralHeating, "CH=25", 2);
    let r = rig.ctl.relays();
    assert!(r.central_heating_demand);
    assert!(r.hot_water_demand);
    assert!(!r.domestic_hot_water_inhibit);
    assert_eq!(rig.hw.observed(), r);
}

#[test]
fn central_heating_alone_in_warm_room() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(20.0);
    rig.cycle(0);

    rig.command(Channel::CentralHeating, "CH=18", 1);
    let r = rig.ctl.relays();
    assert!(!r.central_heating_demand);
    assert!(!r.domestic_hot_water_inhibit);
    assert!((rig.ctl.target_c() - 18.0).abs() < f64::EPSILON);
}

#[test]
fn override_releases_automatic_relays() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(15.0);
    rig.cycle(0);
    rig.command(Channel::CentralHeating, "CH=21", 1);
    assert!(rig.ctl.relays().central_heating_demand);

    rig.command(Channel::LegacyOverride, "st699on", 2);
    assert_eq!(rig.ctl.state(), ControlState::LegacyOverride);
    assert_eq!(rig.ctl.relays(), RelayConfig::legacy_override());
    assert_eq!(rig.hw.observed(), RelayConfig::legacy_override());
}

// ── Mailbox cycle ─────────────────────────────────────────────

#[test]
fn override_off_and_hot_water_in_one_cycle() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.mail.send(Channel::HotWater, "HWon");
    rig.mail.send(Channel::LegacyOverride, "st699off");
    rig.cycle(5);

    assert_eq!(rig.ctl.state(), ControlState::AutomaticControl);
    assert!(rig.ctl.relays().hot_water_demand);
}

#[test]
fn only_newest_message_per_channel_counts() {
    let mut rig = Rig::automatic();
    rig.mail.send(Channel::HotWater, "HWon");
    rig.mail.send(Channel::HotWater, "HWoff");
    rig.cycle(5);
    assert!(!rig.ctl.relays().hot_water_demand);
}

#[test]
fn hot_water_ignored_under_override() {
    let mut rig = Rig::new(ControllerConfig::default());
    let writes = rig.hw.writes.len();
    rig.mail.send(Channel::HotWater, "HWon");
    rig.cycle(5);
    assert_eq!(rig.ctl.relays(), RelayConfig::legacy_override());
    assert_eq!(rig.hw.writes.len(), writes);
}

#[test]
fn setpoint_under_override_takes_effect_later() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.hw.temperature = Ok(17.0);
    rig.mail.send(Channel::CentralHeating, "CH=22");
    rig.cycle(5);
    assert!((rig.ctl.target_c() - 22.0).abs() < f64::EPSILON);
    assert_eq!(rig.ctl.relays(), RelayConfig::legacy_override());

    // The override release writes all automatic relays off first; the
    // stored request then drives CH within the same cycle.
    rig.mail.send(Channel::LegacyOverride, "st699off");
    rig.cycle(10);
    assert_eq!(rig.ctl.state(), ControlState::AutomaticControl);
    assert!(rig.ctl.relays().central_heating_demand);
    assert!(rig.ctl.relays().domestic_hot_water_inhibit);
    assert!(rig.hw.writes.contains(&(piheat::relay::RelayOutput::LegacyOverride, false)));
}

#[test]
fn ch_off_under_override_cancels_stored_request() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.hw.temperature = Ok(17.0);
    rig.mail.send(Channel::CentralHeating, "CH=22");
    rig.cycle(5);
    rig.mail.send(Channel::CentralHeating, "CHoff");
    rig.cycle(10);

    rig.mail.send(Channel::LegacyOverride, "st699off");
    rig.cycle(15);
    assert_eq!(rig.ctl.relays(), RelayConfig::all_off());
}

#[test]
fn heating_resumes_after_override_round_trip() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(16.0);
    rig.mail.send(Channel::CentralHeating, "CH=21");
    rig.cycle(5);
    rig.mail.send(Channel::LegacyOverride, "st699on");
    rig.cycle(10);
    assert_eq!(rig.ctl.relays(), RelayConfig::legacy_override());

    rig.mail.send(Channel::LegacyOverride, "st699off");
    rig.cycle(15);
    assert!(rig.ctl.relays().central_heating_demand);
    assert_eq!(rig.hw.observed(), rig.ctl.relays());
}

#[test]
fn unrecognized_text_is_reported_not_applied() {
    let mut rig = Rig::automatic();
    let before = rig.ctl.relays();
    rig.mail.send(Channel::CentralHeating, "CH=");
    rig.mail.send(Channel::HotWater, "random text");
    rig.cycle(5);
    assert_eq!(rig.ctl.relays(), before);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::CommandUnrecognized { .. })),
        2
    );
}

#[test]
fn unavailable_mailbox_does_not_stop_cycle() {
    let mut rig = Rig::automatic();
    rig.mail.unavailable = true;
    rig.cycle(5);
    rig.cycle(10);
    assert_eq!(rig.ctl.cycle_count(), 2);
    assert_eq!(rig.ctl.state(), ControlState::AutomaticControl);
}

// ── Thermostat follow-up ──────────────────────────────────────

#[test]
fn heating_follows_room_temperature_each_cycle() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(18.0);
    rig.mail.send(Channel::CentralHeating, "CH=20");
    rig.cycle(5);
    assert!(rig.ctl.relays().central_heating_demand);
    assert!(rig.ctl.relays().domestic_hot_water_inhibit);

    rig.hw.temperature = Ok(20.0);
    rig.cycle(10);
    assert!(!rig.ctl.relays().central_heating_demand);
    assert!(!rig.ctl.relays().domestic_hot_water_inhibit);

    rig.hw.temperature = Ok(19.5);
    rig.cycle(15);
    assert!(rig.ctl.relays().central_heating_demand);
}

#[test]
fn ch_off_stops_following() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(18.0);
    rig.mail.send(Channel::CentralHeating, "CH=20");
    rig.cycle(5);
    rig.mail.send(Channel::CentralHeating, "CHoff");
    rig.cycle(10);
    rig.cycle(15);
    assert!(!rig.ctl.relays().central_heating_demand);
}

#[test]
fn reevaluation_can_be_disabled() {
    let mut rig = Rig::new(ControllerConfig {
        boot_state: ControlState::AutomaticControl,
        reevaluate_each_cycle: false,
        ..ControllerConfig::default()
    });
    rig.hw.temperature = Ok(18.0);
    rig.mail.send(Channel::CentralHeating, "CH=20");
    rig.cycle(5);
    rig.hw.temperature = Ok(25.0);
    rig.cycle(10);
    assert!(rig.ctl.relays().central_heating_demand);
}

#[test]
fn inclusive_comparison_heats_at_setpoint() {
    let mut rig = Rig::new(ControllerConfig {
        boot_state: ControlState::AutomaticControl,
        setpoint_comparison: SetpointComparison::Inclusive,
        ..ControllerConfig::default()
    });
    rig.hw.temperature = Ok(20.0);
    rig.mail.send(Channel::CentralHeating, "CH=20");
    rig.cycle(5);
    assert!(rig.ctl.relays().central_heating_demand);
}

#[test]
fn failed_sensor_holds_heating_state() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(18.0);
    rig.mail.send(Channel::CentralHeating, "CH=20");
    rig.cycle(5);
    assert!(rig.ctl.relays().central_heating_demand);

    rig.hw.temperature = Err(piheat::error::InvalidReading::SensorFailed);
    // Last good reading is 300 s old at most: still used.
    rig.cycle(300);
    assert!(rig.ctl.relays().central_heating_demand);
    // Now stale: CH held, not switched off, and the reason is reported.
    rig.cycle(400);
    assert!(rig.ctl.relays().central_heating_demand);
    assert!(rig.sink.count(|e| matches!(e, AppEvent::ReadingInvalid(_))) > 0);
}

#[test]
fn stale_reading_never_newly_energises() {
    let mut rig = Rig::automatic();
    rig.hw.temperature = Ok(22.0);
    rig.cycle(0);
    rig.hw.temperature = Err(piheat::error::InvalidReading::SensorFailed);
    rig.mail.send(Channel::CentralHeating, "CH=25");
    rig.cycle(1000);
    assert!(!rig.ctl.relays().central_heating_demand);
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn status_records_follow_relay_changes() {
    let mut rig = Rig::automatic();
    let boot = rig.store.statuses().len();
    assert_eq!(boot, 3);

    rig.command(Channel::HotWater, "HWon", 7);
    let new = &rig.store.statuses()[boot..];
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].channel, Channel::HotWater);
    assert_eq!(new[0].status, ChannelStatus::On);
    assert_eq!(new[0].timestamp, at(7));

    rig.command(Channel::LegacyOverride, "st699on", 8);
    let new = &rig.store.statuses()[boot + 1..];
    let channels: Vec<_> = new.iter().map(|r| r.channel).collect();
    assert!(channels.contains(&Channel::LegacyOverride));
    assert!(channels.contains(&Channel::HotWater));
}

#[test]
fn setpoints_are_recorded_even_without_relay_change() {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.command(Channel::CentralHeating, "CH=19.5", 3);
    assert_eq!(rig.store.targets().len(), 1);
    assert!((rig.store.targets()[0].target_c - 19.5).abs() < f64::EPSILON);
}

#[test]
fn restored_setpoint_is_used() {
    use piheat::app::ports::{PersistencePort, TargetRecord};
    let mut store = MemoryStore::default();
    store
        .record_target(&TargetRecord {
            target_c: 23.0,
            heating_requested: true,
            timestamp: at(0),
        })
        .unwrap();
    let mut ctl = Controller::new(ControllerConfig::default());
    ctl.restore_target(&store);
    assert!((ctl.target_c() - 23.0).abs() < f64::EPSILON);

    let mut hw = MockHardware::new();
    hw.temperature = Ok(18.0);
    let mut mail = MockMailbox::new();
    let mut sink = RecordingSink::new();
    ctl.start(&mut hw, &mut store, at(0), &mut sink);
    mail.send(Channel::LegacyOverride, "st699off");
    ctl.run_cycle(&mut mail, &mut hw, &mut store, at(5), &mut sink);
    assert!(ctl.relays().central_heating_demand, "18 °C is below the restored 23 °C");
}

#[test]
fn restored_ch_off_stays_off() {
    use piheat::app::ports::{PersistencePort, TargetRecord};
    let mut store = MemoryStore::default();
    store
        .record_target(&TargetRecord {
            target_c: 23.0,
            heating_requested: false,
            timestamp: at(0),
        })
        .unwrap();
    let mut ctl = Controller::new(ControllerConfig {
        boot_state: ControlState::AutomaticControl,
        ..ControllerConfig::default()
    });
    ctl.restore_target(&store);
    let mut hw = MockHardware::new();
    hw.temperature = Ok(18.0);
    let mut sink = RecordingSink::new();
    ctl.start(&mut hw, &mut store, at(0), &mut sink);
    ctl.run_cycle(&mut MockMailbox::new(), &mut hw, &mut store, at(5), &mut sink);
    assert!(!ctl.relays().central_heating_demand);
}

// ── Status / shutdown ─────────────────────────────────────────

#[test]
fn status_is_emitted_on_interval() {
    let mut rig = Rig::new(ControllerConfig {
        status_interval_cycles: 2,
        ..ControllerConfig::default()
    });
    for i in 0..4 {
        rig.cycle(i * 5);
    }
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Status(_))), 2);
    let status = rig.ctl.status(at(20));
    assert_eq!(status.cycles, 4);
    assert_eq!(status.state, ControlState::LegacyOverride);
    assert_eq!(status.temperature_c, Some(20.0));
}

#[test]
fn shutdown_can_leave_relays() {
    let mut rig = Rig::new(ControllerConfig {
        boot_state: ControlState::AutomaticControl,
        release_to_legacy_on_exit: false,
        ..ControllerConfig::default()
    });
    rig.command(Channel::HotWater, "HWon", 1);
    rig.ctl
        .shutdown(&mut rig.hw, &mut rig.store, at(2), &mut rig.sink);
    assert_eq!(rig.ctl.state(), ControlState::AutomaticControl);
    assert!(rig.hw.observed().hot_water_demand);
}
