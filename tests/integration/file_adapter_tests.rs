//! The controller wired to the real file adapters in a temp directory:
//! spool mailboxes in, GPIO pins out, JSON state on disk.

use std::fs;
use std::path::Path;

use crate::mock_hw::{RecordingSink, at};

use piheat::adapters::config_file::JsonConfigFile;
use piheat::adapters::hardware::{Board, GpioRelayDriver, SimThermometer};
use piheat::adapters::spool_source::SpoolDirSource;
use piheat::adapters::state_store::JsonStateStore;
use piheat::app::ports::{ChannelStatus, ConfigPort};
use piheat::app::service::Controller;
use piheat::command::Channel;
use piheat::config::ControllerConfig;
use piheat::drivers::sim_pin::SimPin;
use piheat::fsm::ControlState;

struct Pins {
    legacy: SimPin,
    hot_water: SimPin,
    central_heating: SimPin,
    inhibit: SimPin,
}

fn board(celsius: f64) -> (Board<GpioRelayDriver<SimPin>, SimThermometer>, Pins) {
    let pins = Pins {
        legacy: SimPin::new("st699"),
        hot_water: SimPin::new("HW"),
        central_heating: SimPin::new("CH"),
        inhibit: SimPin::new("DHW"),
    };
    let relays = GpioRelayDriver::new(
        pins.legacy.clone(),
        pins.hot_water.clone(),
        pins.central_heating.clone(),
        pins.inhibit.clone(),
    );
    let board = Board {
        relays,
        thermometer: SimThermometer::new(celsius),
    };
    (board, pins)
}

fn drop_message(source: &SpoolDirSource, channel: Channel, name: &str, text: &str) {
    fs::write(source.mailbox_dir(channel).join(name), text).unwrap();
}

fn mailbox_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn spool_commands_drive_pins_and_persist_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = SpoolDirSource::open(dir.path().join("spool")).unwrap();
    let mut store = JsonStateStore::open(dir.path().join("state.json")).unwrap();
    let (mut hw, pins) = board(17.0);
    let mut sink = RecordingSink::new();
    let mut ctl = Controller::new(ControllerConfig::default());

    ctl.start(&mut hw, &mut store, at(0), &mut sink);
    // Legacy override is active LOW on the board.
    assert!(!pins.legacy.is_high());
    assert!(!pins.hot_water.is_high());

    drop_message(&source, Channel::LegacyOverride, "0001.msg", "st699off");
    drop_message(&source, Channel::CentralHeating, "0002.msg", "CH=21.5");
    ctl.run_cycle(&mut source, &mut hw, &mut store, at(5), &mut sink);

    assert_eq!(ctl.state(), ControlState::AutomaticControl);
    assert!(pins.legacy.is_high(), "programmer released");
    assert!(pins.central_heating.is_high());
    assert!(pins.inhibit.is_high());
    assert!(!pins.hot_water.is_high());
    for channel in Channel::ALL {
        assert!(mailbox_is_empty(&source.mailbox_dir(channel)));
    }

    let text = fs::read_to_string(dir.path().join("state.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["status"]["CH"]["status"], "on");
    assert_eq!(doc["status"]["st699"]["status"], "off");
    assert_eq!(doc["target"]["target_c"], 21.5);
}

#[test]
fn reopened_store_restores_setpoint() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    {
        let mut source = SpoolDirSource::open(dir.path().join("spool")).unwrap();
        let mut store = JsonStateStore::open(&state_path).unwrap();
        let (mut hw, _pins) = board(22.0);
        let mut sink = RecordingSink::new();
        let mut ctl = Controller::new(ControllerConfig {
            boot_state: ControlState::AutomaticControl,
            ..ControllerConfig::default()
        });
        ctl.start(&mut hw, &mut store, at(0), &mut sink);
        drop_message(&source, Channel::CentralHeating, "a.msg", "CH=18");
        ctl.run_cycle(&mut source, &mut hw, &mut store, at(5), &mut sink);
        assert_eq!(ctl.target_c(), 18.0);
    }

    let store = JsonStateStore::open(&state_path).unwrap();
    let mut ctl = Controller::new(ControllerConfig::default());
    ctl.restore_target(&store);
    assert_eq!(ctl.target_c(), 18.0);
    let ch = store.state().status[&Channel::CentralHeating];
    // 22 °C is above the 18 °C target, so the burner stays off.
    assert_eq!(ch.status, ChannelStatus::Off);
}

#[test]
fn newest_spool_file_wins_and_all_are_consumed() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = SpoolDirSource::open(dir.path()).unwrap();
    let mut store = JsonStateStore::open(dir.path().join("state.json")).unwrap();
    let (mut hw, pins) = board(20.0);
    let mut sink = RecordingSink::new();
    let mut ctl = Controller::new(ControllerConfig {
        boot_state: ControlState::AutomaticControl,
        ..ControllerConfig::default()
    });
    ctl.start(&mut hw, &mut store, at(0), &mut sink);

    let hw_dir = source.mailbox_dir(Channel::HotWater);
    let base = std::time::SystemTime::now();
    for (i, text) in ["HWoff", "HWon"].iter().enumerate() {
        let path = hw_dir.join(format!("{i}.msg"));
        fs::write(&path, text).unwrap();
        let f = fs::File::options().write(true).open(&path).unwrap();
        f.set_modified(base + std::time::Duration::from_secs(i as u64)).unwrap();
    }

    ctl.run_cycle(&mut source, &mut hw, &mut store, at(5), &mut sink);
    assert!(pins.hot_water.is_high());
    assert!(mailbox_is_empty(&hw_dir));
}

#[test]
fn config_file_round_trips_through_controller() {
    let dir = tempfile::tempdir().unwrap();
    let file = JsonConfigFile::new(dir.path().join("piheat.json"));
    fs::write(
        file.path(),
        r#"{ "boot_state": "AutomaticControl", "default_target_c": 19.5 }"#,
    )
    .unwrap();

    let config = file.load().unwrap();
    assert_eq!(config.poll_interval_secs, ControllerConfig::default().poll_interval_secs);

    let ctl = Controller::new(config);
    assert_eq!(ctl.target_c(), 19.5);
    assert_eq!(ctl.config().boot_state, ControlState::AutomaticControl);
}
