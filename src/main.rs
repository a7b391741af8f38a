//! PiHeat controller binary.
//!
//! Wires the controller to real or simulated adapters and runs the poll
//! loop until SIGINT/SIGTERM, then hands the boiler back to the
//! programmer.
//!
//! ```text
//!  ┌──────────────┐  poll   ┌────────────┐  apply  ┌────────────────┐
//!  │ SpoolDirSource├────────▶│ Controller ├────────▶│ GpioRelayDriver│
//!  └──────────────┘         └─────┬──────┘         └────────────────┘
//!  ┌──────────────┐  sample       │ record
//!  │ W1Thermometer├──────────────▶│───────▶ JsonStateStore
//!  └──────────────┘               │ emit
//!                                 └───────▶ LogEventSink
//! ```

mod cli;
mod shutdown;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::Utc;
use log::{info, warn};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use piheat::adapters::config_file::JsonConfigFile;
use piheat::adapters::hardware::{Board, GpioRelayDriver, SimThermometer};
use piheat::adapters::log_sink::LogEventSink;
use piheat::adapters::spool_source::SpoolDirSource;
use piheat::adapters::state_store::JsonStateStore;
use piheat::adapters::w1_thermometer::W1Thermometer;
use piheat::app::ports::{
    CommandSource, ConfigPort, PersistencePort, RelayPort, TemperaturePort,
};
use piheat::app::service::Controller;
use piheat::config::ControllerConfig;
use piheat::drivers::sim_pin::SimPin;
use piheat::drivers::sysfs_pin::{SYSFS_GPIO_ROOT, SysfsPin};
use piheat::pins;
use piheat::relay::RelayConfig;

use crate::cli::Cli;
use crate::shutdown::ShutdownSignals;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    info!("PiHeat v{}", env!("CARGO_PKG_VERSION"));

    let config = JsonConfigFile::new(&cli.config)
        .load()
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let store = JsonStateStore::open(&cli.state_file)
        .map_err(|e| anyhow!("opening {}: {e}", cli.state_file.display()))?;
    let source = SpoolDirSource::open(&cli.spool_dir)
        .with_context(|| format!("opening spool {}", cli.spool_dir.display()))?;

    if cli.simulate {
        info!("Simulation mode, room at {:.1}°C", cli.sim_temp);
        let relays = GpioRelayDriver::new(
            SimPin::new("st699"),
            SimPin::new("dhw_on"),
            SimPin::new("ch_on"),
            SimPin::new("dhw_off"),
        );
        let board = Board {
            relays,
            thermometer: SimThermometer::new(cli.sim_temp),
        };
        run(config, board, source, store, cli.once).await
    } else {
        let root = Path::new(SYSFS_GPIO_ROOT);
        let p = config.pins;
        let relays = GpioRelayDriver::new(
            SysfsPin::open(root, p.legacy_override).context("legacy override pin")?,
            SysfsPin::open(root, p.hot_water).context("hot water pin")?,
            SysfsPin::open(root, p.central_heating).context("central heating pin")?,
            SysfsPin::open(root, p.dhw_inhibit).context("dhw inhibit pin")?,
        );
        let sensor_path = cli
            .sensor_path
            .clone()
            .or_else(|| W1Thermometer::discover(Path::new(pins::W1_DEVICES_ROOT)))
            .context("no DS18B20 found; pass --sensor-path")?;
        let thermometer = W1Thermometer::new(
            sensor_path,
            config.sensor_attempts,
            Duration::from_millis(config.sensor_retry_delay_ms),
        );
        run(config, Board { relays, thermometer }, source, store, cli.once).await
    }
}

async fn run(
    config: ControllerConfig,
    mut board: impl TemperaturePort + RelayPort,
    mut source: impl CommandSource,
    mut store: impl PersistencePort,
    once: bool,
) -> anyhow::Result<()> {
    let mut signals = ShutdownSignals::install().context("installing signal handlers")?;
    let mut sink = LogEventSink::new();

    let mut controller = Controller::new(config);
    controller.restore_target(&store);
    controller.start(&mut board, &mut store, Utc::now(), &mut sink);

    let mut ticker = tokio::time::interval(controller.config().poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = signals.recv() => break,
            _ = ticker.tick() => {
                controller.run_cycle(&mut source, &mut board, &mut store, Utc::now(), &mut sink);
                if once {
                    break;
                }
            }
        }
    }

    // A single-cycle run leaves the relays where the cycle put them.
    if !once {
        controller.shutdown(&mut board, &mut store, Utc::now(), &mut sink);
        if controller.config().release_to_legacy_on_exit
            && controller.relays() != RelayConfig::legacy_override()
        {
            warn!("Exiting with relays {:?}", controller.relays());
        }
    }
    info!("PiHeat stopped after {} cycles", controller.cycle_count());
    Ok(())
}
