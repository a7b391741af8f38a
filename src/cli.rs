//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Raspberry Pi heating and hot water relay controller.
#[derive(Parser, Debug, Clone)]
#[command(name = "piheat")]
#[command(about = "Drives boiler relays from mailbox commands and a room thermometer")]
#[command(version)]
pub struct Cli {
    /// JSON config file.  Missing file means defaults.
    #[arg(long, default_value = "/etc/piheat/piheat.json")]
    pub config: PathBuf,

    /// Root of the per-channel mailbox directories (st699, HW, CH).
    #[arg(long, default_value = "/var/spool/piheat")]
    pub spool_dir: PathBuf,

    /// Persisted status and setpoint.
    #[arg(long, default_value = "/var/lib/piheat/state.json")]
    pub state_file: PathBuf,

    /// DS18B20 `w1_slave` file.  Discovered on the 1-Wire bus if omitted.
    #[arg(long)]
    pub sensor_path: Option<PathBuf>,

    /// Drive simulated pins and a fixed-temperature thermometer.
    #[arg(long)]
    pub simulate: bool,

    /// Room temperature reported in simulation (°C).
    #[arg(long, default_value_t = 19.0)]
    pub sim_temp: f64,

    /// Run a single cycle and exit, leaving the relays as set.
    #[arg(long)]
    pub once: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
