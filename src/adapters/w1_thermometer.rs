//! DS18B20 thermometer on the Linux 1-Wire bus.
//!
//! The kernel exposes each probe as `<root>/28-xxxxxxxxxxxx/w1_slave`:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! The first line must end in `YES` (CRC ok); the second carries the
//! temperature in millidegrees.  A bad CRC is retried after a short delay.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::TemperaturePort;
use crate::error::InvalidReading;

/// DS18B20 family code.
const FAMILY_PREFIX: &str = "28-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum W1Error {
    /// CRC line did not end in `YES`; worth retrying.
    NotReady,
    /// File content did not match the expected layout.
    Malformed,
}

pub struct W1Thermometer {
    path: PathBuf,
    attempts: u8,
    retry_delay: Duration,
}

impl W1Thermometer {
    pub fn new(path: impl Into<PathBuf>, attempts: u8, retry_delay: Duration) -> Self {
        Self {
            path: path.into(),
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    /// First DS18B20 under `root` (normally `/sys/bus/w1/devices`).
    pub fn discover(root: &Path) -> Option<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(root)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(FAMILY_PREFIX))
            .map(|entry| entry.path().join("w1_slave"))
            .collect();
        found.sort();
        let first = found.into_iter().next()?;
        info!("W1: using probe {}", first.display());
        Some(first)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemperaturePort for W1Thermometer {
    /// Blocks the caller for up to `(attempts - 1) * retry_delay` while the
    /// CRC settles; `ControllerConfig::validate` caps that at
    /// [`MAX_SENSOR_BLOCK_MS`](crate::config::MAX_SENSOR_BLOCK_MS).
    fn read_celsius(&mut self) -> Result<f64, InvalidReading> {
        for attempt in 1..=self.attempts {
            match fs::read_to_string(&self.path) {
                Ok(text) => match parse_w1_slave(&text) {
                    Ok(celsius) => return Ok(celsius),
                    Err(W1Error::NotReady) => {
                        debug!("W1: CRC not ready (attempt {attempt}/{})", self.attempts);
                    }
                    Err(W1Error::Malformed) => {
                        warn!("W1: unexpected content in {}", self.path.display());
                        return Err(InvalidReading::SensorFailed);
                    }
                },
                Err(e) => {
                    warn!("W1: {}: {e}", self.path.display());
                    return Err(InvalidReading::SensorFailed);
                }
            }
            if attempt < self.attempts {
                thread::sleep(self.retry_delay);
            }
        }
        Err(InvalidReading::SensorFailed)
    }
}

fn parse_w1_slave(text: &str) -> Result<f64, W1Error> {
    let mut lines = text.lines();
    let crc = lines.next().ok_or(W1Error::Malformed)?;
    if !crc.trim_end().ends_with("YES") {
        return Err(W1Error::NotReady);
    }
    let data = lines.next().ok_or(W1Error::Malformed)?;
    let (_, raw) = data.split_once("t=").ok_or(W1Error::Malformed)?;
    let milli: i32 = raw.trim().parse().map_err(|_| W1Error::Malformed)?;
    Ok(f64::from(milli) / 1000.0)
}
