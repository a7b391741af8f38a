//! Linux sysfs GPIO output.
//!
//! `open` exports the line if needed and sets it to output; each level
//! change is one write to `gpioN/value`.  The sysfs root is a parameter so
//! tests can point it at a temporary directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};
use log::{debug, info};

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// I/O failure on a value file.
#[derive(Debug)]
pub struct SysfsPinError {
    pub gpio: u32,
    pub kind: io::ErrorKind,
}

impl core::fmt::Display for SysfsPinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "gpio{}: {}", self.gpio, self.kind)
    }
}

impl digital::Error for SysfsPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct SysfsPin {
    gpio: u32,
    value: PathBuf,
}

impl SysfsPin {
    pub fn open(root: &Path, gpio: u32) -> io::Result<Self> {
        let line = root.join(format!("gpio{gpio}"));
        if !line.exists() {
            info!("sysfs: exporting gpio{gpio}");
            fs::write(root.join("export"), gpio.to_string())?;
        }
        fs::write(line.join("direction"), "out")?;
        Ok(Self {
            gpio,
            value: line.join("value"),
        })
    }

    pub fn gpio(&self) -> u32 {
        self.gpio
    }

    fn write_level(&mut self, high: bool) -> Result<(), SysfsPinError> {
        debug!("sysfs: gpio{} <- {}", self.gpio, u8::from(high));
        fs::write(&self.value, if high { "1" } else { "0" }).map_err(|e| SysfsPinError {
            gpio: self.gpio,
            kind: e.kind(),
        })
    }
}

impl ErrorType for SysfsPin {
    type Error = SysfsPinError;
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_level(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_level(true)
    }
}
