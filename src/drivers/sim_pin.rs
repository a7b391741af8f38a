//! Simulated output pin for `--simulate` runs and tests.
//!
//! Tracks the level in memory and logs every change.  Cloned handles share
//! the same level so a test can observe what the driver wrote.

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::info;

#[derive(Clone)]
pub struct SimPin {
    label: &'static str,
    level: Rc<Cell<bool>>,
}

impl SimPin {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            level: Rc::new(Cell::new(false)),
        }
    }

    /// Electrical level last written (`true` = high).
    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    fn set(&mut self, high: bool) {
        if self.level.replace(high) != high {
            info!("SIM | {} -> {}", self.label, if high { "HIGH" } else { "LOW" });
        }
    }
}

impl ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}
