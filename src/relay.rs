//! Relay bank: the logical model of the four relay outputs.
//!
//! ```text
//!  ┌──────────┬─────────┬─────────┬─────────┬────────┐
//!  │ output   │ All off │ HW only │ CH only │ All on │
//!  ├──────────┼─────────┼─────────┼─────────┼────────┤
//!  │ dhw_off  │    0    │    0    │    1    │   0    │
//!  │ dhw_on   │    0    │    1    │    0    │   1    │
//!  │ ch_on    │    0    │    0    │    1    │   1    │
//!  └──────────┴─────────┴─────────┴─────────┴────────┘
//! ```
//!
//! `dhw_off` is the [`RelayOutput::DomesticHotWaterInhibit`] output and is
//! always derived, never commanded directly.  The bank holds levels in
//! logical polarity (`true` = active); electrical polarity is the hardware
//! adapter's concern.

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::RelayPort;
use crate::error::{HardwareFault, Result};
use crate::safety;

// ---------------------------------------------------------------------------
// Output identity
// ---------------------------------------------------------------------------

/// Stable logical names for the four relay outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayOutput {
    LegacyOverride,
    HotWaterOn,
    CentralHeatingOn,
    DomesticHotWaterInhibit,
}

impl RelayOutput {
    pub const ALL: [Self; 4] = [
        Self::LegacyOverride,
        Self::HotWaterOn,
        Self::CentralHeatingOn,
        Self::DomesticHotWaterInhibit,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::LegacyOverride => "legacyOverride",
            Self::HotWaterOn => "hotWaterOn",
            Self::CentralHeatingOn => "centralHeatingOn",
            Self::DomesticHotWaterInhibit => "domesticHotWaterInhibit",
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One complete set of logical relay levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    pub legacy_override_active: bool,
    pub hot_water_demand: bool,
    pub central_heating_demand: bool,
    pub domestic_hot_water_inhibit: bool,
}

impl RelayConfig {
    /// Legacy programmer powered, every automatic relay released.
    pub const fn legacy_override() -> Self {
        Self {
            legacy_override_active: true,
            hot_water_demand: false,
            central_heating_demand: false,
            domestic_hot_water_inhibit: false,
        }
    }

    /// Automatic control with nothing demanded.
    pub const fn all_off() -> Self {
        Self {
            legacy_override_active: false,
            hot_water_demand: false,
            central_heating_demand: false,
            domestic_hot_water_inhibit: false,
        }
    }

    /// Inhibit is needed whenever CH runs without HW.
    pub const fn derived_inhibit(central_heating: bool, hot_water: bool) -> bool {
        central_heating && !hot_water
    }

    /// Copy with a new hot water demand; inhibit re-derived afterwards.
    #[must_use]
    pub const fn with_hot_water(self, on: bool) -> Self {
        Self {
            hot_water_demand: on,
            ..self
        }
        .rederive()
    }

    /// Copy with a new central heating demand; inhibit re-derived afterwards.
    #[must_use]
    pub const fn with_central_heating(self, on: bool) -> Self {
        Self {
            central_heating_demand: on,
            ..self
        }
        .rederive()
    }

    #[must_use]
    const fn rederive(self) -> Self {
        Self {
            domestic_hot_water_inhibit: Self::derived_inhibit(
                self.central_heating_demand,
                self.hot_water_demand,
            ),
            ..self
        }
    }

    /// Logical level of a single output.
    pub const fn level(&self, output: RelayOutput) -> bool {
        match output {
            RelayOutput::LegacyOverride => self.legacy_override_active,
            RelayOutput::HotWaterOn => self.hot_water_demand,
            RelayOutput::CentralHeatingOn => self.central_heating_demand,
            RelayOutput::DomesticHotWaterInhibit => self.domestic_hot_water_inhibit,
        }
    }

    /// True when both wiring interlocks hold.
    pub fn is_consistent(&self) -> bool {
        safety::violations(self) == 0
    }
}

/// Order in which `target` is written: releases first, then energisations.
/// Releases go inhibit → HW → CH → legacy; energisations the reverse.
/// No prefix of the sequence energises a pair that either end keeps apart.
pub fn write_order(target: &RelayConfig) -> [RelayOutput; 4] {
    const RELEASE: [RelayOutput; 4] = [
        RelayOutput::DomesticHotWaterInhibit,
        RelayOutput::HotWaterOn,
        RelayOutput::CentralHeatingOn,
        RelayOutput::LegacyOverride,
    ];
    let mut order = RELEASE;
    let mut n = 0;
    for output in RELEASE {
        if !target.level(output) {
            order[n] = output;
            n += 1;
        }
    }
    for output in RELEASE.iter().rev() {
        if target.level(*output) {
            order[n] = *output;
            n += 1;
        }
    }
    order
}

// ---------------------------------------------------------------------------
// Bank
// ---------------------------------------------------------------------------

/// The authority on what the hardware is doing.  Mutated only through
/// [`RelayBank::apply`].
#[derive(Debug)]
pub struct RelayBank {
    applied: RelayConfig,
    writes: u64,
}

impl RelayBank {
    /// Construct with the configuration the outputs are assumed to be in.
    /// Call [`apply`](Self::apply) with the same value at startup to drive
    /// the hardware there.
    pub fn new(initial: RelayConfig) -> Self {
        Self {
            applied: initial,
            writes: 0,
        }
    }

    /// Last successfully applied configuration.  No hardware read-back.
    pub fn read(&self) -> RelayConfig {
        self.applied
    }

    /// Number of successful `apply` calls.
    pub fn apply_count(&self) -> u64 {
        self.writes
    }

    /// Write all four outputs.
    ///
    /// Rejects configurations that break the interlocks before touching
    /// hardware.  On a failed write the previous configuration is written
    /// back (best effort) and the fault is returned; `read()` keeps
    /// reporting the previous configuration.
    pub fn apply(&mut self, config: RelayConfig, hw: &mut impl RelayPort) -> Result<()> {
        safety::check(&config)?;

        if let Err(fault) = write_all(&config, hw) {
            error!("RelayBank: {fault}, rolling back to {:?}", self.applied);
            if let Err(rollback) = write_all(&self.applied, hw) {
                warn!("RelayBank: rollback also failed: {rollback}");
            }
            return Err(fault.into());
        }

        debug!("RelayBank: applied {:?}", config);
        self.applied = config;
        self.writes += 1;
        Ok(())
    }
}

fn write_all(config: &RelayConfig, hw: &mut impl RelayPort) -> core::result::Result<(), HardwareFault> {
    for output in write_order(config) {
        hw.write(output, config.level(output))?;
    }
    Ok(())
}
