//! Wiring interlocks.
//!
//! Runs before every [`RelayBank::apply`](crate::relay::RelayBank::apply).
//! Two rules come from the wiring of the boiler:
//!
//! 1. While the legacy programmer is powered, no automatic relay may be
//!    energised.
//! 2. `dhw_inhibit == ch_on && !dhw_on`.  Energising the inhibit relay
//!    together with `dhw_on` commands two mutually exclusive valve paths.
//!
//! Violations are accumulated in a bitmask (see
//! [`InterlockViolation::mask`]) so a single check reports all of them.

use log::error;

use crate::error::InterlockViolation;
use crate::relay::RelayConfig;

/// Bitmask of every interlock `config` violates (0 = safe).
pub fn violations(config: &RelayConfig) -> u8 {
    let mut flags = 0;

    if config.legacy_override_active
        && (config.hot_water_demand
            || config.central_heating_demand
            || config.domestic_hot_water_inhibit)
    {
        flags |= InterlockViolation::AutomaticUnderOverride.mask();
    }

    let expected =
        RelayConfig::derived_inhibit(config.central_heating_demand, config.hot_water_demand);
    if config.domestic_hot_water_inhibit != expected {
        flags |= InterlockViolation::InhibitMismatch.mask();
    }

    flags
}

/// Reject `config` with the first violated interlock.
pub fn check(config: &RelayConfig) -> Result<(), InterlockViolation> {
    let flags = violations(config);
    if flags == 0 {
        return Ok(());
    }
    error!("INTERLOCK: rejected {:?} flags=0b{:08b}", config, flags);
    if flags & InterlockViolation::AutomaticUnderOverride.mask() != 0 {
        Err(InterlockViolation::AutomaticUnderOverride)
    } else {
        Err(InterlockViolation::InhibitMismatch)
    }
}
