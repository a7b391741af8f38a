//! GPIO pin assignments for the relay board on the Raspberry Pi header.
//!
//! Single source of truth for the defaults in
//! [`RelayPins`](crate::config::RelayPins).  Numbers are BCM line offsets;
//! the physical header pin is noted alongside.

// ---------------------------------------------------------------------------
// Legacy programmer (ST699)
// ---------------------------------------------------------------------------

/// Powers the mechanical programmer.  Wired through a normally-closed
/// contact: LOW = programmer in charge.  Header pin 11.
pub const LEGACY_OVERRIDE_GPIO: u32 = 17;

// ---------------------------------------------------------------------------
// Boiler demand relays
// ---------------------------------------------------------------------------

/// Hot water demand (`dhw_on`).  Header pin 15.
pub const HOT_WATER_GPIO: u32 = 22;

/// Central heating demand (`ch_on`).  Header pin 16.
pub const CENTRAL_HEATING_GPIO: u32 = 23;

/// Hot water valve inhibit (`dhw_off`).  Derived, never commanded.
/// Header pin 13.
pub const DHW_INHIBIT_GPIO: u32 = 27;

// ---------------------------------------------------------------------------
// 1-Wire thermometer
// ---------------------------------------------------------------------------

/// Where the kernel lists 1-Wire devices.  The bus master is the
/// `w1-gpio` overlay on BCM 4.
pub const W1_DEVICES_ROOT: &str = "/sys/bus/w1/devices";
