//! Output pin drivers behind `embedded_hal::digital::OutputPin`.
//!
//! | Driver      | Backing                        |
//! |-------------|--------------------------------|
//! | `sysfs_pin` | `/sys/class/gpio` value files  |
//! | `sim_pin`   | in-memory level, logged        |

pub mod sim_pin;
pub mod sysfs_pin;
