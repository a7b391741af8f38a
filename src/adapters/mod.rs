//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements        | Connects to                    |
//! |------------------|-------------------|--------------------------------|
//! | `hardware`       | RelayPort         | `OutputPin`s (sysfs / sim)     |
//! |                  | TemperaturePort   | composed thermometer           |
//! | `w1_thermometer` | TemperaturePort   | DS18B20 `w1_slave` file        |
//! | `spool_source`   | CommandSource     | per-channel mailbox dirs       |
//! | `state_store`    | PersistencePort   | JSON state file / memory       |
//! | `config_file`    | ConfigPort        | JSON config file               |
//! | `log_sink`       | EventSink         | `log` facade                   |

pub mod config_file;
pub mod hardware;
pub mod log_sink;
pub mod spool_source;
pub mod state_store;
pub(super) mod utils;
pub mod w1_thermometer;
