//! PiHeat controller library.
//!
//! Drives a combi boiler's hot water and central heating relays from
//! mailbox commands and a room thermometer, with the original mechanical
//! programmer as the fallback.  The control core ([`app`], [`fsm`],
//! [`relay`], [`thermostat`], [`command`]) is pure; all I/O sits behind
//! the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod command;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod relay;
pub mod safety;
pub mod thermostat;

pub use error::{Error, Result};
