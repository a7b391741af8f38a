//! Application core: control logic, zero I/O.
//!
//! This module contains the business rules of the heating controller:
//! FSM orchestration, thermostat evaluation, fault degradation and
//! write-behind persistence.  All interaction with GPIO, the sensor,
//! mailboxes and storage happens through **port traits** defined in
//! [`ports`], keeping this layer testable without real hardware.

pub mod events;
pub mod ports;
pub mod service;
