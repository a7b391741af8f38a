//! Fuzz target: `interpret`
//!
//! Drives arbitrary mailbox text through the command interpreter on every
//! channel and asserts that it never panics, never yields a non-finite
//! setpoint, and never keeps more than `COMMAND_TEXT_CAP` bytes of an
//! unrecognized message.
//!
//! cargo fuzz run fuzz_command_interpreter

#![no_main]

use libfuzzer_sys::fuzz_target;
use piheat::command::{COMMAND_TEXT_CAP, Channel, Command, interpret};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    for channel in Channel::ALL {
        match interpret(channel, &raw) {
            Command::CentralHeatingSetTarget(t) => {
                assert!(t.is_finite(), "setpoint must be finite");
            }
            Command::Unrecognized(text) => {
                assert!(text.len() <= COMMAND_TEXT_CAP, "unrecognized text over cap");
                assert!(raw.starts_with(text.as_str()));
            }
            _ => {}
        }
    }
});
