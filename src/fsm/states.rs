//! Concrete state handler functions and table builder.
//!
//! ```text
//!  LEGACY_OVERRIDE ──[st699off]──▶ AUTOMATIC_CONTROL
//!        ▲                               │
//!        └───────────[st699on]───────────┘
//!
//!  AUTOMATIC_CONTROL:
//!    HWon / HWoff   → hot water demand, inhibit re-derived
//!    CHoff          → CH off, setpoint inactive
//!    CH=<t>         → store t, thermostat drives CH
//!
//!  LEGACY_OVERRIDE:
//!    CH=<t>         → store t, request CH for later
//!    CHoff          → drop the CH request
//!    HW*            → ignored
//!
//!  The CH request survives both transitions; entering AUTOMATIC_CONTROL
//!  releases every relay and the next tick applies the request.
//! ```

use super::context::ControllerContext;
use super::{ControlState, StateDescriptor};
use crate::command::Command;
use crate::relay::RelayConfig;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

pub fn build_state_table() -> [StateDescriptor; ControlState::COUNT] {
    [
        // Index 0: LegacyOverride
        StateDescriptor {
            id: ControlState::LegacyOverride,
            name: "LegacyOverride",
            on_enter: Some(legacy_enter),
            on_exit: None,
            on_command: legacy_command,
            on_tick: legacy_tick,
        },
        // Index 1: AutomaticControl
        StateDescriptor {
            id: ControlState::AutomaticControl,
            name: "AutomaticControl",
            on_enter: Some(automatic_enter),
            on_exit: Some(automatic_exit),
            on_command: automatic_command,
            on_tick: automatic_tick,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  LEGACY_OVERRIDE: mechanical programmer in charge
// ═══════════════════════════════════════════════════════════════════════════

fn legacy_enter(ctx: &mut ControllerContext) {
    ctx.relays = RelayConfig::legacy_override();
    info!("LEGACY: programmer in control, automatic relays released");
}

fn legacy_command(ctx: &mut ControllerContext, command: &Command) -> Option<ControlState> {
    match command {
        Command::LegacyOverrideOff => Some(ControlState::AutomaticControl),
        Command::LegacyOverrideOn => None,
        Command::CentralHeatingSetTarget(target) => {
            ctx.target_c = *target;
            ctx.heating_requested = true;
            info!("LEGACY: setpoint {:.1}°C stored for automatic control", target);
            None
        }
        Command::CentralHeatingOff => {
            ctx.heating_requested = false;
            info!("LEGACY: CH request dropped");
            None
        }
        other => {
            info!("LEGACY: {:?} ignored while programmer is in control", other);
            None
        }
    }
}

fn legacy_tick(_ctx: &mut ControllerContext) -> Option<ControlState> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AUTOMATIC_CONTROL: commands and thermostat drive HW/CH
// ═══════════════════════════════════════════════════════════════════════════

fn automatic_enter(ctx: &mut ControllerContext) {
    ctx.relays = RelayConfig::all_off();
    info!(
        "AUTOMATIC: controller in charge, setpoint {:.1}°C (requested={})",
        ctx.target_c, ctx.heating_requested
    );
}

fn automatic_exit(ctx: &mut ControllerContext) {
    debug!(
        "AUTOMATIC: leaving with hw={} ch={}",
        ctx.relays.hot_water_demand, ctx.relays.central_heating_demand
    );
}

fn automatic_command(ctx: &mut ControllerContext, command: &Command) -> Option<ControlState> {
    match command {
        Command::LegacyOverrideOn => return Some(ControlState::LegacyOverride),
        Command::LegacyOverrideOff => {}
        Command::HotWaterOn => ctx.relays = ctx.relays.with_hot_water(true),
        Command::HotWaterOff => ctx.relays = ctx.relays.with_hot_water(false),
        Command::CentralHeatingOff => {
            ctx.heating_requested = false;
            ctx.relays = ctx.relays.with_central_heating(false);
        }
        Command::CentralHeatingSetTarget(target) => {
            ctx.target_c = *target;
            ctx.heating_requested = true;
            ctx.apply_thermostat();
            if let Some(reason) = ctx.rejected_reading {
                warn!("AUTOMATIC: setpoint {:.1}°C stored, CH held ({})", target, reason);
            }
        }
        Command::Unrecognized(_) => {}
    }
    None
}

fn automatic_tick(ctx: &mut ControllerContext) -> Option<ControlState> {
    if ctx.heating_requested {
        ctx.apply_thermostat();
    }
    None
}
