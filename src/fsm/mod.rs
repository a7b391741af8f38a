//! Function-pointer finite state machine for the control mode.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                      │
//! │  ┌──────────────────┬──────────┬─────────┬────────────┬────────┐ │
//! │  │ ControlState     │ on_enter │ on_exit │ on_command │ on_tick│ │
//! │  ├──────────────────┼──────────┼─────────┼────────────┼────────┤ │
//! │  │ LegacyOverride   │ fn(ctx)  │ fn(ctx) │ fn(ctx,cmd)│ fn(ctx)│ │
//! │  │ AutomaticControl │ fn(ctx)  │ fn(ctx) │ fn(ctx,cmd)│ fn(ctx)│ │
//! │  └──────────────────┴──────────┴─────────┴────────────┴────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command is dispatched to `on_command` of the **current** state.
//! If it returns `Some(next)` and `next` differs from the current state,
//! the engine runs `on_exit` for the current state, then `on_enter` for
//! the next.  `on_tick` runs once per controller cycle.  Handlers only
//! compute the desired [`RelayConfig`](crate::relay::RelayConfig) in the
//! context; driving the bank is the controller's job.

pub mod context;
pub mod states;

use context::ControllerContext;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::command::Command;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Control mode.  Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControlState {
    /// The mechanical programmer drives the boiler.
    LegacyOverride = 0,
    /// The controller drives HW/CH from commands and the thermostat.
    AutomaticControl = 1,
}

impl ControlState {
    pub const COUNT: usize = 2;

    /// Convert a table index back to a state.  Out-of-range indices fall
    /// back to `LegacyOverride`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::LegacyOverride,
            1 => Self::AutomaticControl,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::LegacyOverride
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// `on_enter` / `on_exit`.  Run exactly once per transition.
pub type StateActionFn = fn(&mut ControllerContext);

/// Per-command handler.  `Some(next)` requests a transition.
pub type CommandFn = fn(&mut ControllerContext, &Command) -> Option<ControlState>;

/// Per-cycle handler.  `Some(next)` requests a transition.
pub type TickFn = fn(&mut ControllerContext) -> Option<ControlState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: ControlState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_command: CommandFn,
    pub on_tick: TickFn,
}

/// Outcome of dispatching one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ControlState,
    pub to: ControlState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct ControllerStateMachine {
    table: [StateDescriptor; ControlState::COUNT],
    current: usize,
    transitions: u64,
}

impl ControllerStateMachine {
    pub fn new(table: [StateDescriptor; ControlState::COUNT], initial: ControlState) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run `on_enter` for the initial state.  Call once before the first
    /// command.
    pub fn start(&mut self, ctx: &mut ControllerContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Dispatch `command` to the current state.
    ///
    /// `Unrecognized` never reaches a handler: it is logged and leaves
    /// everything unchanged.
    pub fn handle(&mut self, command: &Command, ctx: &mut ControllerContext) -> Transition {
        let from = self.current_state();

        if let Command::Unrecognized(text) = command {
            warn!("FSM: unrecognised command {:?} ignored", text.as_str());
            return Transition { from, to: from };
        }

        if let Some(next) = (self.table[self.current].on_command)(ctx, command) {
            self.force_transition(next, ctx);
        }
        Transition {
            from,
            to: self.current_state(),
        }
    }

    /// Per-cycle hook for the current state.
    pub fn tick(&mut self, ctx: &mut ControllerContext) -> Transition {
        let from = self.current_state();
        if let Some(next) = (self.table[self.current].on_tick)(ctx) {
            self.force_transition(next, ctx);
        }
        Transition {
            from,
            to: self.current_state(),
        }
    }

    /// Immediate transition regardless of handlers (degradation, shutdown).
    /// A no-op when already in `next`.
    pub fn force_transition(&mut self, next: ControlState, ctx: &mut ControllerContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> ControlState {
        ControlState::from_index(self.current)
    }

    /// Number of transitions since construction.
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    fn transition(&mut self, next: ControlState, ctx: &mut ControllerContext) {
        let next_idx = next as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transitions += 1;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
