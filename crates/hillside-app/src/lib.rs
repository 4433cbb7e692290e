//! Host-side plumbing for the hillside engine: the command bus, the tick
//! scheduler and the client control handle.

use std::sync::{Arc, Mutex};

use hillside_core::Simulation;

pub type SharedSimulation = Arc<Mutex<Simulation>>;

pub mod command;
pub mod control;
pub mod scheduler;

pub use command::{
    CommandReceiver, CommandSender, CommandSubmit, ControlCommand, apply_control_command,
    create_command_bus, drain_pending_commands, make_command_submit,
};
pub use control::{ControlError, ControlHandle};
pub use scheduler::TickScheduler;

/// Wrap a simulation for sharing between the scheduler and readers.
#[must_use]
pub fn share(simulation: Simulation) -> SharedSimulation {
    Arc::new(Mutex::new(simulation))
}
