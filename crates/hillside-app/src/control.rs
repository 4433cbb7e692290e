use std::sync::{MutexGuard, PoisonError};

use hillside_core::{ConfigError, Simulation, SimulationError, SimulationSnapshot};
use thiserror::Error;

use crate::SharedSimulation;
use crate::command::{CommandSubmit, ControlCommand};

/// Failures surfaced to control clients.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("failed to lock simulation state")]
    Lock,
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown landscape: {0}")]
    UnknownLandscape(String),
    #[error("command must be handled by the scheduler")]
    NotSimulationCommand,
    #[error("command queue is full or closed")]
    CommandRejected,
}

impl From<PoisonError<MutexGuard<'_, Simulation>>> for ControlError {
    fn from(_: PoisonError<MutexGuard<'_, Simulation>>) -> Self {
        ControlError::Lock
    }
}

/// Client-side handle: queue commands and read snapshots.
#[derive(Clone)]
pub struct ControlHandle {
    shared: SharedSimulation,
    submit: CommandSubmit,
}

impl ControlHandle {
    pub fn new(shared: SharedSimulation, submit: CommandSubmit) -> Self {
        Self { shared, submit }
    }

    pub fn send(&self, command: ControlCommand) -> Result<(), ControlError> {
        if (self.submit)(command) {
            Ok(())
        } else {
            Err(ControlError::CommandRejected)
        }
    }

    /// Copy of the current state; never holds the lock past return.
    pub fn snapshot(&self) -> Result<SimulationSnapshot, ControlError> {
        let simulation = self.shared.lock()?;
        Ok(simulation.snapshot())
    }
}
