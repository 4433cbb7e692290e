use crossfire::mpmc;
use crossfire::{MAsyncTx, MRx, TryRecvError, TrySendError, detect_backoff_cfg};
use hillside_core::{Simulation, SimulationConfig, catalog};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ControlError;

/// Requests delivered to the scheduler thread between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Start,
    Pause,
    Reset,
    /// Change the tick period without restarting the loop.
    SetTickInterval(Duration),
    /// Apply new parameters to the running search.
    UpdateConfig(SimulationConfig),
    /// Replace the parameters and reset.
    Reconfigure(SimulationConfig),
    /// Switch to a catalog landscape by name and reset.
    SetLandscape(String),
    Shutdown,
}

impl ControlCommand {
    /// Short name used as a log field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Reset => "reset",
            Self::SetTickInterval(_) => "set_tick_interval",
            Self::UpdateConfig(_) => "update_config",
            Self::Reconfigure(_) => "reconfigure",
            Self::SetLandscape(_) => "set_landscape",
            Self::Shutdown => "shutdown",
        }
    }
}

pub type CommandSender = MAsyncTx<ControlCommand>;
pub type CommandReceiver = MRx<ControlCommand>;
pub type CommandSubmit = Arc<dyn Fn(ControlCommand) -> bool + Send + Sync>;

/// Bounded queue between control surfaces (async senders) and the
/// scheduler thread (blocking receiver).
pub fn create_command_bus(capacity: usize) -> (CommandSender, CommandReceiver) {
    detect_backoff_cfg();
    debug!(capacity, "control command bus created");
    mpmc::bounded_tx_async_rx_blocking(capacity)
}

/// Pop every queued command without blocking.
pub fn drain_pending_commands(receiver: &CommandReceiver) -> Vec<ControlCommand> {
    let mut commands = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(command) => commands.push(command),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => break,
        }
    }
    commands
}

/// Apply a simulation-level command. Scheduler-level commands
/// (`SetTickInterval`, `Shutdown`) are rejected here.
pub fn apply_control_command(
    simulation: &mut Simulation,
    command: ControlCommand,
) -> Result<(), ControlError> {
    debug!(command = command.label(), "applying control command");
    match command {
        ControlCommand::Start => simulation.start()?,
        ControlCommand::Pause => simulation.pause(),
        ControlCommand::Reset => simulation.reset()?,
        ControlCommand::UpdateConfig(config) => simulation.update_config(config)?,
        ControlCommand::Reconfigure(config) => simulation.reconfigure(config)?,
        ControlCommand::SetLandscape(name) => {
            let landscape =
                catalog::by_name(&name).ok_or(ControlError::UnknownLandscape(name))?;
            simulation.set_landscape(landscape)?;
        }
        ControlCommand::SetTickInterval(_) | ControlCommand::Shutdown => {
            return Err(ControlError::NotSimulationCommand);
        }
    }
    Ok(())
}

/// Wrap the sender in a non-blocking submit closure. Returns `false` and
/// logs when the scheduler cannot take the command.
pub fn make_command_submit(sender: CommandSender) -> CommandSubmit {
    let sender = Arc::new(sender);
    Arc::new(move |command: ControlCommand| {
        let label = command.label();
        match sender.try_send(command) {
            Ok(()) => {
                debug!(command = label, "control command queued");
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(command = label, "scheduler queue full; command dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(command = label, "scheduler stopped; command dropped");
                false
            }
        }
    })
}
