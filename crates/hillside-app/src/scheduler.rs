//! Background thread deciding when the simulation ticks.
//!
//! The simulation itself only knows how to advance one iteration. This
//! module owns the clock: it drains queued commands, fires one tick per
//! period while the run is active, and lets the period change on the fly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hillside_core::TickOutcome;
use tracing::{debug, error, info, warn};

use crate::SharedSimulation;
use crate::command::{
    CommandReceiver, ControlCommand, apply_control_command, drain_pending_commands,
};

/// Upper bound on how long the loop sleeps before re-checking commands.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Owns the ticking thread. Dropping the scheduler stops the thread and
/// waits for it, same as [`TickScheduler::shutdown`].
pub struct TickScheduler {
    interval_micros: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    /// Spawn the scheduler thread.
    pub fn spawn(
        shared: SharedSimulation,
        receiver: CommandReceiver,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let interval_micros = Arc::new(AtomicU64::new(duration_to_micros(interval)));
        let stop = Arc::new(AtomicBool::new(false));

        let thread_interval = Arc::clone(&interval_micros);
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("hillside-scheduler".into())
            .spawn(move || run_loop(&shared, &receiver, &thread_interval, &thread_stop))?;

        Ok(Self {
            interval_micros,
            stop,
            handle: Some(handle),
        })
    }

    /// Current tick period.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_micros(self.interval_micros.load(Ordering::Relaxed))
    }

    /// Change the tick period. The next tick is scheduled from the previous one.
    pub fn set_interval(&self, interval: Duration) {
        self.interval_micros
            .store(duration_to_micros(interval), Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the loop and wait for the thread. An in-flight tick completes first.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("scheduler thread panicked");
            }
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn duration_to_micros(interval: Duration) -> u64 {
    u64::try_from(interval.as_micros()).unwrap_or(u64::MAX)
}

fn run_loop(
    shared: &SharedSimulation,
    receiver: &CommandReceiver,
    interval_micros: &AtomicU64,
    stop: &AtomicBool,
) {
    let mut last_tick: Option<Instant> = None;
    debug!("scheduler started");

    while !stop.load(Ordering::Acquire) {
        let (running, next_due) = {
            let Ok(mut simulation) = shared.lock() else {
                error!("simulation mutex poisoned; scheduler exiting");
                return;
            };

            for command in drain_pending_commands(receiver) {
                match command {
                    ControlCommand::Shutdown => {
                        info!("scheduler shutdown requested");
                        return;
                    }
                    ControlCommand::SetTickInterval(interval) => {
                        debug!(?interval, "tick interval changed");
                        interval_micros.store(duration_to_micros(interval), Ordering::Relaxed);
                    }
                    other => {
                        let label = other.label();
                        if let Err(err) = apply_control_command(&mut simulation, other) {
                            warn!(command = label, %err, "control command rejected");
                        }
                    }
                }
            }

            let interval = Duration::from_micros(interval_micros.load(Ordering::Relaxed));
            let now = Instant::now();
            let due = last_tick.is_none_or(|at| {
                at.checked_add(interval).is_some_and(|due_at| now >= due_at)
            });
            if simulation.is_running() && due {
                match simulation.tick() {
                    Ok(TickOutcome::Finished { iteration }) => {
                        info!(iteration, "run finished");
                    }
                    Ok(_) => {}
                    Err(err) => error!(%err, "tick failed; simulation paused"),
                }
                last_tick = Some(now);
            }
            let next_due = last_tick
                .and_then(|at| at.checked_add(interval))
                .unwrap_or(now + POLL_INTERVAL);
            (simulation.is_running(), next_due)
        };

        if !running {
            thread::sleep(POLL_INTERVAL);
            continue;
        }
        let wait = next_due.saturating_duration_since(Instant::now());
        if wait.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(wait.min(POLL_INTERVAL));
        }
    }
    debug!("scheduler stopped");
}
