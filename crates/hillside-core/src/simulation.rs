//! Stateful driver owning one search run.

use std::collections::VecDeque;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::agent::{best_of, random_population, sort_by_cost};
use crate::search;
use crate::{Agent, Algorithm, ConfigError, Landscape, SimulationConfig, SimulationError};

/// Whether the driver accepts ticks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Best cost within one iteration's population.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    pub iteration: u64,
    pub cost: f64,
}

/// Sliding window over the positions visited by one agent slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    capacity: usize,
    points: VecDeque<Agent>,
}

impl Trail {
    /// Start a trail at `origin`.
    #[must_use]
    pub fn seeded(origin: Agent, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut points = VecDeque::with_capacity(capacity);
        points.push_back(origin);
        Self { capacity, points }
    }

    /// Append a position, evicting the oldest once the window is full.
    pub fn push(&mut self, point: Agent) {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Change the window size, dropping the oldest entries if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent position.
    #[must_use]
    pub fn last(&self) -> Option<&Agent> {
        self.points.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.points.iter()
    }
}

/// Result of a single [`Simulation::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The driver is idle; nothing happened.
    Idle,
    /// One iteration was computed.
    Advanced {
        iteration: u64,
        current_best: Agent,
    },
    /// The iteration budget was already spent; the driver is now idle.
    Finished { iteration: u64 },
}

/// Read-only copy of driver state handed to consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationSnapshot {
    pub landscape: String,
    pub algorithm: Algorithm,
    pub state: RunState,
    pub iteration: u64,
    pub max_iterations: u64,
    pub agents: Vec<Agent>,
    pub best_point: Option<Agent>,
    pub history: Vec<HistoryPoint>,
    pub trails: Vec<Vec<Agent>>,
}

/// Owns the iteration counter, population, global best, history and trails
/// of one run and advances them one tick at a time.
///
/// The driver is a plain state machine; when ticks fire is decided by
/// whoever owns it.
pub struct Simulation {
    landscape: Landscape,
    config: SimulationConfig,
    rng: Box<dyn RngCore + Send>,
    state: RunState,
    iteration: u64,
    agents: Vec<Agent>,
    best_point: Option<Agent>,
    history: Vec<HistoryPoint>,
    trails: Vec<Trail>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("landscape", &self.landscape.name())
            .field("config", &self.config)
            .field("state", &self.state)
            .field("iteration", &self.iteration)
            .field("agents", &self.agents.len())
            .field("best_point", &self.best_point)
            .finish()
    }
}

impl Simulation {
    /// Build a driver using the RNG described by `config.rng_seed`.
    pub fn new(landscape: Landscape, config: SimulationConfig) -> Result<Self, SimulationError> {
        let rng = config.seeded_rng();
        Self::with_rng(landscape, config, rng)
    }

    /// Build a driver around an injected generator.
    pub fn with_rng<R>(
        landscape: Landscape,
        config: SimulationConfig,
        rng: R,
    ) -> Result<Self, SimulationError>
    where
        R: RngCore + Send + 'static,
    {
        config.validate()?;
        let mut simulation = Self {
            landscape,
            config,
            rng: Box::new(rng),
            state: RunState::Idle,
            iteration: 0,
            agents: Vec::new(),
            best_point: None,
            history: Vec::new(),
            trails: Vec::new(),
        };
        simulation.reset()?;
        Ok(simulation)
    }

    /// Discard the run and draw a fresh population. Leaves the driver idle.
    ///
    /// On error the previous state is kept untouched.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        self.config.validate()?;

        let mut agents = random_population(
            &self.landscape,
            self.config.agent_count(),
            self.rng.as_mut(),
        )?;
        sort_by_cost(&mut agents);

        let capacity = self.config.algorithm.trail_capacity();
        self.trails = agents
            .iter()
            .map(|agent| Trail::seeded(*agent, capacity))
            .collect();
        self.best_point = agents.first().copied();
        self.history = self
            .best_point
            .iter()
            .map(|best| HistoryPoint {
                iteration: 0,
                cost: best.value,
            })
            .collect();
        self.agents = agents;
        self.iteration = 0;
        self.state = RunState::Idle;

        debug!(
            landscape = self.landscape.name(),
            algorithm = %self.config.algorithm,
            agents = self.agents.len(),
            "simulation reset"
        );
        Ok(())
    }

    /// Swap the configuration and start over.
    pub fn reconfigure(&mut self, config: SimulationConfig) -> Result<(), SimulationError> {
        config.validate()?;
        let previous = std::mem::replace(&mut self.config, config);
        if let Err(err) = self.reset() {
            self.config = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Swap the landscape and start over.
    pub fn set_landscape(&mut self, landscape: Landscape) -> Result<(), SimulationError> {
        let previous = std::mem::replace(&mut self.landscape, landscape);
        if let Err(err) = self.reset() {
            self.landscape = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Apply new parameters to subsequent ticks without resetting the run.
    ///
    /// The population keeps its current size until the next reset.
    pub fn update_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Begin accepting ticks. No-op when already running.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        if self.state == RunState::Running {
            return Ok(());
        }
        self.config.validate()?;
        self.state = RunState::Running;
        Ok(())
    }

    /// Stop accepting ticks while keeping all state.
    pub fn pause(&mut self) {
        self.state = RunState::Idle;
    }

    /// Advance one iteration.
    ///
    /// A failed step (non-finite cost) leaves every field as it was and
    /// moves the driver to idle.
    pub fn tick(&mut self) -> Result<TickOutcome, SimulationError> {
        if self.state != RunState::Running {
            return Ok(TickOutcome::Idle);
        }
        if self.iteration >= self.config.max_iterations {
            self.state = RunState::Idle;
            info!(
                iteration = self.iteration,
                best = self.best_point.map(|best| best.value),
                "iteration budget reached"
            );
            return Ok(TickOutcome::Finished {
                iteration: self.iteration,
            });
        }

        let next = match search::step(
            &self.agents,
            &self.landscape,
            self.iteration,
            &self.config,
            self.rng.as_mut(),
        ) {
            Ok(next) => next,
            Err(err) => {
                self.state = RunState::Idle;
                error!(iteration = self.iteration, %err, "tick failed");
                return Err(err);
            }
        };

        self.record_trails(&next);

        let Some(current_best) = best_of(&next) else {
            self.state = RunState::Idle;
            return Err(SimulationError::EmptyPopulation);
        };
        if self
            .best_point
            .is_none_or(|best| current_best.improves_on(&best))
        {
            self.best_point = Some(current_best);
        }

        let iteration = self.iteration + 1;
        self.history.push(HistoryPoint {
            iteration,
            cost: current_best.value,
        });
        self.agents = next;
        self.iteration = iteration;

        trace!(iteration, cost = current_best.value, "tick");
        Ok(TickOutcome::Advanced {
            iteration,
            current_best,
        })
    }

    fn record_trails(&mut self, next: &[Agent]) {
        let capacity = self.config.algorithm.trail_capacity();
        if self.trails.len() != next.len() {
            self.trails = next
                .iter()
                .map(|agent| Trail::seeded(*agent, capacity))
                .collect();
            return;
        }
        for (trail, agent) in self.trails.iter_mut().zip(next) {
            if trail.capacity() != capacity {
                trail.set_capacity(capacity);
            }
            trail.push(*agent);
        }
    }

    /// Copy out everything a renderer or chart needs.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            landscape: self.landscape.name().to_string(),
            algorithm: self.config.algorithm,
            state: self.state,
            iteration: self.iteration,
            max_iterations: self.config.max_iterations,
            agents: self.agents.clone(),
            best_point: self.best_point,
            history: self.history.clone(),
            trails: self
                .trails
                .iter()
                .map(|trail| trail.iter().copied().collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    #[must_use]
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Lowest-cost agent seen since the last reset.
    #[must_use]
    pub const fn best_point(&self) -> Option<Agent> {
        self.best_point
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryPoint] {
        &self.history
    }

    #[must_use]
    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, GlobalMinimum, LandscapeError};
    use rand::{SeedableRng, rngs::SmallRng};

    fn bowl() -> Landscape {
        Landscape::new(
            "bowl",
            "",
            Bounds::symmetric(5.0),
            GlobalMinimum {
                x: 0.0,
                y: 0.0,
                value: 0.0,
            },
            |x, y| x * x + y * y,
        )
        .expect("landscape")
    }

    fn seeded(config: SimulationConfig) -> Simulation {
        Simulation::with_rng(bowl(), config, SmallRng::seed_from_u64(0x5EED)).expect("simulation")
    }

    #[test]
    fn trail_window_drops_oldest() {
        let point = |x: f64| Agent {
            x,
            y: 0.0,
            value: x,
        };
        let mut trail = Trail::seeded(point(0.0), 3);
        for x in 1..=4 {
            trail.push(point(x as f64));
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f64> = trail.iter().map(|a| a.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
        trail.set_capacity(1);
        assert_eq!(trail.last().map(|a| a.x), Some(4.0));
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn reset_seeds_sorted_state() {
        let sim = seeded(SimulationConfig {
            algorithm: Algorithm::Genetic,
            population_size: 10,
            ..SimulationConfig::default()
        });
        assert_eq!(sim.state(), RunState::Idle);
        assert_eq!(sim.iteration(), 0);
        assert_eq!(sim.agents().len(), 10);
        assert!(sim.agents().windows(2).all(|w| w[0].value <= w[1].value));
        assert_eq!(sim.best_point(), Some(sim.agents()[0]));
        assert_eq!(
            sim.history(),
            &[HistoryPoint {
                iteration: 0,
                cost: sim.agents()[0].value
            }]
        );
        assert!(sim.trails().iter().zip(sim.agents()).all(|(t, a)| {
            t.len() == 1 && t.last() == Some(a)
        }));
    }

    #[test]
    fn idle_driver_ignores_ticks() {
        let mut sim = seeded(SimulationConfig::default());
        assert_eq!(sim.tick(), Ok(TickOutcome::Idle));
        assert_eq!(sim.iteration(), 0);
    }

    #[test]
    fn pause_preserves_state() {
        let mut sim = seeded(SimulationConfig::default());
        sim.start().expect("start");
        sim.tick().expect("tick");
        sim.tick().expect("tick");
        sim.pause();
        let before = sim.snapshot();
        assert_eq!(sim.tick(), Ok(TickOutcome::Idle));
        assert_eq!(sim.snapshot(), before);
        assert_eq!(before.iteration, 2);
        assert_eq!(before.history.len(), 3);
    }

    #[test]
    fn start_is_idempotent() {
        let mut sim = seeded(SimulationConfig::default());
        sim.start().expect("start");
        sim.start().expect("start again");
        assert!(sim.is_running());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = SimulationConfig {
            step_size: f64::NAN,
            ..SimulationConfig::default()
        };
        let err = Simulation::with_rng(bowl(), config, SmallRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));

        let mut sim = seeded(SimulationConfig::default());
        let before = sim.snapshot();
        let bad = SimulationConfig {
            algorithm: Algorithm::Genetic,
            population_size: 0,
            ..SimulationConfig::default()
        };
        assert!(sim.reconfigure(bad.clone()).is_err());
        assert!(sim.update_config(bad).is_err());
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn huge_mutation_spread_is_rejected_before_running() {
        let mut config = SimulationConfig {
            algorithm: Algorithm::Genetic,
            step_size: 1e308,
            mutation_rate: 1.0,
            population_size: 8,
            ..SimulationConfig::default()
        };
        let err = Simulation::with_rng(bowl(), config.clone(), SmallRng::seed_from_u64(2))
            .unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));

        // the largest accepted step still mutates without leaving the domain
        config.step_size = f64::MAX / 8.0;
        let mut sim = seeded(config);
        sim.start().expect("start");
        for _ in 0..5 {
            sim.tick().expect("tick");
        }
        let bounds = sim.landscape().bounds();
        assert!(sim.agents().iter().all(|a| bounds.contains(a.x, a.y)));
    }

    #[test]
    fn wide_landscape_is_rejected_before_sampling() {
        let err = Landscape::new(
            "wide",
            "",
            Bounds::new(-f64::MAX, f64::MAX, -1.0, 1.0),
            GlobalMinimum {
                x: 0.0,
                y: 0.0,
                value: 0.0,
            },
            |x, y| x * x + y * y,
        )
        .unwrap_err();
        assert!(matches!(err, LandscapeError::InvalidBounds { axis: "x", .. }));
    }

    #[test]
    fn non_finite_cost_halts_without_corrupting_state() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let poisoned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&poisoned);
        let landscape = Landscape::new(
            "poisonable",
            "",
            Bounds::symmetric(5.0),
            GlobalMinimum {
                x: 0.0,
                y: 0.0,
                value: 0.0,
            },
            move |x, y| {
                if flag.load(Ordering::Relaxed) {
                    f64::NAN
                } else {
                    x * x + y * y
                }
            },
        )
        .expect("landscape");
        let mut sim = Simulation::with_rng(
            landscape,
            SimulationConfig::default(),
            SmallRng::seed_from_u64(4),
        )
        .expect("simulation");
        sim.start().expect("start");
        sim.tick().expect("healthy tick");

        poisoned.store(true, Ordering::Relaxed);
        let before = sim.snapshot();
        let err = sim.tick().unwrap_err();
        assert!(matches!(err, SimulationError::NonFiniteCost { value, .. } if value.is_nan()));
        assert_eq!(sim.state(), RunState::Idle);

        let after = sim.snapshot();
        assert_eq!(after.iteration, before.iteration);
        assert_eq!(after.history, before.history);
        assert_eq!(after.best_point, before.best_point);
        assert_eq!(after.trails, before.trails);
    }

    #[test]
    fn live_update_keeps_population_until_reset() {
        let mut sim = seeded(SimulationConfig {
            algorithm: Algorithm::Genetic,
            population_size: 10,
            ..SimulationConfig::default()
        });
        sim.start().expect("start");
        sim.tick().expect("tick");
        sim.update_config(SimulationConfig {
            algorithm: Algorithm::Genetic,
            population_size: 4,
            ..SimulationConfig::default()
        })
        .expect("update");
        sim.tick().expect("tick");
        assert_eq!(sim.agents().len(), 10);
        assert_eq!(sim.iteration(), 2);
        sim.reset().expect("reset");
        assert_eq!(sim.agents().len(), 4);
        assert_eq!(sim.trails().len(), 4);
    }

    #[test]
    fn switching_algorithm_resizes_trail_windows() {
        let mut sim = seeded(SimulationConfig::default());
        sim.start().expect("start");
        for _ in 0..40 {
            sim.tick().expect("tick");
        }
        assert_eq!(sim.trails()[0].len(), 41);
        sim.update_config(SimulationConfig {
            algorithm: Algorithm::Genetic,
            ..SimulationConfig::default()
        })
        .expect("update");
        sim.tick().expect("tick");
        assert_eq!(sim.trails()[0].len(), crate::POPULATION_TRAIL_CAPACITY);
        assert_eq!(sim.trails()[0].last(), Some(&sim.agents()[0]));
    }
}
