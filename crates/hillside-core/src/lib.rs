//! Simulation engine for the hillside optimisation sandbox.
//!
//! Agents search a bounded two-dimensional cost [`Landscape`] using one of
//! the strategies in [`Algorithm`]. [`search::step`] is the pure per-iteration
//! transition; [`Simulation`] owns a run and folds each step into the global
//! best point, the per-iteration cost history and bounded per-agent trails.

mod agent;
pub mod catalog;
mod config;
mod error;
mod landscape;
pub mod search;
mod simulation;

pub use agent::{Agent, best_of, random_population, sort_by_cost};
pub use config::{
    Algorithm, POPULATION_TRAIL_CAPACITY, SINGLE_AGENT_TRAIL_CAPACITY, SimulationConfig,
};
pub use error::{ConfigError, LandscapeError, SimulationError};
pub use landscape::{Bounds, CostFn, GlobalMinimum, Landscape};
pub use simulation::{
    HistoryPoint, RunState, Simulation, SimulationSnapshot, TickOutcome, Trail,
};
