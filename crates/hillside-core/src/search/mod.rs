//! Per-iteration search rules.
//!
//! [`step`] is a pure transition: it reads the current agents and returns a
//! fresh population of the same length. All randomness flows through the
//! caller-supplied generator so seeded runs replay exactly.

mod annealing;
mod genetic;
mod hill_climb;

use rand::RngCore;

use crate::{Agent, Algorithm, Landscape, SimulationConfig, SimulationError};

pub use annealing::{effective_temperature, metropolis_probability};
pub use genetic::{ELITE_FRACTION, elite_count, parent_pool_size};

/// Produce the next generation of agents for the configured algorithm.
///
/// Single-agent rules are applied to each agent independently, so a
/// population handed to hill climbing or annealing keeps its length.
pub fn step(
    agents: &[Agent],
    landscape: &Landscape,
    iteration: u64,
    config: &SimulationConfig,
    rng: &mut dyn RngCore,
) -> Result<Vec<Agent>, SimulationError> {
    if agents.is_empty() {
        return Err(SimulationError::EmptyPopulation);
    }

    match config.algorithm {
        Algorithm::HillClimbing | Algorithm::Greedy => agents
            .iter()
            .map(|agent| hill_climb::climb(agent, landscape, config.step_size))
            .collect(),
        Algorithm::SimulatedAnnealing => agents
            .iter()
            .map(|agent| {
                annealing::anneal(
                    agent,
                    landscape,
                    iteration,
                    config.step_size,
                    config.temperature,
                    &mut *rng,
                )
            })
            .collect(),
        Algorithm::Genetic => genetic::evolve(
            agents,
            landscape,
            config.step_size,
            config.mutation_rate,
            rng,
        ),
    }
}
