use rand::{Rng, RngCore};

use crate::agent::sort_by_cost;
use crate::{Agent, Landscape, SimulationError};

/// Share of the sorted population carried forward unchanged.
pub const ELITE_FRACTION: f64 = 0.2;

/// `floor(population * 0.2)`.
#[must_use]
pub fn elite_count(population: usize) -> usize {
    (population as f64 * ELITE_FRACTION).floor() as usize
}

/// Size of the "better half" parents are drawn from, never below one.
#[must_use]
pub fn parent_pool_size(population: usize) -> usize {
    (population / 2).max(1)
}

/// Elitism plus midpoint crossover with uniform mutation.
///
/// Parents are sampled with replacement, so a child may be a clone of a
/// single parent.
pub(super) fn evolve(
    agents: &[Agent],
    landscape: &Landscape,
    step_size: f64,
    mutation_rate: f64,
    rng: &mut dyn RngCore,
) -> Result<Vec<Agent>, SimulationError> {
    let mut ranked = agents.to_vec();
    sort_by_cost(&mut ranked);

    let population = ranked.len();
    let pool = parent_pool_size(population).min(population);
    let spread = 2.0 * step_size;

    let mut next = Vec::with_capacity(population);
    next.extend_from_slice(&ranked[..elite_count(population)]);

    while next.len() < population {
        let first = ranked[rng.random_range(0..pool)];
        let second = ranked[rng.random_range(0..pool)];
        let mut x = (first.x + second.x) / 2.0;
        let mut y = (first.y + second.y) / 2.0;
        if rng.random::<f64>() < mutation_rate {
            x += rng.random_range(-spread..=spread);
            y += rng.random_range(-spread..=spread);
        }
        next.push(Agent::evaluate(landscape, x, y)?);
    }

    Ok(next)
}
