use std::f64::consts::TAU;

use rand::{Rng, RngCore};

use crate::{Agent, Landscape, SimulationError};

/// Hyperbolic cooling: `T = T0 / (1 + 0.1 * iteration)`.
#[must_use]
pub fn effective_temperature(initial: f64, iteration: u64) -> f64 {
    initial / (1.0 + 0.1 * iteration as f64)
}

/// Metropolis acceptance probability for an uphill move of size `delta`.
///
/// Downhill moves return `1.0`. A non-positive temperature degenerates to a
/// greedy rule, and an overflowing `delta / T` yields `0.0` rather than NaN.
#[must_use]
pub fn metropolis_probability(delta: f64, temperature: f64) -> f64 {
    if delta < 0.0 {
        return 1.0;
    }
    if temperature.is_nan() || temperature <= 0.0 {
        return 0.0;
    }
    let ratio = delta / temperature;
    if !ratio.is_finite() {
        return 0.0;
    }
    (-ratio).exp()
}

/// One annealing proposal at a random angle and fixed radius `step_size`.
pub(super) fn anneal(
    agent: &Agent,
    landscape: &Landscape,
    iteration: u64,
    step_size: f64,
    initial_temperature: f64,
    rng: &mut dyn RngCore,
) -> Result<Agent, SimulationError> {
    let angle = rng.random_range(0.0..TAU);
    let candidate = Agent::evaluate(
        landscape,
        agent.x + angle.cos() * step_size,
        agent.y + angle.sin() * step_size,
    )?;

    let temperature = effective_temperature(initial_temperature, iteration);
    let delta = candidate.value - agent.value;
    if delta < 0.0 || rng.random::<f64>() < metropolis_probability(delta, temperature) {
        Ok(candidate)
    } else {
        Ok(*agent)
    }
}
