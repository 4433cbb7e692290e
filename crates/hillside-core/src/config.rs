//! Algorithm selection and numeric parameters for a run.

use std::fmt;
use std::str::FromStr;

use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::landscape::MAX_SPAN;

/// Trail window kept per agent for single-agent searches.
pub const SINGLE_AGENT_TRAIL_CAPACITY: usize = 200;
/// Trail window kept per agent for population searches.
pub const POPULATION_TRAIL_CAPACITY: usize = 30;

/// Closed set of search strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Discrete four-direction finite-difference search.
    #[default]
    HillClimbing,
    /// Alias of hill climbing; shares the same step rule.
    Greedy,
    SimulatedAnnealing,
    Genetic,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::HillClimbing,
        Algorithm::Greedy,
        Algorithm::SimulatedAnnealing,
        Algorithm::Genetic,
    ];

    /// Stable identifier used in config files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Algorithm::HillClimbing => "hill_climbing",
            Algorithm::Greedy => "greedy",
            Algorithm::SimulatedAnnealing => "simulated_annealing",
            Algorithm::Genetic => "genetic",
        }
    }

    /// Whether this strategy evolves a population rather than a single agent.
    #[must_use]
    pub const fn is_population(self) -> bool {
        matches!(self, Algorithm::Genetic)
    }

    #[must_use]
    pub const fn trail_capacity(self) -> usize {
        if self.is_population() {
            POPULATION_TRAIL_CAPACITY
        } else {
            SINGLE_AGENT_TRAIL_CAPACITY
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "hill_climbing" | "hill_climb" | "hillclimbing" => Ok(Algorithm::HillClimbing),
            "greedy" => Ok(Algorithm::Greedy),
            "simulated_annealing" | "annealing" | "sa" => Ok(Algorithm::SimulatedAnnealing),
            "genetic" | "evolutionary" | "ga" => Ok(Algorithm::Genetic),
            _ => Err(ConfigError::InvalidConfig("unknown algorithm")),
        }
    }
}

/// Parameters for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Search strategy.
    pub algorithm: Algorithm,
    /// Neighbour radius for single-agent searches and mutation scale for genetic.
    pub step_size: f64,
    /// Initial annealing temperature.
    pub temperature: f64,
    /// Number of agents evolved by the genetic search.
    pub population_size: usize,
    /// Per-child mutation probability in `[0, 1]`.
    pub mutation_rate: f64,
    /// Iteration budget; the run goes idle once it is reached.
    pub max_iterations: u64,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::HillClimbing,
            step_size: 0.1,
            temperature: 10.0,
            population_size: 20,
            mutation_rate: 0.1,
            max_iterations: 200,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Reject values that would produce corrupt state mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.step_size.is_finite() || self.step_size < 0.0 {
            return Err(ConfigError::InvalidConfig(
                "step_size must be finite and non-negative",
            ));
        }
        // genetic mutation draws from [-2s, 2s], a range 4s wide
        if 4.0 * self.step_size > MAX_SPAN {
            return Err(ConfigError::InvalidConfig(
                "step_size is too large to mutate with",
            ));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::InvalidConfig(
                "temperature must be finite and non-negative",
            ));
        }
        if !self.mutation_rate.is_finite() || !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidConfig("mutation_rate must lie in [0, 1]"));
        }
        if self.algorithm.is_population() && self.population_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "population_size must be positive for genetic search",
            ));
        }
        Ok(())
    }

    /// Number of agents a fresh run starts with.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        if self.algorithm.is_population() {
            self.population_size
        } else {
            1
        }
    }

    /// Returns the configured RNG, seeding from entropy if no seed is set.
    #[must_use]
    pub fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}
