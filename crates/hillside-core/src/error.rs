//! Error types surfaced by the engine.

use thiserror::Error;

/// Errors raised when validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Errors raised when constructing a [`Landscape`](crate::Landscape).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LandscapeError {
    /// Domain bounds are non-finite or not strictly increasing on an axis.
    #[error("invalid bounds on {axis} axis: [{min}, {max}]")]
    InvalidBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

/// Errors that can occur while initialising or advancing a simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// The configuration was rejected before any state was touched.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The cost function produced NaN or an infinity.
    #[error("cost function returned non-finite value {value} at ({x}, {y})")]
    NonFiniteCost { x: f64, y: f64, value: f64 },
    /// The stepper was handed an empty population.
    #[error("cannot step an empty population")]
    EmptyPopulation,
}
