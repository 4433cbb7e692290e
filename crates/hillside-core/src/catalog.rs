//! Built-in teaching landscapes.

use std::f64::consts::{E, TAU};

use crate::{Bounds, GlobalMinimum, Landscape, LandscapeError};

/// Names accepted by [`by_name`], in display order.
pub const NAMES: [&str; 6] = [
    "bowl",
    "rastrigin",
    "himmelblau",
    "ackley",
    "rosenbrock",
    "six_hump_camel",
];

/// Look up a built-in landscape. Matching ignores case and `-`/`_`.
#[must_use]
pub fn by_name(name: &str) -> Option<Landscape> {
    let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
    let built = match normalized.as_str() {
        "bowl" | "sphere" => bowl(),
        "rastrigin" => rastrigin(),
        "himmelblau" => himmelblau(),
        "ackley" => ackley(),
        "rosenbrock" => rosenbrock(),
        "six_hump_camel" | "camel" => six_hump_camel(),
        _ => return None,
    };
    built.ok()
}

/// Every built-in landscape.
#[must_use]
pub fn all() -> Vec<Landscape> {
    NAMES.iter().filter_map(|name| by_name(name)).collect()
}

fn origin() -> GlobalMinimum {
    GlobalMinimum {
        x: 0.0,
        y: 0.0,
        value: 0.0,
    }
}

/// Convex bowl `x^2 + y^2`.
pub fn bowl() -> Result<Landscape, LandscapeError> {
    Landscape::new(
        "bowl",
        "Convex quadratic bowl; every direction downhill leads to the origin.",
        Bounds::symmetric(5.0),
        origin(),
        |x, y| x * x + y * y,
    )
}

/// Rastrigin: a regular grid of local minima around the origin.
pub fn rastrigin() -> Result<Landscape, LandscapeError> {
    Landscape::new(
        "rastrigin",
        "Egg-crate surface with many regularly spaced local minima.",
        Bounds::symmetric(5.12),
        origin(),
        |x, y| 20.0 + x * x - 10.0 * (TAU * x).cos() + y * y - 10.0 * (TAU * y).cos(),
    )
}

/// Himmelblau: four equal global minima.
pub fn himmelblau() -> Result<Landscape, LandscapeError> {
    Landscape::new(
        "himmelblau",
        "Four separate basins that all reach zero.",
        Bounds::symmetric(5.0),
        GlobalMinimum {
            x: 3.0,
            y: 2.0,
            value: 0.0,
        },
        |x, y| (x * x + y - 11.0).powi(2) + (x + y * y - 7.0).powi(2),
    )
}

/// Ackley: nearly flat outer region with a deep central funnel.
pub fn ackley() -> Result<Landscape, LandscapeError> {
    Landscape::new(
        "ackley",
        "Flat, bumpy plateau surrounding a narrow central hole.",
        Bounds::symmetric(5.0),
        origin(),
        |x, y| {
            -20.0 * (-0.2 * (0.5 * (x * x + y * y)).sqrt()).exp()
                - (0.5 * ((TAU * x).cos() + (TAU * y).cos())).exp()
                + E
                + 20.0
        },
    )
}

/// Rosenbrock: a curved, nearly flat valley.
pub fn rosenbrock() -> Result<Landscape, LandscapeError> {
    Landscape::new(
        "rosenbrock",
        "Long banana-shaped valley; easy to find, slow to follow.",
        Bounds::new(-2.0, 2.0, -1.0, 3.0),
        GlobalMinimum {
            x: 1.0,
            y: 1.0,
            value: 0.0,
        },
        |x, y| (1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2),
    )
}

/// Six-hump camel: two global and four local minima.
pub fn six_hump_camel() -> Result<Landscape, LandscapeError> {
    Landscape::new(
        "six_hump_camel",
        "Six basins of differing depth; two mirror-image global minima.",
        Bounds::new(-3.0, 3.0, -2.0, 2.0),
        GlobalMinimum {
            x: 0.0898,
            y: -0.7126,
            value: -1.0316,
        },
        |x, y| {
            let x2 = x * x;
            (4.0 - 2.1 * x2 + x2 * x2 / 3.0) * x2 + x * y + (-4.0 + 4.0 * y * y) * y * y
        },
    )
}
