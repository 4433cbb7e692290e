//! Cost surfaces over a bounded 2D domain.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::LandscapeError;

/// Widest range any uniform draw may cover; leaves the sampler room to scale.
pub(crate) const MAX_SPAN: f64 = f64::MAX / 2.0;

/// Shared handle to a pure cost function `f(x, y) -> z`.
pub type CostFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Closed rectangular domain `[min_x, max_x] x [min_y, max_y]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Construct bounds without validation; see [`Bounds::validate`].
    #[must_use]
    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Square domain `[-half, half]` on both axes.
    #[must_use]
    pub const fn symmetric(half: f64) -> Self {
        Self::new(-half, half, -half, half)
    }

    pub fn validate(&self) -> Result<(), LandscapeError> {
        check_axis("x", self.min_x, self.max_x)?;
        check_axis("y", self.min_y, self.max_y)
    }

    /// Clamp a point into the domain.
    #[must_use]
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(self.min_x, self.max_x), y.clamp(self.min_y, self.max_y))
    }

    /// Returns true if the point lies inside the closed rectangle.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

fn check_axis(axis: &'static str, min: f64, max: f64) -> Result<(), LandscapeError> {
    if !min.is_finite() || !max.is_finite() || min >= max || max - min > MAX_SPAN {
        return Err(LandscapeError::InvalidBounds { axis, min, max });
    }
    Ok(())
}

/// Known optimum of a landscape. Informational only; search never reads it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GlobalMinimum {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Immutable named cost surface.
///
/// The cost function must be pure and total over [`Landscape::bounds`]. The
/// engine clamps every position before evaluating, so it is never called
/// outside the domain.
#[derive(Clone)]
pub struct Landscape {
    name: String,
    description: String,
    bounds: Bounds,
    global_min: GlobalMinimum,
    cost: CostFn,
}

impl fmt::Debug for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Landscape")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("global_min", &self.global_min)
            .finish_non_exhaustive()
    }
}

impl Landscape {
    /// Build a landscape, rejecting degenerate or non-finite bounds.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        bounds: Bounds,
        global_min: GlobalMinimum,
        cost: F,
    ) -> Result<Self, LandscapeError>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        bounds.validate()?;
        Ok(Self {
            name: name.into(),
            description: description.into(),
            bounds,
            global_min,
            cost: Arc::new(cost),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub const fn global_min(&self) -> GlobalMinimum {
        self.global_min
    }

    /// Raw evaluation. Callers are responsible for staying inside the bounds.
    #[must_use]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        (self.cost)(x, y)
    }
}
