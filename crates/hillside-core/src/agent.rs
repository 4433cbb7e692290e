//! Candidate solutions: a position with its cached cost.

use ordered_float::OrderedFloat;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{Landscape, SimulationError};

/// Immutable point on a landscape together with `value = f(x, y)`.
///
/// Agents are never edited in place; moving produces a new agent through
/// [`Agent::evaluate`], which keeps `value` consistent with the position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Agent {
    /// Clamp `(x, y)` into the landscape domain and evaluate the cost there.
    pub fn evaluate(landscape: &Landscape, x: f64, y: f64) -> Result<Self, SimulationError> {
        let (x, y) = landscape.bounds().clamp(x, y);
        let value = landscape.evaluate(x, y);
        if !value.is_finite() {
            return Err(SimulationError::NonFiniteCost { x, y, value });
        }
        Ok(Self { x, y, value })
    }

    /// Draw a position uniformly from the landscape domain.
    pub fn random(landscape: &Landscape, rng: &mut dyn RngCore) -> Result<Self, SimulationError> {
        let bounds = landscape.bounds();
        let x = rng.random_range(bounds.min_x..=bounds.max_x);
        let y = rng.random_range(bounds.min_y..=bounds.max_y);
        Self::evaluate(landscape, x, y)
    }

    /// Sort key for minimisation: lower value ranks first.
    #[must_use]
    pub fn cost_key(&self) -> OrderedFloat<f64> {
        OrderedFloat(self.value)
    }

    /// Returns true if `self` is strictly better (lower cost) than `other`.
    #[must_use]
    pub fn improves_on(&self, other: &Agent) -> bool {
        self.value < other.value
    }
}

/// Draw `count` independent uniform agents. No ordering is guaranteed.
pub fn random_population(
    landscape: &Landscape,
    count: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Agent>, SimulationError> {
    (0..count).map(|_| Agent::random(landscape, rng)).collect()
}

/// Stable ascending sort by cost (best first).
pub fn sort_by_cost(agents: &mut [Agent]) {
    agents.sort_by_key(Agent::cost_key);
}

/// Lowest-cost agent of a population, first occurrence on ties.
#[must_use]
pub fn best_of(agents: &[Agent]) -> Option<Agent> {
    agents.iter().copied().min_by_key(Agent::cost_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, GlobalMinimum};
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

    #[test]
    fn evaluate_clamps_before_calling_cost() {
        let landscape = Landscape::new(
            "guarded",
            "",
            Bounds::symmetric(1.0),
            GlobalMinimum {
                x: 0.0,
                y: 0.0,
                value: 0.0,
            },
            |x: f64, y: f64| {
                assert!(x.abs() <= 1.0 && y.abs() <= 1.0, "evaluated outside domain");
                x + y
            },
        )
        .expect("landscape");
        let agent = Agent::evaluate(&landscape, 3.0, -4.0).expect("agent");
        assert_eq!((agent.x, agent.y, agent.value), (1.0, -1.0, 0.0));
    }

    #[test]
    fn non_finite_cost_is_reported() {
        let landscape = Landscape::new(
            "hole",
            "",
            Bounds::symmetric(1.0),
            GlobalMinimum {
                x: 0.0,
                y: 0.0,
                value: 0.0,
            },
            |x, _| if x > 0.5 { f64::NAN } else { x },
        )
        .expect("landscape");
        let err = Agent::evaluate(&landscape, 0.75, 0.0).unwrap_err();
        assert!(matches!(err, SimulationError::NonFiniteCost { x, .. } if x == 0.75));
    }

    #[test]
    fn random_population_stays_in_bounds() {
        let landscape = bowl();
        let mut rng = SmallRng::seed_from_u64(7);
        let agents = random_population(&landscape, 64, &mut rng).expect("population");
        assert_eq!(agents.len(), 64);
        assert!(agents.iter().all(|a| landscape.bounds().contains(a.x, a.y)));
        assert!(agents.iter().all(|a| a.value == a.x * a.x + a.y * a.y));
    }

    #[test]
    fn sort_and_best_agree() {
        let landscape = bowl();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut agents = random_population(&landscape, 16, &mut rng).expect("population");
        let best = best_of(&agents).expect("best");
        sort_by_cost(&mut agents);
        assert_eq!(agents[0], best);
        assert!(agents.windows(2).all(|w| w[0].value <= w[1].value));
    }
}
