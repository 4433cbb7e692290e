use crate::{Agent, Landscape, SimulationError};

/// Probe `+x, -x, +y, -y` at distance `step_size` and keep the running best.
///
/// A candidate replaces the running best only when strictly lower, so an
/// earlier improving direction wins ties and a flat neighbourhood leaves the
/// agent in place.
pub(super) fn climb(
    agent: &Agent,
    landscape: &Landscape,
    step_size: f64,
) -> Result<Agent, SimulationError> {
    let directions = [
        (step_size, 0.0),
        (-step_size, 0.0),
        (0.0, step_size),
        (0.0, -step_size),
    ];

    let mut best = *agent;
    for (dx, dy) in directions {
        let candidate = Agent::evaluate(landscape, agent.x + dx, agent.y + dy)?;
        if candidate.improves_on(&best) {
            best = candidate;
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, GlobalMinimum};

    fn landscape<F>(cost: F) -> Landscape
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Landscape::new(
            "test",
            "",
            Bounds::symmetric(5.0),
            GlobalMinimum {
                x: 0.0,
                y: 0.0,
                value: 0.0,
            },
            cost,
        )
        .expect("landscape")
    }

    #[test]
    fn bowl_regression_moves_along_negative_x() {
        let bowl = landscape(|x, y| x * x + y * y);
        let start = Agent::evaluate(&bowl, 1.0, 1.0).expect("agent");
        let next = climb(&start, &bowl, 0.1).expect("climb");
        assert!((next.x - 0.9).abs() < 1e-12);
        assert_eq!(next.y, 1.0);
        assert!((next.value - 1.81).abs() < 1e-12);
    }

    #[test]
    fn later_direction_must_beat_earlier_improvement() {
        // -x improves to 0.5, +y improves further to 0.25; +y must win
        let surface = landscape(|x, y| {
            if x < 0.0 {
                0.5
            } else if y > 0.0 {
                0.25
            } else {
                1.0
            }
        });
        let start = Agent::evaluate(&surface, 0.0, 0.0).expect("agent");
        let next = climb(&start, &surface, 1.0).expect("climb");
        assert_eq!((next.x, next.y, next.value), (0.0, 1.0, 0.25));
    }

    #[test]
    fn equal_later_direction_does_not_displace_earlier() {
        // -x and -y both reach 0.5; -x comes first and is kept
        let surface = landscape(|x, y| if x < 0.0 || y < 0.0 { 0.5 } else { 1.0 });
        let start = Agent::evaluate(&surface, 0.0, 0.0).expect("agent");
        let next = climb(&start, &surface, 1.0).expect("climb");
        assert_eq!((next.x, next.y), (-1.0, 0.0));
    }

    #[test]
    fn flat_neighbourhood_stays_put() {
        let flat = landscape(|_, _| 3.0);
        let start = Agent::evaluate(&flat, 1.5, -2.0).expect("agent");
        assert_eq!(climb(&start, &flat, 0.5).expect("climb"), start);
    }

    #[test]
    fn moves_are_clamped_at_the_edge() {
        let slope = landscape(|x, _| x);
        let start = Agent::evaluate(&slope, -4.95, 0.0).expect("agent");
        let next = climb(&start, &slope, 0.5).expect("climb");
        assert_eq!(next.x, -5.0);
        assert_eq!(next.value, -5.0);
    }
}
