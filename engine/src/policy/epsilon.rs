//! Epsilon-mixed walk/flight policy
//!
//! Each decision flips a coin on the mode stream. With probability
//! `1 - epsilon` the patrol flies to a uniformly chosen orbit; otherwise it
//! walks to a neighbouring ring with boundary-aware probabilities:
//!
//! | Position | Move | Probability |
//! |---|---|---|
//! | outer ring | inward 2 (double speed) | `1/2 - 1/N` |
//! | outer ring | inward 1 | `1/2 - 1/(2N)` |
//! | outer ring | stay | `3/(2N)` |
//! | inner ring | outward 1 | `1/2` |
//! | inner ring | stay | `1/2` |
//! | orbit `i` | outward 1 | `1/2` |
//! | orbit `i` | inward 1 | `1/2 - 1/(2i)` |
//! | orbit `i` | stay | `1/(2i)` |

use super::{flight_target, SwitchContext, SwitchDecision, SwitchMode, SwitchPolicy};
use crate::rng::DrawStreams;

/// Baseline walk/flight mixing policy
///
/// # Example
///
/// ```
/// use glam::{DVec2, DVec3};
/// use orbit_patrol_core::policy::{EpsilonPolicy, SwitchContext, SwitchDecision, SwitchPolicy};
/// use orbit_patrol_core::rng::DrawStreams;
///
/// let mut policy = EpsilonPolicy::new(0.99);
/// let ctx = SwitchContext::new(DVec3::new(200.0, 0.0, 0.0), DVec2::ZERO, 50.0, 200.0, 10.0);
/// // coin 0.5 < epsilon -> walk; 0.1 <= 1/2 - 1/4 -> two rings inward
/// let mut streams = DrawStreams::replay([0.5], [0.1]);
///
/// match policy.decide(&ctx, &mut streams) {
///     SwitchDecision::Transit(t) => assert_eq!(t.to_orbit, 2),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EpsilonPolicy {
    epsilon: f64,
}

impl EpsilonPolicy {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl SwitchPolicy for EpsilonPolicy {
    fn name(&self) -> &'static str {
        "epsilon_mix"
    }

    fn decide(&mut self, ctx: &SwitchContext, streams: &mut DrawStreams) -> SwitchDecision {
        let coin_flip = streams.mode.draw(0.0, 1.0);
        let rand = streams.target.draw(0.0, 1.0);

        if coin_flip >= self.epsilon {
            tracing::debug!(coin_flip, rand, orbit = ctx.orbit_index, "flight mode");
            ctx.transit_to(SwitchMode::Flight, flight_target(rand, ctx.orbit_count), 1.0)
        } else {
            tracing::debug!(coin_flip, rand, orbit = ctx.orbit_index, "walk mode");
            WalkStep::choose(ctx, rand).into_decision(ctx)
        }
    }
}

/// A single walk move relative to the current orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkStep {
    /// Move `steps` rings inward at `speed_factor` times the radial velocity
    Inward { steps: i64, speed_factor: f64 },
    Outward,
    Stay,
}

impl WalkStep {
    /// Pick the walk move for a uniform draw `rand` in `[0, 1)`
    pub fn choose(ctx: &SwitchContext, rand: f64) -> Self {
        let n = ctx.orbit_count;
        if ctx.at_outer_boundary() {
            if rand <= 0.5 - 1.0 / n {
                WalkStep::Inward {
                    steps: 2,
                    speed_factor: 2.0,
                }
            } else if rand <= 1.0 - 1.5 / n {
                WalkStep::Inward {
                    steps: 1,
                    speed_factor: 1.0,
                }
            } else {
                WalkStep::Stay
            }
        } else if ctx.at_inner_boundary() {
            if rand <= 0.5 {
                WalkStep::Outward
            } else {
                WalkStep::Stay
            }
        } else if rand <= 0.5 {
            WalkStep::Outward
        } else if rand <= 1.0 - 0.5 / ctx.orbit_index as f64 {
            WalkStep::Inward {
                steps: 1,
                speed_factor: 1.0,
            }
        } else {
            WalkStep::Stay
        }
    }

    pub fn into_decision(self, ctx: &SwitchContext) -> SwitchDecision {
        match self {
            WalkStep::Inward {
                steps,
                speed_factor,
            } => ctx.transit_to(SwitchMode::Walk, ctx.orbit_index - steps, speed_factor),
            WalkStep::Outward => ctx.transit_to(SwitchMode::Walk, ctx.orbit_index + 1, 1.0),
            WalkStep::Stay => ctx.hold(SwitchMode::Walk),
        }
    }
}

/// Probability of each walk branch from a given position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WalkProbabilities {
    pub inward_two: f64,
    pub inward_one: f64,
    pub outward: f64,
    pub stay: f64,
}

impl WalkProbabilities {
    /// Branch probabilities implied by the thresholds in [`WalkStep::choose`]
    pub fn at(ctx: &SwitchContext) -> Self {
        let n = ctx.orbit_count;
        if ctx.at_outer_boundary() {
            let two = 0.5 - 1.0 / n;
            let one_upper = 1.0 - 1.5 / n;
            Self {
                inward_two: two,
                inward_one: one_upper - two,
                outward: 0.0,
                stay: 1.0 - one_upper,
            }
        } else if ctx.at_inner_boundary() {
            Self {
                outward: 0.5,
                stay: 0.5,
                ..Self::default()
            }
        } else {
            let inward_upper = 1.0 - 0.5 / ctx.orbit_index as f64;
            Self {
                outward: 0.5,
                inward_one: inward_upper - 0.5,
                stay: 1.0 - inward_upper,
                ..Self::default()
            }
        }
    }

    pub fn total(&self) -> f64 {
        self.inward_two + self.inward_one + self.outward + self.stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{RadialDirection, SwitchDecision};
    use glam::{DVec2, DVec3};

    fn ctx_at(radius: f64) -> SwitchContext {
        SwitchContext::new(DVec3::new(0.0, radius, 0.0), DVec2::ZERO, 50.0, 200.0, 10.0)
    }

    #[test]
    fn test_outer_boundary_double_step() {
        let ctx = ctx_at(200.0);
        assert_eq!(
            WalkStep::choose(&ctx, 0.1),
            WalkStep::Inward {
                steps: 2,
                speed_factor: 2.0
            }
        );
        match WalkStep::choose(&ctx, 0.1).into_decision(&ctx) {
            SwitchDecision::Transit(t) => {
                assert_eq!(t.to_orbit, 2);
                assert_eq!(t.speed, 20.0);
                assert_eq!(t.travel_time, 5.0);
                assert_eq!(t.direction, RadialDirection::Inward);
            }
            other => panic!("expected transit, got {:?}", other),
        }
    }

    #[test]
    fn test_outer_boundary_single_step_and_stay() {
        let ctx = ctx_at(200.0);
        // 1 - 1.5/4 = 0.625
        assert_eq!(
            WalkStep::choose(&ctx, 0.6),
            WalkStep::Inward {
                steps: 1,
                speed_factor: 1.0
            }
        );
        assert_eq!(WalkStep::choose(&ctx, 0.7), WalkStep::Stay);
    }

    #[test]
    fn test_inner_boundary_moves_out_or_stays() {
        let ctx = ctx_at(50.0);
        assert_eq!(WalkStep::choose(&ctx, 0.5), WalkStep::Outward);
        assert_eq!(WalkStep::choose(&ctx, 0.51), WalkStep::Stay);
    }

    #[test]
    fn test_interior_branches() {
        let ctx = ctx_at(100.0);
        // orbit 2: inward while rand <= 0.75
        assert_eq!(WalkStep::choose(&ctx, 0.2), WalkStep::Outward);
        assert_eq!(
            WalkStep::choose(&ctx, 0.75),
            WalkStep::Inward {
                steps: 1,
                speed_factor: 1.0
            }
        );
        assert_eq!(WalkStep::choose(&ctx, 0.8), WalkStep::Stay);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        for radius in [50.0, 100.0, 150.0, 200.0] {
            let total = WalkProbabilities::at(&ctx_at(radius)).total();
            assert!((total - 1.0).abs() < 1e-12, "radius {}: {}", radius, total);
        }
    }

    #[test]
    fn test_flight_selected_when_coin_reaches_epsilon() {
        let mut policy = EpsilonPolicy::new(0.5);
        let ctx = ctx_at(100.0);
        let mut streams = DrawStreams::replay([0.5], [0.9]);
        match policy.decide(&ctx, &mut streams) {
            SwitchDecision::Transit(t) => {
                assert_eq!(t.mode, SwitchMode::Flight);
                assert_eq!(t.to_orbit, 4);
                assert_eq!(t.travel_time, 10.0);
            }
            other => panic!("expected flight transit, got {:?}", other),
        }
    }

    #[test]
    fn test_flight_to_same_orbit_holds() {
        let mut policy = EpsilonPolicy::new(0.0);
        let ctx = ctx_at(100.0);
        let mut streams = DrawStreams::replay([0.3], [0.3]);
        let decision = policy.decide(&ctx, &mut streams);
        assert!(decision.is_hold());
        assert_eq!(decision.mode(), SwitchMode::Flight);
    }
}
