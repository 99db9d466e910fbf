//! Semi-random two-mode policy
//!
//! The mode is fixed at construction; there is no epsilon mixing.
//!
//! - **Walk**: forced inward on the outer ring, forced outward on the inner
//!   ring, a fair coin between the two neighbours anywhere else.
//! - **Flight**: a uniformly drawn target orbit, holding when the draw lands
//!   on the current one.
//!
//! Only the target stream is consumed.

use super::{flight_target, SwitchContext, SwitchDecision, SwitchMode, SwitchPolicy};
use crate::rng::DrawStreams;

#[derive(Debug, Clone)]
pub struct SemiRandomPolicy {
    mode: SwitchMode,
}

impl SemiRandomPolicy {
    pub fn new(mode: SwitchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SwitchMode {
        self.mode
    }
}

impl SwitchPolicy for SemiRandomPolicy {
    fn name(&self) -> &'static str {
        match self.mode {
            SwitchMode::Walk => "semi_random_walk",
            SwitchMode::Flight => "semi_random_flight",
        }
    }

    fn decide(&mut self, ctx: &SwitchContext, streams: &mut DrawStreams) -> SwitchDecision {
        match self.mode {
            SwitchMode::Flight => {
                let rand = streams.target.draw(0.0, 1.0);
                ctx.transit_to(SwitchMode::Flight, flight_target(rand, ctx.orbit_count), 1.0)
            }
            SwitchMode::Walk => {
                let to_orbit = if ctx.at_outer_boundary() {
                    ctx.orbit_index - 1
                } else if ctx.at_inner_boundary() {
                    ctx.orbit_index + 1
                } else if streams.target.draw(0.0, 1.0) >= 0.5 {
                    ctx.orbit_index + 1
                } else {
                    ctx.orbit_index - 1
                };
                ctx.transit_to(SwitchMode::Walk, to_orbit, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec2, DVec3};

    fn ctx_at(radius: f64) -> SwitchContext {
        SwitchContext::new(DVec3::new(radius, 0.0, 0.0), DVec2::ZERO, 75.0, 750.0, 10.0)
    }

    fn target_of(decision: SwitchDecision) -> i64 {
        match decision {
            SwitchDecision::Transit(t) => t.to_orbit,
            SwitchDecision::Hold { orbit, .. } => orbit,
        }
    }

    #[test]
    fn test_walk_boundaries_need_no_draw() {
        let mut policy = SemiRandomPolicy::new(SwitchMode::Walk);
        let mut streams = DrawStreams::replay(Vec::new(), Vec::new());
        assert_eq!(target_of(policy.decide(&ctx_at(750.0), &mut streams)), 9);
        assert_eq!(target_of(policy.decide(&ctx_at(75.0), &mut streams)), 2);
    }

    #[test]
    fn test_walk_interior_coin() {
        let mut policy = SemiRandomPolicy::new(SwitchMode::Walk);
        let mut streams = DrawStreams::replay(Vec::new(), [0.7, 0.2]);
        assert_eq!(target_of(policy.decide(&ctx_at(300.0), &mut streams)), 5);
        assert_eq!(target_of(policy.decide(&ctx_at(300.0), &mut streams)), 3);
    }

    #[test]
    fn test_flight_never_draws_mode_stream() {
        let mut policy = SemiRandomPolicy::new(SwitchMode::Flight);
        let mut streams = DrawStreams::replay(Vec::new(), [0.05]);
        let decision = policy.decide(&ctx_at(300.0), &mut streams);
        assert_eq!(target_of(decision), 1);
        assert_eq!(decision.mode(), SwitchMode::Flight);
    }
}
