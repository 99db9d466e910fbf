//! Orbit-Switch Policy Tests
//!
//! Critical invariants tested:
//! - Walk branch thresholds match the boundary-aware table exactly
//! - Branch probabilities at any position sum to 1
//! - Every target lands in [1, N]; a clamp onto the current orbit holds
//! - Travel time is distance over effective speed

use glam::{DVec2, DVec3};
use orbit_patrol_core::policy::epsilon::{WalkProbabilities, WalkStep};
use orbit_patrol_core::policy::{
    build_policy, flight_target, EpsilonPolicy, RadialDirection, SemiRandomPolicy, SwitchContext,
    SwitchDecision, SwitchMode, SwitchPolicy,
};
use orbit_patrol_core::rng::DrawStreams;
use orbit_patrol_core::{PatrolConfig, SwitchTrigger};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// N = 4 rings of 50 m, radial velocity 10 m/s
fn ctx_at(radius: f64) -> SwitchContext {
    SwitchContext::new(DVec3::new(radius, 0.0, 0.0), DVec2::ZERO, 50.0, 200.0, 10.0)
}

fn decide(policy: &mut dyn SwitchPolicy, ctx: &SwitchContext, coin: f64, rand: f64) -> SwitchDecision {
    let mut streams = DrawStreams::replay([coin], [rand]);
    policy.decide(ctx, &mut streams)
}

fn expect_transit(decision: SwitchDecision) -> orbit_patrol_core::policy::Transit {
    match decision {
        SwitchDecision::Transit(transit) => transit,
        other => panic!("expected a transit, got {:?}", other),
    }
}

// ============================================================================
// Epsilon policy: walk
// ============================================================================

#[test]
fn test_outer_boundary_walk_moves_two_rings_at_double_speed() {
    let ctx = ctx_at(200.0);
    assert_eq!(ctx.orbit_index, 4);
    assert!(ctx.at_outer_boundary());

    let mut policy = EpsilonPolicy::new(0.99);
    let transit = expect_transit(decide(&mut policy, &ctx, 0.5, 0.1));

    assert_eq!(transit.mode, SwitchMode::Walk);
    assert_eq!(transit.from_orbit, 4);
    assert_eq!(transit.to_orbit, 2);
    assert_eq!(transit.direction, RadialDirection::Inward);
    assert_eq!(transit.speed, 20.0);
    assert_eq!(transit.travel_time, 100.0 / 20.0);
}

#[test]
fn test_outer_boundary_thresholds_are_inclusive() {
    let ctx = ctx_at(200.0);
    // 1/2 - 1/4 = 0.25 and 1 - 1.5/4 = 0.625
    assert_eq!(
        WalkStep::choose(&ctx, 0.25),
        WalkStep::Inward {
            steps: 2,
            speed_factor: 2.0
        }
    );
    assert_eq!(
        WalkStep::choose(&ctx, 0.625),
        WalkStep::Inward {
            steps: 1,
            speed_factor: 1.0
        }
    );
    assert_eq!(WalkStep::choose(&ctx, 0.626), WalkStep::Stay);
}

#[test]
fn test_inner_ring_walks_outward_or_stays() {
    let ctx = ctx_at(50.0);
    assert!(ctx.at_inner_boundary());
    assert_eq!(WalkStep::choose(&ctx, 0.5), WalkStep::Outward);
    assert_eq!(WalkStep::choose(&ctx, 0.51), WalkStep::Stay);

    let mut policy = EpsilonPolicy::new(0.99);
    let transit = expect_transit(decide(&mut policy, &ctx, 0.0, 0.2));
    assert_eq!(transit.to_orbit, 2);
    assert_eq!(transit.direction, RadialDirection::Outward);
    assert_eq!(transit.travel_time, 5.0);
}

#[test]
fn test_interior_ring_thresholds() {
    // Ring 2 of 4 is interior: out <= 0.5, in <= 1 - 1/4, else stay
    let ctx = ctx_at(100.0);
    assert!(!ctx.at_inner_boundary() && !ctx.at_outer_boundary());
    assert_eq!(WalkStep::choose(&ctx, 0.5), WalkStep::Outward);
    assert_eq!(
        WalkStep::choose(&ctx, 0.75),
        WalkStep::Inward {
            steps: 1,
            speed_factor: 1.0
        }
    );
    assert_eq!(WalkStep::choose(&ctx, 0.76), WalkStep::Stay);
}

#[test]
fn test_stay_is_a_hold_decision() {
    let ctx = ctx_at(100.0);
    let mut policy = EpsilonPolicy::new(0.99);
    match decide(&mut policy, &ctx, 0.3, 0.9) {
        SwitchDecision::Hold {
            mode,
            orbit,
            hold_time,
        } => {
            assert_eq!(mode, SwitchMode::Walk);
            assert_eq!(orbit, 2);
            assert_eq!(hold_time, 5.0);
        }
        other => panic!("expected a hold, got {:?}", other),
    }
}

#[test]
fn test_double_step_clamps_on_two_ring_field() {
    // N = 2: two rings inward from ring 2 clamps to ring 1
    let ctx = SwitchContext::new(DVec3::new(100.0, 0.0, 0.0), DVec2::ZERO, 50.0, 100.0, 10.0);
    assert!(ctx.at_outer_boundary());
    // 1/2 - 1/2 = 0: only a zero draw takes the double step
    let step = WalkStep::choose(&ctx, 0.0);
    assert_eq!(
        step,
        WalkStep::Inward {
            steps: 2,
            speed_factor: 2.0
        }
    );
    let transit = expect_transit(step.into_decision(&ctx));
    assert_eq!(transit.to_orbit, 1);
    assert_eq!(transit.speed, 20.0);
}

#[test]
fn test_walk_probabilities_sum_to_one() {
    for radius in [50.0, 100.0, 150.0, 200.0] {
        let probabilities = WalkProbabilities::at(&ctx_at(radius));
        assert!((probabilities.total() - 1.0).abs() < 1e-12, "radius {}", radius);
    }

    let outer = WalkProbabilities::at(&ctx_at(200.0));
    assert_eq!(outer.inward_two, 0.25);
    assert_eq!(outer.inward_one, 0.375);
    assert_eq!(outer.stay, 0.375);
}

// ============================================================================
// Epsilon policy: flight
// ============================================================================

#[test]
fn test_coin_at_epsilon_flies() {
    let ctx = ctx_at(100.0);
    let mut policy = EpsilonPolicy::new(0.99);
    // floor(0.8 / 0.25) + 1 = 4
    let transit = expect_transit(decide(&mut policy, &ctx, 0.99, 0.8));
    assert_eq!(transit.mode, SwitchMode::Flight);
    assert_eq!(transit.to_orbit, 4);
    assert_eq!(transit.speed, 10.0);
    assert_eq!(transit.travel_time, 10.0);
}

#[test]
fn test_flight_onto_current_orbit_holds() {
    let ctx = ctx_at(100.0);
    let mut policy = EpsilonPolicy::new(0.0);
    let decision = decide(&mut policy, &ctx, 0.4, 0.3);
    assert!(decision.is_hold());
    assert_eq!(decision.mode(), SwitchMode::Flight);
}

#[test]
fn test_flight_target_table() {
    assert_eq!(flight_target(0.0, 4.0), 1);
    assert_eq!(flight_target(0.24, 4.0), 1);
    assert_eq!(flight_target(0.25, 4.0), 2);
    assert_eq!(flight_target(0.99, 4.0), 4);
    // A draw of exactly 1 would land past the last ring
    assert_eq!(flight_target(1.0, 4.0), 4);
    // Fractional ring counts keep only whole rings
    assert_eq!(flight_target(0.99, 4.5), 4);
}

// ============================================================================
// Semi-random policy
// ============================================================================

#[test]
fn test_semi_random_walk_is_a_fair_coin_inside() {
    let ctx = ctx_at(100.0);
    let mut policy = SemiRandomPolicy::new(SwitchMode::Walk);
    assert_eq!(expect_transit(decide(&mut policy, &ctx, 0.0, 0.5)).to_orbit, 3);
    assert_eq!(expect_transit(decide(&mut policy, &ctx, 0.0, 0.49)).to_orbit, 1);
}

#[test]
fn test_semi_random_walk_is_forced_at_boundaries() {
    let mut policy = SemiRandomPolicy::new(SwitchMode::Walk);
    let mut streams = DrawStreams::replay(Vec::new(), Vec::new());
    let outer = expect_transit(policy.decide(&ctx_at(200.0), &mut streams));
    let inner = expect_transit(policy.decide(&ctx_at(50.0), &mut streams));
    assert_eq!(outer.to_orbit, 3);
    assert_eq!(inner.to_orbit, 2);
}

#[test]
fn test_semi_random_flight_never_reads_mode_stream() {
    let ctx = ctx_at(50.0);
    let mut policy = SemiRandomPolicy::new(SwitchMode::Flight);
    let mut streams = DrawStreams::replay(Vec::new(), [0.6]);
    let transit = expect_transit(policy.decide(&ctx, &mut streams));
    assert_eq!(transit.mode, SwitchMode::Flight);
    assert_eq!(transit.to_orbit, 3);
}

#[test]
fn test_build_policy_follows_config() {
    assert_eq!(build_policy(&PatrolConfig::default()).name(), "epsilon_mix");
    let config = PatrolConfig::semi_random(SwitchMode::Flight, 4);
    assert_eq!(config.trigger, SwitchTrigger::ExchangePoints { count: 4 });
    assert_eq!(build_policy(&config).name(), "semi_random_flight");
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_epsilon_targets_stay_in_range(
        ring in 1i64..=8,
        offset in -10.0f64..10.0,
        coin in 0.0f64..1.0,
        rand in 0.0f64..1.0,
        epsilon in 0.0f64..=1.0,
    ) {
        let spacing = 75.0;
        let ctx = SwitchContext::new(
            DVec3::new(ring as f64 * spacing + offset, 0.0, 0.0),
            DVec2::ZERO,
            spacing,
            600.0,
            10.0,
        );
        let mut policy = EpsilonPolicy::new(epsilon);
        match decide(&mut policy, &ctx, coin, rand) {
            SwitchDecision::Transit(transit) => {
                prop_assert!((1..=8).contains(&transit.to_orbit));
                prop_assert_ne!(transit.to_orbit, ctx.orbit_index);
                let distance = (ctx.radius - transit.to_orbit as f64 * spacing).abs();
                prop_assert!((transit.travel_time - distance / transit.speed).abs() < 1e-9);
            }
            SwitchDecision::Hold { orbit, .. } => prop_assert_eq!(orbit, ctx.orbit_index),
        }
    }

    #[test]
    fn prop_walk_probabilities_sum_to_one(ring in 1i64..=12, rings in 2u32..=12) {
        let spacing = 50.0;
        let ring = ring.min(rings as i64);
        let ctx = SwitchContext::new(
            DVec3::new(0.0, ring as f64 * spacing, 0.0),
            DVec2::ZERO,
            spacing,
            rings as f64 * spacing,
            10.0,
        );
        prop_assert!((WalkProbabilities::at(&ctx).total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prop_flight_target_in_range(rand in 0.0f64..=1.0, rings in 1.0f64..40.0) {
        let target = flight_target(rand, rings);
        prop_assert!(target >= 1);
        prop_assert!(target <= rings.floor() as i64);
    }
}
