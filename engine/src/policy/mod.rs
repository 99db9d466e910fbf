//! Orbit-Switch Policy Module
//!
//! When a patrol finishes its dwell on an orbit it asks its policy where to go
//! next. A policy sees the patrol's current orbit and the two injected draw
//! streams and answers with a [`SwitchDecision`]: fly radially to another
//! orbit, or hold the current one for another dwell.
//!
//! # Policy Interface
//!
//! All policies implement the `SwitchPolicy` trait:
//! ```rust
//! use orbit_patrol_core::policy::{SwitchContext, SwitchDecision, SwitchMode, SwitchPolicy};
//! use orbit_patrol_core::rng::DrawStreams;
//!
//! #[derive(Debug)]
//! struct AlwaysHold;
//!
//! impl SwitchPolicy for AlwaysHold {
//!     fn name(&self) -> &'static str {
//!         "always_hold"
//!     }
//!
//!     fn decide(&mut self, ctx: &SwitchContext, _streams: &mut DrawStreams) -> SwitchDecision {
//!         ctx.hold(SwitchMode::Walk)
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **EpsilonPolicy**: walk/flight mixing with probability epsilon (baseline)
//! 2. **SemiRandomPolicy**: fixed walk or flight mode without mixing

use crate::patrol::{PatrolConfig, PolicyKind};
use crate::rng::DrawStreams;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod epsilon;
pub mod semi_random;

pub use epsilon::EpsilonPolicy;
pub use semi_random::SemiRandomPolicy;

/// Strategy deciding the next orbit of a patrol
pub trait SwitchPolicy: fmt::Debug {
    /// Short label used in logs and events
    fn name(&self) -> &'static str;

    /// Decide the next move from the current orbit
    fn decide(&mut self, ctx: &SwitchContext, streams: &mut DrawStreams) -> SwitchDecision;
}

/// Build the policy named by a patrol configuration
pub fn build_policy(config: &PatrolConfig) -> Box<dyn SwitchPolicy> {
    match config.policy {
        PolicyKind::EpsilonMix => Box::new(EpsilonPolicy::new(config.epsilon)),
        PolicyKind::SemiRandom { mode } => Box::new(SemiRandomPolicy::new(mode)),
    }
}

/// Walk (adjacent orbits only) or flight (any orbit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchMode {
    Walk,
    Flight,
}

impl fmt::Display for SwitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchMode::Walk => write!(f, "walk"),
            SwitchMode::Flight => write!(f, "flight"),
        }
    }
}

/// Radial travel direction relative to the orbit center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadialDirection {
    Inward,
    Outward,
}

/// Everything a policy may look at when deciding
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchContext {
    /// Current position of the patrol
    pub position: DVec3,
    /// Shared orbit center
    pub center: DVec2,
    /// Current distance from the center
    pub radius: f64,
    /// `round(radius / orbit_spacing)`
    pub orbit_index: i64,
    /// `max_radius / orbit_spacing`
    pub orbit_count: f64,
    pub orbit_spacing: f64,
    pub max_radius: f64,
    pub radial_velocity: f64,
}

impl SwitchContext {
    pub fn new(
        position: DVec3,
        center: DVec2,
        orbit_spacing: f64,
        max_radius: f64,
        radial_velocity: f64,
    ) -> Self {
        let radius = (position.truncate() - center).length();
        Self {
            position,
            center,
            radius,
            orbit_index: (radius / orbit_spacing).round() as i64,
            orbit_count: max_radius / orbit_spacing,
            orbit_spacing,
            max_radius,
            radial_velocity,
        }
    }

    /// Highest valid orbit index
    pub fn max_orbit(&self) -> i64 {
        (self.orbit_count.floor() as i64).max(1)
    }

    /// On the outermost ring: only inward moves are possible
    pub fn at_outer_boundary(&self) -> bool {
        self.radius >= self.max_radius - self.orbit_spacing
    }

    /// On the innermost ring: only outward moves are possible
    pub fn at_inner_boundary(&self) -> bool {
        self.radius < 1.5 * self.orbit_spacing
    }

    /// Stay on the current orbit for another dwell
    pub fn hold(&self, mode: SwitchMode) -> SwitchDecision {
        SwitchDecision::Hold {
            mode,
            orbit: self.orbit_index,
            hold_time: self.orbit_spacing / self.radial_velocity,
        }
    }

    /// Plan a radial transit to `to_orbit` at `speed_factor` times the radial
    /// velocity
    ///
    /// The target is clamped into `[1, N]`; a target that lands on the
    /// current orbit becomes a hold.
    pub fn transit_to(&self, mode: SwitchMode, to_orbit: i64, speed_factor: f64) -> SwitchDecision {
        let to_orbit = to_orbit.clamp(1, self.max_orbit());
        if to_orbit == self.orbit_index {
            return self.hold(mode);
        }

        let direction = if to_orbit < self.orbit_index {
            RadialDirection::Inward
        } else {
            RadialDirection::Outward
        };
        let speed = self.radial_velocity * speed_factor;
        let target_radius = to_orbit as f64 * self.orbit_spacing;
        SwitchDecision::Transit(Transit {
            mode,
            from_orbit: self.orbit_index,
            to_orbit,
            direction,
            speed,
            travel_time: (self.radius - target_radius).abs() / speed,
        })
    }
}

/// A planned radial transit between two orbits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transit {
    pub mode: SwitchMode,
    pub from_orbit: i64,
    pub to_orbit: i64,
    pub direction: RadialDirection,
    /// Effective radial speed (doubled for the outer-boundary double step)
    pub speed: f64,
    /// Seconds of straight-line flight needed to reach the target orbit
    pub travel_time: f64,
}

impl Transit {
    /// Unit travel direction from `position` (outward: away from the center)
    pub fn travel_vector(&self, position: DVec3, center: DVec2) -> DVec2 {
        let radial = position.truncate() - center;
        match self.direction {
            RadialDirection::Outward => radial,
            RadialDirection::Inward => -radial,
        }
    }

    /// Planar velocity vector of the transit leaving `position`
    pub fn velocity(&self, position: DVec3, center: DVec2) -> DVec3 {
        let heading = crate::core::geometry::heading_of(self.travel_vector(position, center));
        DVec3::new(self.speed * heading.cos(), self.speed * heading.sin(), 0.0)
    }
}

/// Outcome of an orbit-switch decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SwitchDecision {
    /// Leave the current orbit
    Transit(Transit),

    /// Stay on the current orbit
    ///
    /// `hold_time` is the one-orbit travel time the decision was priced at;
    /// the patrol does not wait on it and simply starts a fresh dwell.
    Hold {
        mode: SwitchMode,
        orbit: i64,
        hold_time: f64,
    },
}

impl SwitchDecision {
    pub fn mode(&self) -> SwitchMode {
        match self {
            SwitchDecision::Transit(transit) => transit.mode,
            SwitchDecision::Hold { mode, .. } => *mode,
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, SwitchDecision::Hold { .. })
    }
}

/// Target of a flight: `floor(rand / (1/N)) + 1`, clamped into `[1, N]`
pub fn flight_target(rand: f64, orbit_count: f64) -> i64 {
    let probability_step = 1.0 / orbit_count;
    let target = (rand / probability_step).floor() as i64 + 1;
    target.clamp(1, (orbit_count.floor() as i64).max(1))
}
