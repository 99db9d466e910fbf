//! Patrol configuration
//!
//! One explicit struct enumerates every option a patrol reads at
//! construction. Defaults follow the long-standing model defaults; JSON
//! configs may omit any field.

use super::engine::PatrolError;
use super::trigger::SwitchTrigger;
use crate::core::time::TICK_PERIOD;
use crate::policy::SwitchMode;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Which orbit-switch policy a patrol runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyKind {
    /// Walk/flight mixing driven by `epsilon`
    EpsilonMix,
    /// Fixed walk or flight mode
    SemiRandom { mode: SwitchMode },
}

/// Complete patrol configuration
///
/// # Fields
///
/// * `tangential_velocity` - speed along an orbit (m/s)
/// * `radial_velocity` - speed of a radial transit between orbits (m/s);
///   one tick at double speed must not cover more than `orbit_spacing`
/// * `center` - shared orbit center
/// * `orbit_spacing` - distance between successive orbits (m)
/// * `max_radius` - radius of the outermost orbit (m)
/// * `dwell_duration` - seconds on an orbit before a switch decision
/// * `epsilon` - probability of walk mode per decision
/// * `trigger` - what ends a dwell
/// * `policy` - which switch policy decides the next orbit
///
/// # Example
/// ```
/// use orbit_patrol_core::PatrolConfig;
///
/// let config = PatrolConfig::from_json(r#"{ "orbit_spacing": 50.0, "max_radius": 200.0 }"#).unwrap();
/// assert_eq!(config.orbit_count(), 4.0);
/// assert_eq!(config.tangential_velocity, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub tangential_velocity: f64,
    pub radial_velocity: f64,
    pub center: DVec2,
    pub orbit_spacing: f64,
    pub max_radius: f64,
    pub dwell_duration: f64,
    pub epsilon: f64,
    pub trigger: SwitchTrigger,
    pub policy: PolicyKind,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            tangential_velocity: 5.0,
            radial_velocity: 10.0,
            center: DVec2::ZERO,
            orbit_spacing: 75.0,
            max_radius: 750.0,
            dwell_duration: 10.0,
            epsilon: 0.99,
            trigger: SwitchTrigger::Dwell,
            policy: PolicyKind::EpsilonMix,
        }
    }
}

impl PatrolConfig {
    /// Semi-random variant: switches at exchange points with a fixed mode
    pub fn semi_random(mode: SwitchMode, exchange_points: u32) -> Self {
        Self {
            trigger: SwitchTrigger::ExchangePoints {
                count: exchange_points,
            },
            policy: PolicyKind::SemiRandom { mode },
            ..Self::default()
        }
    }

    /// Hybrid variant: orbit switching is commanded by the caller
    pub fn hybrid() -> Self {
        Self {
            trigger: SwitchTrigger::External,
            ..Self::default()
        }
    }

    /// Load and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, PatrolError> {
        let config: PatrolConfig = serde_json::from_str(json)
            .map_err(|e| PatrolError::Serialization(format!("Config parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Number of orbits, `max_radius / orbit_spacing`
    pub fn orbit_count(&self) -> f64 {
        self.max_radius / self.orbit_spacing
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<(), PatrolError> {
        let positive = [
            ("tangential_velocity", self.tangential_velocity),
            ("radial_velocity", self.radial_velocity),
            ("orbit_spacing", self.orbit_spacing),
            ("max_radius", self.max_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PatrolError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if !self.center.is_finite() {
            return Err(PatrolError::InvalidConfig(format!(
                "center must be finite, got {}",
                self.center
            )));
        }
        if self.max_radius < self.orbit_spacing {
            return Err(PatrolError::InvalidConfig(format!(
                "max_radius {} is smaller than orbit_spacing {}",
                self.max_radius, self.orbit_spacing
            )));
        }
        // Transits end on tick boundaries, so one tick of the fastest
        // (doubled) radial travel bounds the overshoot past the target ring
        let tick_travel = 2.0 * self.radial_velocity * TICK_PERIOD.as_secs_f64();
        if tick_travel > self.orbit_spacing {
            return Err(PatrolError::InvalidConfig(format!(
                "radial_velocity {} covers {} m per tick at double speed, more than orbit_spacing {}",
                self.radial_velocity, tick_travel, self.orbit_spacing
            )));
        }
        if !(self.dwell_duration.is_finite() && self.dwell_duration >= 0.0) {
            return Err(PatrolError::InvalidConfig(format!(
                "dwell_duration must be non-negative, got {}",
                self.dwell_duration
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(PatrolError::InvalidConfig(format!(
                "epsilon must be within [0, 1], got {}",
                self.epsilon
            )));
        }
        if let SwitchTrigger::ExchangePoints { count: 0 } = self.trigger {
            return Err(PatrolError::InvalidConfig(
                "at least one exchange point is required".to_string(),
            ));
        }
        Ok(())
    }
}
