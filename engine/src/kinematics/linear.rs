//! Constant velocity integrator used for radial transits between orbits

use crate::core::time::SimTime;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Straight-line motion at a constant velocity
///
/// # Example
/// ```
/// use glam::DVec3;
/// use orbit_patrol_core::kinematics::LinearIntegrator;
/// use orbit_patrol_core::SimTime;
///
/// let mut helper = LinearIntegrator::new();
/// helper.set_position(DVec3::new(1.0, 2.0, 0.0), SimTime::ZERO);
/// helper.set_velocity(DVec3::new(10.0, 0.0, 0.0), SimTime::ZERO);
/// helper.unpause();
/// helper.update(SimTime::from_millis(500));
/// assert_eq!(helper.position(), DVec3::new(6.0, 2.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearIntegrator {
    position: DVec3,
    velocity: DVec3,
    last_update: SimTime,
    paused: bool,
}

impl Default for LinearIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearIntegrator {
    /// Create a paused integrator at the origin
    pub fn new() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            last_update: SimTime::ZERO,
            paused: true,
        }
    }

    /// Place the point and zero its velocity
    pub fn set_position(&mut self, position: DVec3, now: SimTime) {
        self.position = position;
        self.velocity = DVec3::ZERO;
        self.last_update = now;
    }

    pub fn set_velocity(&mut self, velocity: DVec3, now: SimTime) {
        self.velocity = velocity;
        self.last_update = now;
    }

    /// Advance to `now`; moves the point only while unpaused
    ///
    /// # Panics
    /// Panics if `now` is earlier than the last update
    pub fn update(&mut self, now: SimTime) {
        assert!(
            now >= self.last_update,
            "linear integrator moved backwards in time: last update {}, now {}",
            self.last_update,
            now
        );
        let elapsed = now.seconds_since(self.last_update);
        self.last_update = now;
        if self.paused {
            return;
        }
        self.position += self.velocity * elapsed;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Effective velocity: zero while paused
    pub fn velocity(&self) -> DVec3 {
        if self.paused {
            DVec3::ZERO
        } else {
            self.velocity
        }
    }

    pub fn last_update(&self) -> SimTime {
        self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_does_not_move() {
        let mut helper = LinearIntegrator::new();
        helper.set_position(DVec3::new(1.0, 1.0, 1.0), SimTime::ZERO);
        helper.set_velocity(DVec3::new(5.0, 0.0, 0.0), SimTime::ZERO);
        helper.update(SimTime::from_secs(3));
        assert_eq!(helper.position(), DVec3::new(1.0, 1.0, 1.0));
        assert_eq!(helper.velocity(), DVec3::ZERO);
    }

    #[test]
    fn test_set_position_zeroes_velocity() {
        let mut helper = LinearIntegrator::new();
        helper.set_velocity(DVec3::new(5.0, 0.0, 0.0), SimTime::ZERO);
        helper.unpause();
        helper.set_position(DVec3::ZERO, SimTime::from_secs(1));
        assert_eq!(helper.velocity(), DVec3::ZERO);
    }

    #[test]
    #[should_panic(expected = "moved backwards in time")]
    fn test_negative_elapsed_panics() {
        let mut helper = LinearIntegrator::new();
        helper.set_position(DVec3::ZERO, SimTime::from_secs(2));
        helper.update(SimTime::from_secs(1));
    }
}
