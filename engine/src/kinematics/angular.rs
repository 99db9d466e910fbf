//! Constant angular velocity integrator
//!
//! Tracks a point rotating about a 2D center. The radius of the point is never
//! changed by `update`: the integrator is a pure rotation, and only a radial
//! transit (driven elsewhere) moves a point between orbits.

use crate::core::geometry::{angle_of, planar_distance};
use crate::core::time::SimTime;
use crate::patrol::PatrolError;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Upper bound on full turns removed from the angle in a single update.
///
/// Exceeding it means the elapsed time or the rate is absurd for a patrol and
/// the integrator refuses to spin on it.
pub const MAX_ANGLE_WRAPS: u32 = 4096;

/// Angular rate as a (magnitude, direction) pair
///
/// `sign` is `+1.0` for counter-clockwise rotation and `-1.0` for clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularRate {
    /// Magnitude in radians per second
    pub magnitude: f64,
    /// Rotation direction, `+1.0` or `-1.0`
    pub sign: f64,
}

impl AngularRate {
    /// "No motion unless reconfigured"
    pub const STILL: AngularRate = AngularRate {
        magnitude: 0.0,
        sign: 1.0,
    };

    pub fn new(magnitude: f64, sign: f64) -> Self {
        Self { magnitude, sign }
    }

    /// Rate that moves a point on an orbit of `radius` at `tangential_velocity`
    ///
    /// The direction alternates between adjacent orbit rings (see
    /// [`rotation_sign`]) so that neighbouring rings always counter-rotate.
    ///
    /// # Errors
    /// Returns [`PatrolError::DegenerateRadius`] when `radius` is zero,
    /// negative or not finite: there is no orbit to rotate on.
    ///
    /// # Example
    /// ```
    /// use orbit_patrol_core::kinematics::AngularRate;
    ///
    /// let rate = AngularRate::for_radius(100.0, 10.0, 50.0).unwrap();
    /// assert_eq!(rate.magnitude, 0.1);
    /// assert_eq!(rate.sign, -1.0); // ring 2 is even
    /// ```
    pub fn for_radius(
        radius: f64,
        tangential_velocity: f64,
        orbit_spacing: f64,
    ) -> Result<Self, PatrolError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PatrolError::DegenerateRadius { radius });
        }
        Ok(Self {
            magnitude: tangential_velocity / radius,
            sign: rotation_sign(radius, orbit_spacing),
        })
    }

    /// Signed angular velocity in radians per second
    pub fn signed(&self) -> f64 {
        self.magnitude * self.sign
    }
}

/// Rotation direction for an orbit of the given radius
///
/// `+1.0` when `fmod(radius / orbit_spacing, 2)` falls in `(0, 1]`, otherwise
/// `-1.0`. Odd rings turn counter-clockwise and even rings clockwise.
pub fn rotation_sign(radius: f64, orbit_spacing: f64) -> f64 {
    let parity = (radius / orbit_spacing) % 2.0;
    if parity > 0.0 && parity <= 1.0 {
        1.0
    } else {
        -1.0
    }
}

/// Integrator for a point rotating about a fixed center
///
/// # Example
/// ```
/// use glam::{DVec2, DVec3};
/// use orbit_patrol_core::kinematics::{AngularIntegrator, AngularRate};
/// use orbit_patrol_core::SimTime;
///
/// let mut helper = AngularIntegrator::new(DVec2::ZERO);
/// helper.set_position(DVec3::new(100.0, 0.0, 0.0), SimTime::ZERO);
/// helper.set_rate(AngularRate::new(0.1, 1.0), SimTime::ZERO);
/// helper.unpause();
///
/// helper.update(SimTime::from_secs(5));
/// assert!((helper.radius() - 100.0).abs() < 1e-9);
/// assert!((helper.angle() - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngularIntegrator {
    center: DVec2,
    rate: AngularRate,
    position: DVec3,
    last_update: SimTime,
    paused: bool,
}

impl AngularIntegrator {
    /// Create a paused integrator sitting on `center`
    pub fn new(center: DVec2) -> Self {
        Self {
            center,
            rate: AngularRate::STILL,
            position: center.extend(0.0),
            last_update: SimTime::ZERO,
            paused: true,
        }
    }

    pub fn set_center(&mut self, center: DVec2, now: SimTime) {
        self.center = center;
        self.last_update = now;
    }

    pub fn set_rate(&mut self, rate: AngularRate, now: SimTime) {
        self.rate = rate;
        self.last_update = now;
    }

    /// Place the point and reset the rate to [`AngularRate::STILL`]
    pub fn set_position(&mut self, position: DVec3, now: SimTime) {
        self.position = position;
        self.rate = AngularRate::STILL;
        self.last_update = now;
    }

    /// Advance the rotation to `now`
    ///
    /// Always restamps the last-update time; moves the point only while
    /// unpaused and only if time actually elapsed.
    ///
    /// # Panics
    /// Panics if `now` is earlier than the last update, or if the new angle
    /// needs more than [`MAX_ANGLE_WRAPS`] full turns removed.
    pub fn update(&mut self, now: SimTime) {
        assert!(
            now >= self.last_update,
            "angular integrator moved backwards in time: last update {}, now {}",
            self.last_update,
            now
        );
        let elapsed = now.seconds_since(self.last_update);
        self.last_update = now;
        if self.paused || elapsed == 0.0 {
            return;
        }

        let radius = self.radius();
        let theta = wrap_angle(self.angle() + elapsed * self.rate.signed());
        self.position.x = self.center.x + radius * theta.cos();
        self.position.y = self.center.y + radius * theta.sin();
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

    /// Distance from the current position to the center
    pub fn radius(&self) -> f64 {
        planar_distance(self.position, self.center)
    }

    /// Angle of the current position about the center, in `[0, 2π)`
    pub fn angle(&self) -> f64 {
        angle_of(self.position, self.center)
    }

    /// Angle of an arbitrary point about this integrator's center
    pub fn angle_of(&self, point: DVec3) -> f64 {
        angle_of(point, self.center)
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    /// Effective rate: [`AngularRate::STILL`] while paused
    pub fn rate(&self) -> AngularRate {
        if self.paused {
            AngularRate::STILL
        } else {
            self.rate
        }
    }

    /// Configured rate regardless of the paused flag
    pub fn configured_rate(&self) -> AngularRate {
        self.rate
    }

    pub fn last_update(&self) -> SimTime {
        self.last_update
    }
}

fn wrap_angle(mut theta: f64) -> f64 {
    let mut wraps = 0u32;
    while theta >= TAU {
        theta -= TAU;
        wraps += 1;
        assert!(
            wraps <= MAX_ANGLE_WRAPS,
            "angle wrap did not converge after {} turns; rate or elapsed time is out of range",
            MAX_ANGLE_WRAPS
        );
    }
    while theta < 0.0 {
        theta += TAU;
        wraps += 1;
        assert!(
            wraps <= MAX_ANGLE_WRAPS,
            "angle wrap did not converge after {} turns; rate or elapsed time is out of range",
            MAX_ANGLE_WRAPS
        );
    }
    theta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotating(position: DVec3, rate: AngularRate) -> AngularIntegrator {
        let mut helper = AngularIntegrator::new(DVec2::ZERO);
        helper.set_position(position, SimTime::ZERO);
        helper.set_rate(rate, SimTime::ZERO);
        helper.unpause();
        helper
    }

    #[test]
    fn test_parity_alternates_between_rings() {
        assert_eq!(rotation_sign(50.0, 50.0), 1.0);
        assert_eq!(rotation_sign(100.0, 50.0), -1.0);
        assert_eq!(rotation_sign(150.0, 50.0), 1.0);
        assert_eq!(rotation_sign(200.0, 50.0), -1.0);
    }

    #[test]
    fn test_parity_inside_ring_intervals() {
        // (0, 1] -> +1, (1, 2) and 0 -> -1
        assert_eq!(rotation_sign(25.0, 50.0), 1.0);
        assert_eq!(rotation_sign(75.0, 50.0), -1.0);
        assert_eq!(rotation_sign(0.0, 50.0), -1.0);
    }

    #[test]
    fn test_zero_radius_rate_rejected() {
        let err = AngularRate::for_radius(0.0, 10.0, 50.0).unwrap_err();
        assert!(matches!(err, PatrolError::DegenerateRadius { .. }));
        assert!(AngularRate::for_radius(-5.0, 10.0, 50.0).is_err());
        assert!(AngularRate::for_radius(f64::NAN, 10.0, 50.0).is_err());
    }

    #[test]
    fn test_set_position_resets_rate() {
        let mut helper = rotating(DVec3::new(10.0, 0.0, 0.0), AngularRate::new(1.0, -1.0));
        helper.set_position(DVec3::new(0.0, 20.0, 0.0), SimTime::from_secs(1));
        assert_eq!(helper.configured_rate(), AngularRate::STILL);
        assert_eq!(helper.last_update(), SimTime::from_secs(1));
    }

    #[test]
    fn test_paused_update_only_restamps() {
        let mut helper = rotating(DVec3::new(10.0, 0.0, 3.0), AngularRate::new(1.0, 1.0));
        helper.pause();
        helper.update(SimTime::from_secs(2));
        assert_eq!(helper.position(), DVec3::new(10.0, 0.0, 3.0));
        assert_eq!(helper.last_update(), SimTime::from_secs(2));

        // Time spent paused is not replayed after unpausing
        helper.unpause();
        helper.update(SimTime::from_secs(2));
        assert_eq!(helper.position(), DVec3::new(10.0, 0.0, 3.0));
    }

    #[test]
    fn test_clockwise_rotation_wraps_below_zero() {
        let mut helper = rotating(DVec3::new(10.0, 0.0, 0.0), AngularRate::new(0.5, -1.0));
        helper.update(SimTime::from_secs(1));
        let expected = TAU - 0.5;
        assert!((helper.angle() - expected).abs() < 1e-9);
        assert!(helper.position().y < 0.0);
    }

    #[test]
    fn test_z_is_held() {
        let mut helper = rotating(DVec3::new(10.0, 0.0, 42.0), AngularRate::new(0.3, 1.0));
        helper.update(SimTime::from_secs(7));
        assert_eq!(helper.position().z, 42.0);
    }

    #[test]
    fn test_effective_rate_is_still_while_paused() {
        let mut helper = rotating(DVec3::new(10.0, 0.0, 0.0), AngularRate::new(0.3, -1.0));
        assert_eq!(helper.rate(), AngularRate::new(0.3, -1.0));
        helper.pause();
        assert_eq!(helper.rate(), AngularRate::STILL);
        assert_eq!(helper.configured_rate(), AngularRate::new(0.3, -1.0));
    }

    #[test]
    #[should_panic(expected = "moved backwards in time")]
    fn test_negative_elapsed_panics() {
        let mut helper = rotating(DVec3::new(10.0, 0.0, 0.0), AngularRate::new(0.1, 1.0));
        helper.update(SimTime::from_secs(5));
        helper.update(SimTime::from_secs(4));
    }

    #[test]
    #[should_panic(expected = "angle wrap did not converge")]
    fn test_runaway_wrap_panics() {
        let mut helper = rotating(DVec3::new(10.0, 0.0, 0.0), AngularRate::new(1.0e6, 1.0));
        helper.update(SimTime::from_secs(1000));
    }
}
