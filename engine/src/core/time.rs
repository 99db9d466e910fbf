//! Time management for the simulation
//!
//! Simulation time is an integer count of nanoseconds. Scheduling compares and
//! orders exact integers; kinematics convert elapsed time to f64 seconds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Fixed polling period of every patrol (0.1 simulated seconds)
pub const TICK_PERIOD: SimTime = SimTime::from_millis(100);

/// Absolute simulation timestamp (or span) in nanoseconds
///
/// # Example
/// ```
/// use orbit_patrol_core::SimTime;
///
/// let t = SimTime::from_secs_f64(1.5);
/// assert_eq!(t.as_nanos(), 1_500_000_000);
/// assert_eq!(t.as_secs_f64(), 1.5);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(i64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * 1_000_000)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * NANOS_PER_SEC)
    }

    /// Convert fractional seconds, rounding to the nearest nanosecond
    ///
    /// # Panics
    /// Panics if `secs` is not finite
    pub fn from_secs_f64(secs: f64) -> Self {
        assert!(secs.is_finite(), "time must be finite, got {}", secs);
        Self((secs * NANOS_PER_SEC as f64).round() as i64)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    /// Signed elapsed seconds from `earlier` to `self`
    pub fn seconds_since(self, earlier: SimTime) -> f64 {
        (self - earlier).as_secs_f64()
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 - rhs.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_period_is_a_tenth_of_a_second() {
        assert_eq!(TICK_PERIOD.as_secs_f64(), 0.1);
    }

    #[test]
    fn test_seconds_since_is_signed() {
        let a = SimTime::from_secs(2);
        let b = SimTime::from_millis(2500);
        assert_eq!(b.seconds_since(a), 0.5);
        assert_eq!(a.seconds_since(b), -0.5);
    }

    #[test]
    #[should_panic(expected = "time must be finite")]
    fn test_non_finite_seconds_panics() {
        SimTime::from_secs_f64(f64::NAN);
    }
}
