//! Planar angle helpers shared by the integrators and the switch policies
//!
//! Positions are 3D (`DVec3`); every orbit lives in the xy-plane around a 2D
//! center, so angles are measured on the xy-projection.

use glam::{DVec2, DVec3};
use std::f64::consts::TAU;

/// Angle of `point - center` from the positive x-axis, in `[0, 2π)`
///
/// Computed from `acos` of the normalized x component and mirrored to the
/// lower half-plane when the y component is negative. A point sitting on the
/// center has no direction and maps to `0`.
///
/// # Example
/// ```
/// use glam::{DVec2, DVec3};
/// use orbit_patrol_core::core::geometry::angle_of;
///
/// let theta = angle_of(DVec3::new(0.0, -5.0, 0.0), DVec2::ZERO);
/// assert!((theta - 1.5 * std::f64::consts::PI).abs() < 1e-12);
/// ```
pub fn angle_of(point: DVec3, center: DVec2) -> f64 {
    heading_of(point.truncate() - center)
}

/// Angle of a planar direction vector from the positive x-axis, in `[0, 2π)`
pub fn heading_of(direction: DVec2) -> f64 {
    let length = direction.length();
    if length == 0.0 {
        return 0.0;
    }

    // Rounding can push the ratio a hair outside acos' domain
    let cos = (direction.x / length).clamp(-1.0, 1.0);
    let mut theta = cos.acos();
    if direction.y < 0.0 {
        theta = TAU - theta;
    }
    if theta >= TAU {
        theta -= TAU;
    }
    theta
}

/// Planar distance between `point` and `center` (z ignored)
pub fn planar_distance(point: DVec3, center: DVec2) -> f64 {
    (point.truncate() - center).length()
}
