//! Course-change notifications
//!
//! Fired when a patrol's heading changes: when a radial transit departs, when
//! the patrol arrives and resumes orbiting, and on the external `stop_surveil`
//! and `hold` commands. Ordinary ticks never notify.

use crate::core::time::SimTime;
use crate::events::PatrolId;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Position and velocity of a patrol right after its course changed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseChange {
    pub time: SimTime,
    pub patrol: PatrolId,
    pub position: DVec3,
    pub velocity: DVec3,
}

/// Observer registered on a patrol for course changes
///
/// Any `FnMut(&CourseChange)` closure is an observer:
///
/// ```
/// use orbit_patrol_core::models::{CourseChange, CourseObserver};
///
/// let mut count = 0;
/// let mut observer = |_: &CourseChange| count += 1;
/// # let change = CourseChange {
/// #     time: orbit_patrol_core::SimTime::ZERO,
/// #     patrol: orbit_patrol_core::events::PatrolId(0),
/// #     position: glam::DVec3::ZERO,
/// #     velocity: glam::DVec3::ZERO,
/// # };
/// observer.on_course_change(&change);
/// assert_eq!(count, 1);
/// ```
pub trait CourseObserver {
    fn on_course_change(&mut self, change: &CourseChange);
}

impl<F> CourseObserver for F
where
    F: FnMut(&CourseChange),
{
    fn on_course_change(&mut self, change: &CourseChange) {
        self(change)
    }
}
