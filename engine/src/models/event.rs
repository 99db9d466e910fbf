//! Event logging for patrol replay and analysis.
//!
//! Every phase change of a patrol is recorded in order. Ticks that only
//! advance an integrator are not logged.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use orbit_patrol_core::events::PatrolId;
//! use orbit_patrol_core::models::{PatrolEvent, PatrolEventLog};
//! use orbit_patrol_core::SimTime;
//!
//! let mut log = PatrolEventLog::new();
//! log.log(PatrolEvent::Repositioned {
//!     time: SimTime::ZERO,
//!     patrol: PatrolId(0),
//!     position: DVec3::new(75.0, 0.0, 0.0),
//!     radius: 75.0,
//! });
//! assert_eq!(log.events_of_type("Repositioned").len(), 1);
//! ```

use crate::core::time::SimTime;
use crate::events::PatrolId;
use crate::kinematics::AngularRate;
use crate::policy::{SwitchMode, Transit};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Patrol event capturing a phase change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatrolEvent {
    /// Position set from outside; any pending callback was cancelled
    Repositioned {
        time: SimTime,
        patrol: PatrolId,
        position: DVec3,
        radius: f64,
    },

    /// Surveillance (re)started on an orbit
    SurveilStarted {
        time: SimTime,
        patrol: PatrolId,
        orbit: i64,
        radius: f64,
        rate: AngularRate,
        /// Seconds to dwell before the next switch; `None` when switching is
        /// driven externally
        dwell_budget: Option<f64>,
    },

    /// Radial transit to another orbit departed
    OrbitSwitch {
        time: SimTime,
        patrol: PatrolId,
        transit: Transit,
        velocity: DVec3,
    },

    /// Switch decision kept the current orbit
    OrbitHold {
        time: SimTime,
        patrol: PatrolId,
        mode: SwitchMode,
        orbit: i64,
    },

    /// Radial transit finished
    Arrival {
        time: SimTime,
        patrol: PatrolId,
        position: DVec3,
        radius: f64,
    },

    /// Externally commanded straight-line motion started
    TransitStarted {
        time: SimTime,
        patrol: PatrolId,
        from: DVec3,
        velocity: DVec3,
    },

    /// Patrol frozen in place
    Held {
        time: SimTime,
        patrol: PatrolId,
        position: DVec3,
    },
}

impl PatrolEvent {
    pub fn time(&self) -> SimTime {
        match self {
            PatrolEvent::Repositioned { time, .. } => *time,
            PatrolEvent::SurveilStarted { time, .. } => *time,
            PatrolEvent::OrbitSwitch { time, .. } => *time,
            PatrolEvent::OrbitHold { time, .. } => *time,
            PatrolEvent::Arrival { time, .. } => *time,
            PatrolEvent::TransitStarted { time, .. } => *time,
            PatrolEvent::Held { time, .. } => *time,
        }
    }

    pub fn patrol(&self) -> PatrolId {
        match self {
            PatrolEvent::Repositioned { patrol, .. } => *patrol,
            PatrolEvent::SurveilStarted { patrol, .. } => *patrol,
            PatrolEvent::OrbitSwitch { patrol, .. } => *patrol,
            PatrolEvent::OrbitHold { patrol, .. } => *patrol,
            PatrolEvent::Arrival { patrol, .. } => *patrol,
            PatrolEvent::TransitStarted { patrol, .. } => *patrol,
            PatrolEvent::Held { patrol, .. } => *patrol,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            PatrolEvent::Repositioned { .. } => "Repositioned",
            PatrolEvent::SurveilStarted { .. } => "SurveilStarted",
            PatrolEvent::OrbitSwitch { .. } => "OrbitSwitch",
            PatrolEvent::OrbitHold { .. } => "OrbitHold",
            PatrolEvent::Arrival { .. } => "Arrival",
            PatrolEvent::TransitStarted { .. } => "TransitStarted",
            PatrolEvent::Held { .. } => "Held",
        }
    }
}

/// Ordered log of patrol events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatrolEventLog {
    events: Vec<PatrolEvent>,
}

impl PatrolEventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: PatrolEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[PatrolEvent] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&PatrolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_patrol(&self, patrol: PatrolId) -> Vec<&PatrolEvent> {
        self.events.iter().filter(|e| e.patrol() == patrol).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_patrol_and_type() {
        let mut log = PatrolEventLog::new();
        for id in 0..3 {
            log.log(PatrolEvent::Held {
                time: SimTime::from_secs(id as i64),
                patrol: PatrolId(id),
                position: DVec3::ZERO,
            });
        }
        log.log(PatrolEvent::OrbitHold {
            time: SimTime::from_secs(4),
            patrol: PatrolId(1),
            mode: SwitchMode::Walk,
            orbit: 2,
        });

        assert_eq!(log.len(), 4);
        assert_eq!(log.events_for_patrol(PatrolId(1)).len(), 2);
        assert_eq!(log.events_of_type("Held").len(), 3);
        assert_eq!(log.events_of_type("OrbitHold")[0].time(), SimTime::from_secs(4));
    }
}
