//! Scheduler-facing types

use crate::core::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a patrol within a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatrolId(pub u32);

impl fmt::Display for PatrolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patrol_{:04}", self.0)
    }
}

/// Callback a patrol asks to have run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolAction {
    /// Periodic poll: advance the active integrator or end the phase
    Tick,
    /// (Re)enter surveillance at the current position
    Surveil,
    /// Run the orbit-switch policy
    OrbitSwitch,
}

/// Handle to a pending callback, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventHandle(pub u64);

/// A callback popped from a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub at: SimTime,
    pub target: PatrolId,
    pub action: PatrolAction,
    pub handle: EventHandle,
}

/// Simulation clock and callback scheduler consumed by the patrol engine
pub trait Scheduler {
    /// Current simulation time
    fn now(&self) -> SimTime;

    /// Schedule `action` for `target` at absolute time `at`
    fn schedule_at(&mut self, at: SimTime, target: PatrolId, action: PatrolAction) -> EventHandle;

    /// Cancel a pending callback; cancelling a fired or unknown handle is a no-op
    fn cancel(&mut self, handle: EventHandle);

    /// Schedule `action` to run at the current time
    fn schedule_now(&mut self, target: PatrolId, action: PatrolAction) -> EventHandle {
        let now = self.now();
        self.schedule_at(now, target, action)
    }
}
