//! Scheduling of patrol callbacks
//!
//! This module handles:
//! - The [`Scheduler`] interface the patrol engine schedules its callbacks on
//! - The callback kinds a patrol can schedule ([`PatrolAction`])
//! - A deterministic reference scheduler ([`EventQueue`])

pub mod queue;
pub mod types;

pub use queue::EventQueue;
pub use types::{EventHandle, PatrolAction, PatrolId, ScheduledEvent, Scheduler};
