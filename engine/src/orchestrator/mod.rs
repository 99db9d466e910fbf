//! Orchestrator - drives a fleet of patrols on one scheduler
//!
//! See `engine.rs` for the run loop and `checkpoint.rs` for save/restore.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use checkpoint::{compute_config_hash, FleetSnapshot, PatrolSnapshot, PendingSnapshot};
pub use engine::Fleet;
