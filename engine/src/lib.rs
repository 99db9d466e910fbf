//! Orbit Patrol Core - Rust Engine
//!
//! Mobility engine for drones patrolling concentric orbits around a shared
//! center, with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Simulation time and planar geometry
//! - **kinematics**: Angular and linear motion integrators
//! - **policy**: Orbit-switch policies (where to go after a dwell)
//! - **patrol**: The patrol state machine and its configuration
//! - **events**: Scheduler interface and a reference event queue
//! - **models**: Course changes and the patrol event log
//! - **orchestrator**: Fleet driver and checkpointing
//! - **rng**: Deterministic random draw streams
//!
//! # Critical Invariants
//!
//! 1. Simulation time is integer nanoseconds and never moves backwards
//! 2. All randomness comes from injected, seedable draw streams
//! 3. A patrol has at most one pending callback

// Module declarations
pub mod core;
pub mod events;
pub mod kinematics;
pub mod models;
pub mod orchestrator;
pub mod patrol;
pub mod policy;
pub mod rng;

// Re-exports for convenience
pub use crate::core::time::{SimTime, TICK_PERIOD};
pub use events::{EventQueue, PatrolId, Scheduler};
pub use kinematics::{AngularIntegrator, AngularRate, LinearIntegrator};
pub use models::{CourseChange, CourseObserver, PatrolEvent, PatrolEventLog};
pub use orchestrator::{Fleet, FleetSnapshot, PatrolSnapshot};
pub use patrol::{OrbitPatrol, PatrolConfig, PatrolError, PatrolPhase, PolicyKind, SwitchTrigger};
pub use policy::{SwitchDecision, SwitchMode, SwitchPolicy};
pub use rng::{DrawStreams, RngManager};
