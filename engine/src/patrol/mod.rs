//! Orbit patrol state machine and its configuration

pub mod config;
pub mod engine;
pub mod trigger;

pub use config::{PatrolConfig, PolicyKind};
pub use engine::{OrbitPatrol, PatrolError, PatrolPhase, PendingCallback};
pub use trigger::SwitchTrigger;
