//! Records produced by patrols for external observers

pub mod course;
pub mod event;

// Re-exports
pub use course::{CourseChange, CourseObserver};
pub use event::{PatrolEvent, PatrolEventLog};
