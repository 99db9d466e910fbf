//! Draw stream interface consumed by the switch policies

use super::RngManager;
use std::collections::VecDeque;
use std::fmt;

/// Source of uniformly distributed draws
pub trait DrawSource: fmt::Debug {
    /// Draw a value uniformly from `[min, max)`
    fn draw(&mut self, min: f64, max: f64) -> f64;

    /// Opaque state that lets the stream be rebuilt after a checkpoint.
    ///
    /// `None` means the stream cannot be checkpointed.
    fn checkpoint_state(&self) -> Option<u64> {
        None
    }
}

impl DrawSource for RngManager {
    fn draw(&mut self, min: f64, max: f64) -> f64 {
        self.uniform(min, max)
    }

    fn checkpoint_state(&self) -> Option<u64> {
        Some(self.get_state())
    }
}

/// Replays a fixed sequence of unit draws, scaled into the requested range
///
/// Used to pin a policy branch or reproduce a recorded trace.
///
/// # Example
/// ```
/// use orbit_patrol_core::rng::{DrawSource, ReplayDraws};
///
/// let mut draws = ReplayDraws::new([0.25, 0.5]);
/// assert_eq!(draws.draw(0.0, 1.0), 0.25);
/// assert_eq!(draws.draw(0.0, 2.0), 1.0);
/// assert_eq!(draws.remaining(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplayDraws {
    values: VecDeque<f64>,
}

impl ReplayDraws {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl DrawSource for ReplayDraws {
    /// # Panics
    /// Panics when the recorded sequence is exhausted
    fn draw(&mut self, min: f64, max: f64) -> f64 {
        match self.values.pop_front() {
            Some(unit) => min + unit * (max - min),
            None => panic!("replay draw stream exhausted"),
        }
    }
}

/// The two independent streams a patrol consumes
///
/// - `mode`: walk/flight selection (the epsilon coin flip)
/// - `target`: target selection within the chosen mode
#[derive(Debug)]
pub struct DrawStreams {
    pub mode: Box<dyn DrawSource>,
    pub target: Box<dyn DrawSource>,
}

impl DrawStreams {
    pub fn new(mode: Box<dyn DrawSource>, target: Box<dyn DrawSource>) -> Self {
        Self { mode, target }
    }

    /// Two xorshift streams derived deterministically from one seed
    pub fn seeded(seed: u64) -> Self {
        Self::from_states(seed, seed ^ 0x9E37_79B9_7F4A_7C15)
    }

    /// Rebuild xorshift streams from checkpointed states
    pub fn from_states(mode_state: u64, target_state: u64) -> Self {
        Self {
            mode: Box::new(RngManager::new(mode_state)),
            target: Box::new(RngManager::new(target_state)),
        }
    }

    /// Replay streams for pinned decisions
    pub fn replay(
        mode: impl IntoIterator<Item = f64>,
        target: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            mode: Box::new(ReplayDraws::new(mode)),
            target: Box::new(ReplayDraws::new(target)),
        }
    }

    /// Checkpoint states of both streams, if both support it
    pub fn checkpoint_states(&self) -> Option<(u64, u64)> {
        Some((
            self.mode.checkpoint_state()?,
            self.target.checkpoint_state()?,
        ))
    }
}
