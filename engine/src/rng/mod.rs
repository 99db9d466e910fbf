//! Deterministic random draw streams
//!
//! Uses xorshift64* for fast, deterministic uniform draws.
//! CRITICAL: Every draw the patrol engine consumes goes through a
//! [`DrawSource`] injected at construction; there is no ambient global stream.

mod streams;
mod xorshift;

pub use streams::{DrawSource, DrawStreams, ReplayDraws};
pub use xorshift::RngManager;
