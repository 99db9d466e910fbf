//! Core simulation primitives: time and planar geometry

pub mod geometry;
pub mod time;
