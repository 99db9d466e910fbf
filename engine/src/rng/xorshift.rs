//! xorshift64* random number generator
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of draws → same patrol trace.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use orbit_patrol_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let unit = rng.uniform(0.0, 1.0);
/// assert!((0.0..1.0).contains(&unit));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 (xorshift cannot leave the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Top 53 bits scaled by 2^-53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [min, max)
    ///
    /// # Panics
    /// Panics if `min > max`
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "min must not exceed max");
        min + self.next_f64() * (max - min)
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// `RngManager::new(state)` continues the sequence from this point.
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
