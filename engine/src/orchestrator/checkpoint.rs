//! Checkpoint - Save/Load Patrol State
//!
//! Enables serialization and deserialization of patrol and fleet state for
//! pause/resume.
//!
//! # Critical Invariants
//!
//! - **Determinism**: a restored fleet continues exactly like the original
//! - **Single pending callback**: each patrol re-arms at most one callback
//! - **Config Matching**: state can only be loaded with the matching config

use crate::core::time::SimTime;
use crate::events::{PatrolAction, PatrolId};
use crate::kinematics::{AngularIntegrator, LinearIntegrator};
use crate::patrol::{PatrolError, PatrolPhase};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete state of one patrol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatrolSnapshot {
    pub id: PatrolId,
    pub phase: PatrolPhase,
    pub dwell_elapsed: f64,
    pub dwell_budget: Option<f64>,
    pub transit_elapsed: f64,
    pub transit_budget: Option<f64>,
    pub angular: AngularIntegrator,
    pub linear: LinearIntegrator,

    /// Callback to re-arm on restore
    pub pending: Option<PendingSnapshot>,

    pub top_position: Option<DVec3>,
    pub mode_label: String,

    /// Mode and target stream states, when both streams are seeded generators
    pub stream_states: Option<(u64, u64)>,

    /// SHA256 hash of the patrol config (for validation)
    pub config_hash: String,
}

/// Pending callback of a patrol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSnapshot {
    pub at: SimTime,
    pub action: PatrolAction,
    /// Scheduling order at snapshot time; breaks ties between callbacks due at
    /// the same instant
    pub order: u64,
}

/// Complete fleet state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Scheduler time at snapshot
    pub now: SimTime,

    /// Next id `spawn` hands out
    pub next_id: u32,

    pub patrols: Vec<PatrolSnapshot>,
}

impl FleetSnapshot {
    pub fn to_json(&self) -> Result<String, PatrolError> {
        serde_json::to_string(self)
            .map_err(|e| PatrolError::Serialization(format!("Snapshot serialization failed: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, PatrolError> {
        serde_json::from_str(json)
            .map_err(|e| PatrolError::Serialization(format!("Snapshot parse failed: {}", e)))
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys, so the hash does not
/// depend on field order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, PatrolError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| PatrolError::Serialization(format!("Config serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| PatrolError::Serialization(format!("Config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patrol::PatrolConfig;

    #[test]
    fn test_compute_config_hash_deterministic() {
        let hash1 = compute_config_hash(&PatrolConfig::default()).unwrap();
        let hash2 = compute_config_hash(&PatrolConfig::default()).unwrap();
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let base = PatrolConfig::default();
        let other = PatrolConfig {
            epsilon: 0.5,
            ..PatrolConfig::default()
        };
        assert_ne!(
            compute_config_hash(&base).unwrap(),
            compute_config_hash(&other).unwrap()
        );
    }

    #[test]
    fn test_fleet_snapshot_json_round_trip() {
        let snapshot = FleetSnapshot {
            now: SimTime::from_millis(1500),
            next_id: 2,
            patrols: Vec::new(),
        };
        let json = snapshot.to_json().unwrap();
        assert_eq!(FleetSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_malformed_snapshot_json_is_rejected() {
        let err = FleetSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, PatrolError::Serialization(_)));
    }
}
