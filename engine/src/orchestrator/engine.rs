//! Fleet Engine
//!
//! Drives many patrols on one shared [`EventQueue`]:
//!
//! ```text
//! run_until(t):
//! 1. Pop the next live callback due at or before t
//! 2. Dispatch it to its patrol (stale handles are ignored by the patrol)
//! 3. Repeat until nothing is due
//! 4. Advance the clock to t and catch every patrol up to it
//! ```
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use orbit_patrol_core::rng::DrawStreams;
//! use orbit_patrol_core::{Fleet, PatrolConfig, SimTime};
//!
//! let mut fleet = Fleet::new();
//! let id = fleet
//!     .spawn(PatrolConfig::default(), DrawStreams::seeded(7), DVec3::new(150.0, 0.0, 0.0))
//!     .unwrap();
//!
//! fleet.run_until(SimTime::from_secs(30));
//! let patrol = fleet.patrol(id).unwrap();
//! println!("{} at {:?}", id, patrol.position());
//! ```

use super::checkpoint::FleetSnapshot;
use crate::core::time::SimTime;
use crate::events::{EventQueue, PatrolId, ScheduledEvent, Scheduler};
use crate::patrol::{OrbitPatrol, PatrolConfig, PatrolError};
use crate::rng::DrawStreams;
use glam::{DVec2, DVec3};
use std::collections::BTreeMap;

/// A set of patrols sharing one scheduler
pub struct Fleet {
    queue: EventQueue,
    patrols: BTreeMap<PatrolId, OrbitPatrol>,
    next_id: u32,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    pub fn new() -> Self {
        Self::starting_at(SimTime::ZERO)
    }

    pub fn starting_at(now: SimTime) -> Self {
        Self {
            queue: EventQueue::starting_at(now),
            patrols: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Create a patrol and place it at `position`
    ///
    /// # Errors
    /// Returns an error if the config is invalid or `position` sits on the
    /// center; nothing is added in that case.
    pub fn spawn(
        &mut self,
        config: PatrolConfig,
        streams: DrawStreams,
        position: DVec3,
    ) -> Result<PatrolId, PatrolError> {
        let id = PatrolId(self.next_id);
        let mut patrol = OrbitPatrol::new(id, config, streams)?;
        patrol.set_position(position, &mut self.queue)?;
        self.next_id += 1;
        self.patrols.insert(id, patrol);
        tracing::info!(patrol = %id, fleet_size = self.patrols.len(), "patrol spawned");
        Ok(id)
    }

    /// Add a patrol built elsewhere, such as one with a custom policy
    ///
    /// The patrol's pending callback, if any, must live on this fleet's queue.
    pub fn insert(&mut self, patrol: OrbitPatrol) {
        let id = patrol.id();
        self.next_id = self.next_id.max(id.0 + 1);
        self.patrols.insert(id, patrol);
    }

    pub fn patrol(&self, id: PatrolId) -> Option<&OrbitPatrol> {
        self.patrols.get(&id)
    }

    pub fn patrol_mut(&mut self, id: PatrolId) -> Option<&mut OrbitPatrol> {
        self.patrols.get_mut(&id)
    }

    pub fn patrols(&self) -> impl Iterator<Item = &OrbitPatrol> {
        self.patrols.values()
    }

    pub fn len(&self) -> usize {
        self.patrols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patrols.is_empty()
    }

    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    /// Scheduler the patrols run on
    pub fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    /// Fire the next pending callback
    ///
    /// Returns `None` once the queue is drained.
    pub fn step(&mut self) -> Option<ScheduledEvent> {
        let event = self.queue.pop_next()?;
        self.dispatch(&event);
        Some(event)
    }

    /// Fire every callback due at or before `until`, then catch all patrols up
    ///
    /// Returns the number of callbacks fired.
    pub fn run_until(&mut self, until: SimTime) -> usize {
        let mut fired = 0;
        while let Some(event) = self.queue.pop_until(until) {
            self.dispatch(&event);
            fired += 1;
        }
        if until > self.queue.now() {
            self.queue.advance_clock(until);
        }

        let now = self.queue.now();
        for patrol in self.patrols.values_mut() {
            patrol.advance_to(now);
        }
        tracing::trace!(time = %now, fired, "fleet advanced");
        fired
    }

    fn dispatch(&mut self, event: &ScheduledEvent) {
        match self.patrols.get_mut(&event.target) {
            Some(patrol) => patrol.handle(event, &mut self.queue),
            None => tracing::warn!(patrol = %event.target, "callback for unknown patrol dropped"),
        }
    }

    // ========================================================================
    // External control
    // ========================================================================

    pub fn set_position(&mut self, id: PatrolId, position: DVec3) -> Result<(), PatrolError> {
        let patrol = self.patrols.get_mut(&id).ok_or(PatrolError::UnknownPatrol(id))?;
        patrol.set_position(position, &mut self.queue)
    }

    pub fn set_center(&mut self, id: PatrolId, center: DVec2) -> Result<(), PatrolError> {
        let patrol = self.patrols.get_mut(&id).ok_or(PatrolError::UnknownPatrol(id))?;
        patrol.set_center(center, &mut self.queue)
    }

    pub fn stop_surveil(&mut self, id: PatrolId, velocity: DVec3) -> Result<(), PatrolError> {
        let patrol = self.patrols.get_mut(&id).ok_or(PatrolError::UnknownPatrol(id))?;
        patrol.stop_surveil(velocity, &mut self.queue);
        Ok(())
    }

    pub fn surveil(&mut self, id: PatrolId) -> Result<(), PatrolError> {
        let patrol = self.patrols.get_mut(&id).ok_or(PatrolError::UnknownPatrol(id))?;
        patrol.surveil(&mut self.queue)
    }

    pub fn hold(&mut self, id: PatrolId) -> Result<(), PatrolError> {
        let patrol = self.patrols.get_mut(&id).ok_or(PatrolError::UnknownPatrol(id))?;
        patrol.hold(&mut self.queue);
        Ok(())
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    pub fn snapshot(&self) -> Result<FleetSnapshot, PatrolError> {
        let patrols = self
            .patrols
            .values()
            .map(OrbitPatrol::snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FleetSnapshot {
            now: self.queue.now(),
            next_id: self.next_id,
            patrols,
        })
    }

    /// Rebuild a fleet from a snapshot
    ///
    /// `configs` supplies the configuration of every patrol in the snapshot.
    /// Draw streams are reseeded from the recorded generator states.
    ///
    /// # Errors
    /// - [`PatrolError::UnknownPatrol`] if a patrol has no config
    /// - [`PatrolError::ConfigMismatch`] if a config differs from the one
    ///   the snapshot was taken with
    /// - [`PatrolError::Serialization`] if a patrol's draw streams could not
    ///   be checkpointed
    pub fn restore(
        snapshot: FleetSnapshot,
        configs: &BTreeMap<PatrolId, PatrolConfig>,
    ) -> Result<Self, PatrolError> {
        let mut fleet = Self::starting_at(snapshot.now);
        fleet.next_id = snapshot.next_id;

        let mut patrols = snapshot.patrols;
        // Re-arm callbacks in their original scheduling order
        patrols.sort_by_key(|p| p.pending.map(|pending| pending.order));

        for patrol_snapshot in patrols {
            let id = patrol_snapshot.id;
            let config = configs.get(&id).ok_or(PatrolError::UnknownPatrol(id))?.clone();
            let (mode, target) = patrol_snapshot.stream_states.ok_or_else(|| {
                PatrolError::Serialization(format!("{} has no checkpointed draw streams", id))
            })?;
            let streams = DrawStreams::from_states(mode, target);
            let patrol = OrbitPatrol::restore(patrol_snapshot, config, streams, &mut fleet.queue)?;
            fleet.patrols.insert(id, patrol);
        }

        tracing::info!(time = %fleet.now(), patrols = fleet.len(), "fleet restored");
        Ok(fleet)
    }
}

impl std::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fleet")
            .field("now", &self.queue.now())
            .field("patrols", &self.patrols.len())
            .field("pending", &self.queue.len())
            .finish()
    }
}
