//! Deterministic event queue
//!
//! Callbacks are ordered by time, then by insertion order, so two runs that
//! schedule the same callbacks fire them in the same order. Cancellation is
//! lazy: cancelled entries stay in the heap and are skipped when popped.

use super::types::{EventHandle, PatrolAction, PatrolId, ScheduledEvent, Scheduler};
use crate::core::time::SimTime;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    at: SimTime,
    seq: u64,
    target: PatrolId,
    action: PatrolAction,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reference [`Scheduler`] backed by a binary heap
///
/// # Example
/// ```
/// use orbit_patrol_core::events::{EventQueue, PatrolAction, PatrolId, Scheduler};
/// use orbit_patrol_core::SimTime;
///
/// let mut queue = EventQueue::new();
/// let late = queue.schedule_at(SimTime::from_secs(2), PatrolId(0), PatrolAction::Tick);
/// queue.schedule_at(SimTime::from_secs(1), PatrolId(1), PatrolAction::Surveil);
/// queue.cancel(late);
///
/// let event = queue.pop_next().unwrap();
/// assert_eq!(event.target, PatrolId(1));
/// assert_eq!(queue.now(), SimTime::from_secs(1));
/// assert!(queue.pop_next().is_none());
/// ```
#[derive(Debug, Default)]
pub struct EventQueue {
    now: SimTime,
    next_seq: u64,
    heap: BinaryHeap<Entry>,
    cancelled: HashSet<u64>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue starting at `now`
    pub fn starting_at(now: SimTime) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Number of live (not cancelled) pending callbacks
    pub fn len(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of the next live callback
    pub fn peek_time(&mut self) -> Option<SimTime> {
        self.discard_cancelled();
        self.heap.peek().map(|entry| entry.at)
    }

    /// Pop the next live callback and move the clock to its time
    pub fn pop_next(&mut self) -> Option<ScheduledEvent> {
        self.discard_cancelled();
        let entry = self.heap.pop()?;
        self.now = entry.at;
        Some(ScheduledEvent {
            at: entry.at,
            target: entry.target,
            action: entry.action,
            handle: EventHandle(entry.seq),
        })
    }

    /// Pop the next live callback only if it is due at or before `limit`
    pub fn pop_until(&mut self, limit: SimTime) -> Option<ScheduledEvent> {
        match self.peek_time() {
            Some(at) if at <= limit => self.pop_next(),
            _ => None,
        }
    }

    /// Move the clock forward without firing anything
    ///
    /// # Panics
    /// Panics if `now` is in the past or a live callback is due before it
    pub fn advance_clock(&mut self, now: SimTime) {
        assert!(now >= self.now, "clock cannot move backwards");
        if let Some(next) = self.peek_time() {
            assert!(next >= now, "cannot skip past pending callback at {}", next);
        }
        self.now = now;
    }

    fn discard_cancelled(&mut self) {
        while let Some(entry) = self.heap.peek() {
            if !self.cancelled.remove(&entry.seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl Scheduler for EventQueue {
    fn now(&self) -> SimTime {
        self.now
    }

    /// # Panics
    /// Panics if `at` is earlier than the current time
    fn schedule_at(&mut self, at: SimTime, target: PatrolId, action: PatrolAction) -> EventHandle {
        assert!(
            at >= self.now,
            "cannot schedule in the past: now {}, requested {}",
            self.now,
            at
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            at,
            seq,
            target,
            action,
        });
        EventHandle(seq)
    }

    fn cancel(&mut self, handle: EventHandle) {
        if self.heap.iter().any(|entry| entry.seq == handle.0) {
            self.cancelled.insert(handle.0);
        }
    }
}
