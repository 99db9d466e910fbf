//! Orbit Patrol Engine
//!
//! A patrol alternates between two phases:
//!
//! ```text
//! set_position ──► Surveil ──► Tick … Tick ──► OrbitSwitch ──► Tick … Tick ──► Surveil ──► …
//!                  (orbit)     (dwell)          (policy)        (transit)       (arrive)
//! ```
//!
//! - **Surveilling**: the angular integrator rotates the patrol around the
//!   center; every tick adds one tick period to the dwell counter until the
//!   trigger's budget is used up.
//! - **Transiting**: the linear integrator carries the patrol radially toward
//!   the target orbit until the planned travel time is used up; on arrival the
//!   angular integrator is reconfigured for the new radius.
//!
//! Every state change happens inside a callback run by the [`Scheduler`]. A
//! patrol has at most one pending callback at any time, and repositioning it
//! cancels that callback before scheduling a new one.

use super::config::PatrolConfig;
use crate::core::geometry::planar_distance;
use crate::core::time::{SimTime, TICK_PERIOD};
use crate::events::{EventHandle, PatrolAction, PatrolId, ScheduledEvent, Scheduler};
use crate::kinematics::{AngularIntegrator, AngularRate, LinearIntegrator};
use crate::models::{CourseChange, CourseObserver, PatrolEvent, PatrolEventLog};
use crate::orchestrator::checkpoint::{compute_config_hash, PatrolSnapshot, PendingSnapshot};
use crate::policy::{build_policy, SwitchContext, SwitchDecision, SwitchPolicy};
use crate::rng::DrawStreams;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by patrol configuration and control
#[derive(Debug, Error, PartialEq)]
pub enum PatrolError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Cannot orbit at radius {radius}: the radius must be positive")]
    DegenerateRadius { radius: f64 },

    #[error("Config hash mismatch: checkpoint has {expected}, supplied config has {actual}")]
    ConfigMismatch { expected: String, actual: String },

    #[error("Checkpoint pending callback at {pending_at} is earlier than the scheduler time {now}")]
    StaleCheckpoint { pending_at: SimTime, now: SimTime },

    #[error("Patrol not found: {0}")]
    UnknownPatrol(PatrolId),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// State
// ============================================================================

/// Phase of a patrol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolPhase {
    /// Rotating on an orbit
    Surveilling,
    /// Flying a straight line, radially or on an external command
    Transiting,
    /// Frozen in place with zero velocity
    Static,
}

/// The single callback a patrol is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCallback {
    pub handle: EventHandle,
    pub at: SimTime,
    pub action: PatrolAction,
}

/// A patrolling agent orbiting a shared center
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use orbit_patrol_core::events::{EventQueue, PatrolId, Scheduler};
/// use orbit_patrol_core::rng::DrawStreams;
/// use orbit_patrol_core::{OrbitPatrol, PatrolConfig, PatrolPhase};
///
/// let mut queue = EventQueue::new();
/// let mut patrol = OrbitPatrol::new(PatrolId(0), PatrolConfig::default(), DrawStreams::seeded(1)).unwrap();
/// patrol.set_position(DVec3::new(75.0, 0.0, 0.0), &mut queue).unwrap();
///
/// while let Some(event) = queue.pop_next() {
///     patrol.handle(&event, &mut queue);
///     if queue.now().as_secs_f64() >= 5.0 {
///         break;
///     }
/// }
/// assert_eq!(patrol.phase(), PatrolPhase::Surveilling);
/// assert!((patrol.position().length() - 75.0).abs() < 1e-9);
/// ```
pub struct OrbitPatrol {
    id: PatrolId,
    config: PatrolConfig,
    policy: Box<dyn SwitchPolicy>,
    streams: DrawStreams,
    angular: AngularIntegrator,
    linear: LinearIntegrator,
    phase: PatrolPhase,
    dwell_elapsed: f64,
    dwell_budget: Option<f64>,
    transit_elapsed: f64,
    /// `None` for an open-ended external transit
    transit_budget: Option<f64>,
    pending: Option<PendingCallback>,
    top_position: Option<DVec3>,
    mode_label: String,
    log: PatrolEventLog,
    observers: Vec<Box<dyn CourseObserver>>,
}

impl fmt::Debug for OrbitPatrol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitPatrol")
            .field("id", &self.id)
            .field("policy", &self.policy.name())
            .field("phase", &self.phase)
            .field("position", &self.position())
            .field("dwell_elapsed", &self.dwell_elapsed)
            .field("transit_elapsed", &self.transit_elapsed)
            .field("pending", &self.pending)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl OrbitPatrol {
    /// Create a patrol running the policy its configuration names
    ///
    /// The patrol is idle until [`set_position`](Self::set_position) places it.
    pub fn new(id: PatrolId, config: PatrolConfig, streams: DrawStreams) -> Result<Self, PatrolError> {
        let policy = build_policy(&config);
        Self::with_policy(id, config, policy, streams)
    }

    /// Create a patrol with a caller-supplied policy
    pub fn with_policy(
        id: PatrolId,
        config: PatrolConfig,
        policy: Box<dyn SwitchPolicy>,
        streams: DrawStreams,
    ) -> Result<Self, PatrolError> {
        config.validate()?;
        Ok(Self {
            id,
            angular: AngularIntegrator::new(config.center),
            linear: LinearIntegrator::new(),
            config,
            policy,
            streams,
            phase: PatrolPhase::Surveilling,
            dwell_elapsed: 0.0,
            dwell_budget: None,
            transit_elapsed: 0.0,
            transit_budget: None,
            pending: None,
            top_position: None,
            mode_label: "static".to_string(),
            log: PatrolEventLog::new(),
            observers: Vec::new(),
        })
    }

    /// Register a course-change observer
    pub fn subscribe(&mut self, observer: impl CourseObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ========================================================================
    // External control
    // ========================================================================

    /// Place the patrol and start a fresh surveillance episode there
    ///
    /// Cancels any pending callback, resets the dwell and transit counters and
    /// schedules an immediate return to surveillance.
    ///
    /// # Errors
    /// Returns [`PatrolError::DegenerateRadius`] if `position` sits on the
    /// center; the patrol is left untouched.
    pub fn set_position(
        &mut self,
        position: DVec3,
        sched: &mut dyn Scheduler,
    ) -> Result<(), PatrolError> {
        let radius = planar_distance(position, self.config.center);
        self.rate_for_radius(radius)?;

        let now = sched.now();
        self.angular.update(now);
        self.angular.pause();
        self.angular.set_position(position, now);
        self.linear.set_position(position, now);
        self.cancel_pending(sched);
        self.configure_orbit(position, now)?;

        self.phase = PatrolPhase::Surveilling;
        self.dwell_elapsed = 0.0;
        self.transit_elapsed = 0.0;
        self.transit_budget = None;

        tracing::info!(patrol = %self.id, radius, time = %now, "patrol repositioned");
        self.log.log(PatrolEvent::Repositioned {
            time: now,
            patrol: self.id,
            position,
            radius,
        });
        self.schedule(sched, now, PatrolAction::Surveil);
        Ok(())
    }

    /// Move the orbit center and restart surveillance at the current position
    pub fn set_center(&mut self, center: DVec2, sched: &mut dyn Scheduler) -> Result<(), PatrolError> {
        let candidate = PatrolConfig {
            center,
            ..self.config.clone()
        };
        candidate.validate()?;

        let now = sched.now();
        self.advance_to(now);
        let position = self.position();
        let radius = planar_distance(position, center);
        AngularRate::for_radius(radius, candidate.tangential_velocity, candidate.orbit_spacing)?;

        self.config = candidate;
        self.angular.set_center(center, now);
        self.set_position(position, sched)
    }

    /// Leave the orbit on a straight line at `velocity` until told otherwise
    ///
    /// Records the exit point as the top position.
    pub fn stop_surveil(&mut self, velocity: DVec3, sched: &mut dyn Scheduler) {
        let now = sched.now();
        self.advance_to(now);
        self.linear.pause();
        self.angular.pause();

        let from = self.position();
        self.top_position = Some(from);
        self.linear.set_position(from, now);
        self.linear.set_velocity(velocity, now);
        self.linear.unpause();

        self.cancel_pending(sched);
        self.phase = PatrolPhase::Transiting;
        self.transit_elapsed = 0.0;
        self.transit_budget = None;

        tracing::info!(patrol = %self.id, ?velocity, time = %now, "external transit started");
        self.log.log(PatrolEvent::TransitStarted {
            time: now,
            patrol: self.id,
            from,
            velocity,
        });
        self.notify_course_change(now);
        self.schedule(sched, now + TICK_PERIOD, PatrolAction::Tick);
    }

    /// Return to surveillance at the current position right away
    ///
    /// # Errors
    /// Returns [`PatrolError::DegenerateRadius`] if the patrol currently sits
    /// on the center.
    pub fn surveil(&mut self, sched: &mut dyn Scheduler) -> Result<(), PatrolError> {
        let now = sched.now();
        self.advance_to(now);
        let position = self.position();
        self.rate_for_radius(planar_distance(position, self.config.center))?;
        if self.phase != PatrolPhase::Transiting {
            // The surveil callback resumes from the linear integrator
            self.linear.set_position(position, now);
        }

        if self.phase == PatrolPhase::Static {
            // Resume from the frozen point as if arriving there
            self.phase = PatrolPhase::Transiting;
            self.transit_budget = None;
        }
        self.cancel_pending(sched);
        self.schedule(sched, now, PatrolAction::Surveil);
        Ok(())
    }

    /// Freeze the patrol in place with zero velocity
    pub fn hold(&mut self, sched: &mut dyn Scheduler) {
        let now = sched.now();
        self.advance_to(now);
        let position = self.position();
        self.angular.pause();
        self.linear.pause();
        self.angular.set_position(position, now);
        self.linear.set_position(position, now);

        self.cancel_pending(sched);
        self.phase = PatrolPhase::Static;
        self.transit_budget = None;

        self.log.log(PatrolEvent::Held {
            time: now,
            patrol: self.id,
            position,
        });
        self.notify_course_change(now);
    }

    pub fn set_mode(&mut self, mode: impl Into<String>) {
        self.mode_label = mode.into();
    }

    /// Free-form mode label
    pub fn mode(&self) -> &str {
        &self.mode_label
    }

    /// Where the last external transit left the orbit
    pub fn top_position(&self) -> Option<DVec3> {
        self.top_position
    }

    // ========================================================================
    // Scheduled callbacks
    // ========================================================================

    /// Run a callback popped from the scheduler
    ///
    /// Callbacks whose handle is not the one this patrol is waiting on are
    /// stale and ignored.
    pub fn handle(&mut self, event: &ScheduledEvent, sched: &mut dyn Scheduler) {
        match self.pending {
            Some(pending) if pending.handle == event.handle => self.pending = None,
            _ => {
                tracing::debug!(patrol = %self.id, handle = ?event.handle, "ignoring stale callback");
                return;
            }
        }

        match event.action {
            PatrolAction::Tick => self.on_tick(sched),
            PatrolAction::Surveil => self.on_surveil(sched),
            PatrolAction::OrbitSwitch => self.on_orbit_switch(sched),
        }
    }

    fn on_tick(&mut self, sched: &mut dyn Scheduler) {
        let now = sched.now();
        let tick = TICK_PERIOD.as_secs_f64();

        match self.phase {
            PatrolPhase::Surveilling => {
                if let Some(budget) = self.dwell_budget {
                    if self.dwell_elapsed >= budget {
                        self.dwell_elapsed = 0.0;
                        self.angular.pause();
                        self.schedule(sched, now, PatrolAction::OrbitSwitch);
                        return;
                    }
                }
                self.angular.update(now);
                self.dwell_elapsed += tick;
            }
            PatrolPhase::Transiting => {
                if let Some(budget) = self.transit_budget {
                    if self.transit_elapsed >= budget {
                        self.transit_elapsed = 0.0;
                        self.transit_budget = None;
                        self.linear.pause();
                        self.schedule(sched, now, PatrolAction::Surveil);
                        return;
                    }
                }
                self.linear.update(now);
                self.transit_elapsed += tick;
            }
            PatrolPhase::Static => return,
        }

        self.schedule(sched, now + TICK_PERIOD, PatrolAction::Tick);
    }

    fn on_surveil(&mut self, sched: &mut dyn Scheduler) {
        let now = sched.now();
        self.linear.update(now);
        self.linear.pause();
        self.angular.update(now);
        self.angular.pause();

        let position = self.linear.position();
        let rate = match self.configure_orbit(position, now) {
            Ok(rate) => rate,
            Err(err) => {
                tracing::error!(patrol = %self.id, error = %err, "cannot resume surveillance, holding");
                self.angular.set_position(position, now);
                self.phase = PatrolPhase::Static;
                self.transit_budget = None;
                self.log.log(PatrolEvent::Held {
                    time: now,
                    patrol: self.id,
                    position,
                });
                self.notify_course_change(now);
                return;
            }
        };
        self.angular.unpause();

        let arriving = self.phase == PatrolPhase::Transiting;
        self.phase = PatrolPhase::Surveilling;
        let radius = self.angular.radius();
        self.dwell_budget =
            self.config
                .trigger
                .dwell_budget(self.config.dwell_duration, self.angular.angle(), rate);

        if arriving {
            tracing::debug!(patrol = %self.id, radius, time = %now, "arrived on orbit");
            self.log.log(PatrolEvent::Arrival {
                time: now,
                patrol: self.id,
                position,
                radius,
            });
            self.notify_course_change(now);
        }
        self.log.log(PatrolEvent::SurveilStarted {
            time: now,
            patrol: self.id,
            orbit: self.orbit_index(),
            radius,
            rate,
            dwell_budget: self.dwell_budget,
        });
        self.schedule(sched, now + TICK_PERIOD, PatrolAction::Tick);
    }

    fn on_orbit_switch(&mut self, sched: &mut dyn Scheduler) {
        let now = sched.now();
        self.angular.update(now);
        self.angular.pause();
        let current = self.angular.position();
        self.linear.pause();
        self.linear.set_position(current, now);

        let ctx = SwitchContext::new(
            current,
            self.config.center,
            self.config.orbit_spacing,
            self.config.max_radius,
            self.config.radial_velocity,
        );

        match self.policy.decide(&ctx, &mut self.streams) {
            SwitchDecision::Hold { mode, orbit, .. } => {
                tracing::debug!(patrol = %self.id, %mode, orbit, "staying in the same orbit");
                self.log.log(PatrolEvent::OrbitHold {
                    time: now,
                    patrol: self.id,
                    mode,
                    orbit,
                });
                self.schedule(sched, now, PatrolAction::Surveil);
            }
            SwitchDecision::Transit(transit) => {
                let velocity = transit.velocity(current, self.config.center);
                tracing::debug!(
                    patrol = %self.id,
                    mode = %transit.mode,
                    from = transit.from_orbit,
                    to = transit.to_orbit,
                    travel_time = transit.travel_time,
                    "switching orbit"
                );

                self.phase = PatrolPhase::Transiting;
                self.transit_elapsed = 0.0;
                self.transit_budget = Some(transit.travel_time);
                self.linear.set_velocity(velocity, now);
                self.linear.update(now);
                self.linear.unpause();

                self.log.log(PatrolEvent::OrbitSwitch {
                    time: now,
                    patrol: self.id,
                    transit,
                    velocity,
                });
                self.schedule(sched, now + TICK_PERIOD, PatrolAction::Tick);
                self.notify_course_change(now);
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Catch the active integrator up to `now` before querying
    pub fn advance_to(&mut self, now: SimTime) {
        match self.phase {
            PatrolPhase::Surveilling => self.angular.update(now),
            PatrolPhase::Transiting => self.linear.update(now),
            PatrolPhase::Static => {
                self.angular.update(now);
                self.linear.update(now);
            }
        }
    }

    /// Current position: on the orbit, or along the transit
    pub fn position(&self) -> DVec3 {
        match self.phase {
            PatrolPhase::Transiting => self.linear.position(),
            PatrolPhase::Surveilling | PatrolPhase::Static => self.angular.position(),
        }
    }

    /// Current velocity
    ///
    /// While surveilling this is the tangential vector `(-v·sinθ, v·cosθ, 0)`
    /// at the current angle; while transiting it is the transit velocity.
    pub fn velocity(&self) -> DVec3 {
        match self.phase {
            PatrolPhase::Surveilling => {
                let theta = self.angular.angle();
                let v = self.config.tangential_velocity;
                DVec3::new(-v * theta.sin(), v * theta.cos(), 0.0)
            }
            PatrolPhase::Transiting => self.linear.velocity(),
            PatrolPhase::Static => DVec3::ZERO,
        }
    }

    /// Radius of the orbit being surveilled; `None` off-orbit
    pub fn orbit_radius(&self) -> Option<f64> {
        match self.phase {
            PatrolPhase::Surveilling => Some(self.angular.radius()),
            _ => None,
        }
    }

    /// `round(radius / orbit_spacing)` at the current position
    pub fn orbit_index(&self) -> i64 {
        let radius = planar_distance(self.position(), self.config.center);
        (radius / self.config.orbit_spacing).round() as i64
    }

    /// Effective angular rate (still while not rotating)
    pub fn angular_rate(&self) -> AngularRate {
        self.angular.rate()
    }

    pub fn id(&self) -> PatrolId {
        self.id
    }

    pub fn config(&self) -> &PatrolConfig {
        &self.config
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn phase(&self) -> PatrolPhase {
        self.phase
    }

    pub fn dwell_elapsed(&self) -> f64 {
        self.dwell_elapsed
    }

    pub fn dwell_budget(&self) -> Option<f64> {
        self.dwell_budget
    }

    pub fn transit_elapsed(&self) -> f64 {
        self.transit_elapsed
    }

    pub fn transit_budget(&self) -> Option<f64> {
        self.transit_budget
    }

    pub fn pending(&self) -> Option<PendingCallback> {
        self.pending
    }

    pub fn angular(&self) -> &AngularIntegrator {
        &self.angular
    }

    pub fn linear(&self) -> &LinearIntegrator {
        &self.linear
    }

    pub fn events(&self) -> &PatrolEventLog {
        &self.log
    }

    pub fn streams(&self) -> &DrawStreams {
        &self.streams
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    /// Capture the patrol state
    pub fn snapshot(&self) -> Result<PatrolSnapshot, PatrolError> {
        Ok(PatrolSnapshot {
            id: self.id,
            phase: self.phase,
            dwell_elapsed: self.dwell_elapsed,
            dwell_budget: self.dwell_budget,
            transit_elapsed: self.transit_elapsed,
            transit_budget: self.transit_budget,
            angular: self.angular.clone(),
            linear: self.linear.clone(),
            pending: self.pending.map(|p| PendingSnapshot {
                at: p.at,
                action: p.action,
                order: p.handle.0,
            }),
            top_position: self.top_position,
            mode_label: self.mode_label.clone(),
            stream_states: self.streams.checkpoint_states(),
            config_hash: compute_config_hash(&self.config)?,
        })
    }

    /// Rebuild a patrol from a snapshot and re-arm its pending callback
    ///
    /// # Errors
    /// - [`PatrolError::ConfigMismatch`] if `config` is not the configuration
    ///   the snapshot was taken with
    /// - [`PatrolError::StaleCheckpoint`] if the pending callback lies before
    ///   the scheduler's current time
    pub fn restore(
        snapshot: PatrolSnapshot,
        config: PatrolConfig,
        streams: DrawStreams,
        sched: &mut dyn Scheduler,
    ) -> Result<Self, PatrolError> {
        let actual = compute_config_hash(&config)?;
        if actual != snapshot.config_hash {
            return Err(PatrolError::ConfigMismatch {
                expected: snapshot.config_hash,
                actual,
            });
        }
        if let Some(pending) = &snapshot.pending {
            if pending.at < sched.now() {
                return Err(PatrolError::StaleCheckpoint {
                    pending_at: pending.at,
                    now: sched.now(),
                });
            }
        }

        let mut patrol = Self::new(snapshot.id, config, streams)?;
        patrol.phase = snapshot.phase;
        patrol.dwell_elapsed = snapshot.dwell_elapsed;
        patrol.dwell_budget = snapshot.dwell_budget;
        patrol.transit_elapsed = snapshot.transit_elapsed;
        patrol.transit_budget = snapshot.transit_budget;
        patrol.angular = snapshot.angular;
        patrol.linear = snapshot.linear;
        patrol.top_position = snapshot.top_position;
        patrol.mode_label = snapshot.mode_label;
        if let Some(pending) = snapshot.pending {
            patrol.schedule(sched, pending.at, pending.action);
        }
        Ok(patrol)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn rate_for_radius(&self, radius: f64) -> Result<AngularRate, PatrolError> {
        AngularRate::for_radius(
            radius,
            self.config.tangential_velocity,
            self.config.orbit_spacing,
        )
    }

    /// Point the angular integrator at `position` with the rate of its ring
    fn configure_orbit(&mut self, position: DVec3, now: SimTime) -> Result<AngularRate, PatrolError> {
        let radius = planar_distance(position, self.config.center);
        let rate = self.rate_for_radius(radius)?;
        tracing::debug!(
            patrol = %self.id,
            omega = rate.magnitude,
            sign = rate.sign,
            radius,
            "configuring angular rate"
        );
        self.angular.set_center(self.config.center, now);
        self.angular.set_position(position, now);
        self.angular.set_rate(rate, now);
        Ok(rate)
    }

    fn schedule(&mut self, sched: &mut dyn Scheduler, at: SimTime, action: PatrolAction) {
        debug_assert!(
            self.pending.is_none(),
            "{} already has a pending callback",
            self.id
        );
        let handle = sched.schedule_at(at, self.id, action);
        self.pending = Some(PendingCallback { handle, at, action });
    }

    fn cancel_pending(&mut self, sched: &mut dyn Scheduler) {
        if let Some(pending) = self.pending.take() {
            sched.cancel(pending.handle);
        }
    }

    fn notify_course_change(&mut self, now: SimTime) {
        let change = CourseChange {
            time: now,
            patrol: self.id,
            position: self.position(),
            velocity: self.velocity(),
        };
        for observer in &mut self.observers {
            observer.on_course_change(&change);
        }
    }
}
