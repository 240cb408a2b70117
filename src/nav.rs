//! Navigation state machine for route walkthroughs.
//!
//! Drives the overview/step traversal of a parsed route, with three ways to
//! advance: manual next/previous, a periodic auto-advance timer, and a
//! simulated drive-through that walks the route polyline at fixed arc-length
//! spacing and emits `{position, bearing}` frames for the imagery viewport.
//!
//! The controller is single-threaded and cooperative: it owns no real
//! timers. The embedding event loop schedules the two periodic intervals and
//! calls [`NavigationController::auto_tick`] / [`NavigationController::drive_tick`]
//! with the [`TimerId`] it was issued by the matching `start_*` call. Each
//! timer kind has a single owner slot: starting one invalidates the previous
//! id of that kind, and a tick carrying a stale id is ignored. Stopping is
//! therefore synchronous: once `stop` runs, no pending tick can act.

use log::debug;
use std::time::Duration;

use crate::geo_utils::{initial_bearing, sample_path_by_spacing};
use crate::GeoPoint;

/// Interval of the auto-advance timer.
pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_millis(3500);

/// Interval of the drive-through timer.
pub const DRIVE_TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// Arc-length spacing of drive-through samples along the route polyline.
pub const DRIVE_SAMPLE_SPACING_M: f64 = 30.0;

/// Which view the controller currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// The whole route.
    Overview,
    /// One step, 0-indexed into the parsed step sequence.
    Step(usize),
}

/// The two timer kinds the controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    AutoAdvance,
    Drive,
}

impl TimerKind {
    /// The fixed interval the embedding loop should schedule this timer at.
    pub fn interval(&self) -> Duration {
        match self {
            TimerKind::AutoAdvance => AUTO_ADVANCE_INTERVAL,
            TimerKind::Drive => DRIVE_TICK_INTERVAL,
        }
    }
}

/// Handle identifying one started timer instance.
///
/// Ticks must present the id they were issued; an id invalidated by a stop,
/// a restart, or teardown is silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    kind: TimerKind,
    generation: u64,
}

impl TimerId {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

/// Single-owner slot for one timer kind.
///
/// Holds at most one live generation; starting bumps the generation, which
/// invalidates any previously issued id of this kind.
#[derive(Debug, Default)]
struct TimerSlot {
    live: Option<u64>,
    next_generation: u64,
}

impl TimerSlot {
    fn start(&mut self, kind: TimerKind) -> TimerId {
        self.next_generation += 1;
        self.live = Some(self.next_generation);
        TimerId {
            kind,
            generation: self.next_generation,
        }
    }

    /// Idempotent.
    fn stop(&mut self) {
        self.live = None;
    }

    fn accepts(&self, id: &TimerId) -> bool {
        self.live == Some(id.generation)
    }

    fn is_running(&self) -> bool {
        self.live.is_some()
    }
}

/// One drive-through frame for the (external) imagery viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveFrame {
    pub position: GeoPoint,
    /// Forward bearing in degrees [0, 360).
    pub bearing: f64,
}

#[derive(Debug)]
struct DriveState {
    samples: Vec<GeoPoint>,
    cursor: usize,
    last_bearing: f64,
}

/// State machine for overview/step traversal, auto-advance, and simulated
/// drive-through.
///
/// All transitions are synchronous and re-entrant safe: repeated rapid calls
/// cannot advance past bounds, and manual input always wins over a running
/// auto-advance timer.
#[derive(Debug)]
pub struct NavigationController {
    step_count: usize,
    mode: ViewMode,
    auto: TimerSlot,
    drive_timer: TimerSlot,
    drive: Option<DriveState>,
}

impl NavigationController {
    /// Create a controller over a parsed route with `step_count` steps.
    pub fn new(step_count: usize) -> Self {
        Self {
            step_count,
            mode: ViewMode::Overview,
            auto: TimerSlot::default(),
            drive_timer: TimerSlot::default(),
            drive: None,
        }
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The current step index, if a step view is active.
    pub fn current_step(&self) -> Option<usize> {
        match self.mode {
            ViewMode::Step(i) => Some(i),
            ViewMode::Overview => None,
        }
    }

    pub fn is_auto_advancing(&self) -> bool {
        self.auto.is_running()
    }

    pub fn is_driving(&self) -> bool {
        self.drive.is_some()
    }

    // ------------------------------------------------------------------
    // Manual traversal
    // ------------------------------------------------------------------

    /// Enter the step walkthrough at step 0.
    ///
    /// Only valid from the overview of a route with at least one step, and
    /// not while a drive-through is running. Returns whether the transition
    /// happened.
    pub fn start_walkthrough(&mut self) -> bool {
        if self.mode != ViewMode::Overview || self.step_count == 0 || self.is_driving() {
            return false;
        }
        self.mode = ViewMode::Step(0);
        true
    }

    /// Advance to the next step. No-op at the last step.
    ///
    /// Manual input wins: a running auto-advance timer is stopped first.
    pub fn next(&mut self) {
        self.auto.stop();
        self.advance();
    }

    /// Go back one step. No-op at step 0.
    ///
    /// Manual input wins: a running auto-advance timer is stopped first.
    pub fn previous(&mut self) {
        self.auto.stop();
        if let ViewMode::Step(i) = self.mode {
            if i > 0 {
                self.mode = ViewMode::Step(i - 1);
            }
        }
    }

    /// Return to the route overview. Always available; stops auto-advance.
    pub fn back_to_overview(&mut self) {
        self.auto.stop();
        self.mode = ViewMode::Overview;
    }

    /// Advance the step index without touching the timer slot.
    fn advance(&mut self) {
        if let ViewMode::Step(i) = self.mode {
            if i + 1 < self.step_count {
                self.mode = ViewMode::Step(i + 1);
            }
        }
    }

    // ------------------------------------------------------------------
    // Auto-advance
    // ------------------------------------------------------------------

    /// Start the auto-advance timer.
    ///
    /// Only meaningful during a step walkthrough; returns `None` from the
    /// overview. Any previously running auto-advance instance is stopped
    /// first, so at most one is ever live.
    pub fn start_auto_advance(&mut self) -> Option<TimerId> {
        if self.current_step().is_none() {
            return None;
        }
        self.auto.stop();
        Some(self.auto.start(TimerKind::AutoAdvance))
    }

    /// Stop auto-advance. Idempotent.
    pub fn stop_auto_advance(&mut self) {
        self.auto.stop();
    }

    /// One firing of the auto-advance timer.
    ///
    /// Ignored unless `id` is the live auto-advance instance. Advances one
    /// step; reaching the last step stops the timer (terminal, non-looping).
    /// Returns whether the tick was accepted.
    pub fn auto_tick(&mut self, id: TimerId) -> bool {
        if !self.auto.accepts(&id) {
            return false;
        }
        self.advance();
        if self.current_step() == Some(self.step_count.saturating_sub(1)) {
            debug!("auto-advance reached final step, stopping");
            self.auto.stop();
        }
        true
    }

    // ------------------------------------------------------------------
    // Drive-through
    // ------------------------------------------------------------------

    /// Enter the simulated drive-through over the decoded route path.
    ///
    /// Only valid from the overview. The path is sampled at
    /// [`DRIVE_SAMPLE_SPACING_M`] arc length; a previously running
    /// drive-through is stopped first. Returns `None` from a step view or
    /// for an empty path.
    pub fn start_driving(&mut self, route_path: &[GeoPoint]) -> Option<TimerId> {
        if self.mode != ViewMode::Overview {
            return None;
        }
        self.stop_driving();

        let samples = sample_path_by_spacing(route_path, DRIVE_SAMPLE_SPACING_M);
        if samples.is_empty() {
            return None;
        }

        let initial = if samples.len() > 1 {
            initial_bearing(&samples[0], &samples[1])
        } else {
            0.0
        };
        debug!("drive-through started with {} samples", samples.len());

        self.drive = Some(DriveState {
            samples,
            cursor: 0,
            last_bearing: initial,
        });
        Some(self.drive_timer.start(TimerKind::Drive))
    }

    /// Stop the drive-through. Always available, idempotent; cancels the
    /// timer and clears pointer state unconditionally.
    pub fn stop_driving(&mut self) {
        self.drive_timer.stop();
        self.drive = None;
    }

    /// One firing of the drive-through timer.
    ///
    /// Ignored unless `id` is the live drive instance. Emits the frame at
    /// the current sample with a forward-difference bearing toward the next
    /// sample (the last sample reuses the prior bearing), then advances the
    /// pointer. Emitting the final sample stops the timer and exits the
    /// drive-through.
    pub fn drive_tick(&mut self, id: TimerId) -> Option<DriveFrame> {
        if !self.drive_timer.accepts(&id) {
            return None;
        }
        let state = self.drive.as_mut()?;

        let position = state.samples[state.cursor];
        let bearing = match state.samples.get(state.cursor + 1) {
            Some(next) => initial_bearing(&position, next),
            None => state.last_bearing,
        };
        state.last_bearing = bearing;
        state.cursor += 1;

        if state.cursor >= state.samples.len() {
            debug!("drive-through reached final sample, stopping");
            self.stop_driving();
        }

        Some(DriveFrame { position, bearing })
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Cancel both timers and clear drive state. Called on view teardown so
    /// no timer outlives the view. Idempotent.
    pub fn teardown(&mut self) {
        self.auto.stop();
        self.stop_driving();
    }
}
