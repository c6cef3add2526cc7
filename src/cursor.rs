//! Pointer tracking
//!
//! One [`CursorTracker`] per display keeps the freshest pointer sample. It
//! takes samples pushed from input events and also polls the display on a
//! timer whose period depends on how many components asked for high
//! resolution. Trackers live in a [`CursorRegistry`] owned by the model.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bitflags::bitflags;

use crate::geometry::Point;
use crate::messages::TimerKind;
use crate::timer::{Scheduler, TimerHandle};

/// Poll period while any high-resolution request is outstanding
pub const HIGH_RES_INTERVAL: Duration = Duration::from_millis(20);
/// Poll period otherwise
pub const LOW_RES_INTERVAL: Duration = Duration::from_millis(250);
/// Pushed samples jumping further than this are re-checked by polling
pub const SPURIOUS_JUMP_THRESHOLD: f32 = 400.0;

bitflags! {
    /// Keyboard modifiers and held pointer buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
    }
}

impl Modifiers {
    pub fn any_button(&self) -> bool {
        self.intersects(Modifiers::BUTTON1 | Modifiers::BUTTON2 | Modifiers::BUTTON3)
    }
}

/// Identifies a display surface (screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayId(pub u32);

impl DisplayId {
    pub const PRIMARY: DisplayId = DisplayId(0);
}

/// Latest known pointer state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSample {
    pub position: Point,
    pub modifiers: Modifiers,
    pub display: DisplayId,
    pub timestamp: Instant,
}

/// Emitted when an accepted sample moved the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorChange {
    /// Position before this sample
    pub previous: Point,
    pub sample: CursorSample,
}

/// Who asked for high-resolution polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionOwner {
    /// The pointer is over the dock (zoom follows it)
    Hover,
    /// A drag session is live
    Drag,
    /// An external caller, keyed by an arbitrary id
    External(u32),
}

/// Pointer position provider for polling
///
/// Returns `None` when the display does not answer; that tick is skipped.
pub trait PointerSource {
    fn query(&self, display: DisplayId) -> Option<(Point, Modifiers)>;
}

/// A source that never answers; pushed samples are then the only input
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPointerSource;

impl PointerSource for NullPointerSource {
    fn query(&self, _display: DisplayId) -> Option<(Point, Modifiers)> {
        None
    }
}

/// Pointer tracker for one display
#[derive(Debug, Clone)]
pub struct CursorTracker {
    display: DisplayId,
    sample: CursorSample,
    has_sample: bool,
    requests: HashMap<ResolutionOwner, u32>,
    interval: Duration,
    poll_timer: Option<TimerHandle>,
}

impl CursorTracker {
    pub fn new(display: DisplayId, now: Instant) -> Self {
        Self {
            display,
            sample: CursorSample {
                position: Point::new(-1.0, -1.0),
                modifiers: Modifiers::empty(),
                display,
                timestamp: now,
            },
            has_sample: false,
            requests: HashMap::new(),
            interval: LOW_RES_INTERVAL,
            poll_timer: None,
        }
    }

    pub fn display(&self) -> DisplayId {
        self.display
    }

    pub fn sample(&self) -> &CursorSample {
        &self.sample
    }

    pub fn position(&self) -> Point {
        self.sample.position
    }

    pub fn has_sample(&self) -> bool {
        self.has_sample
    }

    /// Current polling period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_high_resolution(&self) -> bool {
        self.interval == HIGH_RES_INTERVAL
    }

    pub fn is_polling(&self) -> bool {
        self.poll_timer.is_some()
    }

    /// Start the polling timer at the current interval
    pub fn start(&mut self, scheduler: &mut Scheduler<TimerKind>, now: Instant) {
        scheduler.cancel_slot(&mut self.poll_timer);
        self.poll_timer = Some(scheduler.schedule_repeating(
            TimerKind::CursorPoll(self.display),
            now,
            self.interval,
        ));
    }

    /// Stop polling. Safe to call repeatedly.
    pub fn stop(&mut self, scheduler: &mut Scheduler<TimerKind>) {
        scheduler.cancel_slot(&mut self.poll_timer);
    }

    /// Ask for fast polling. Returns true if the poll timer was restarted.
    pub fn request_high_resolution(
        &mut self,
        owner: ResolutionOwner,
        scheduler: &mut Scheduler<TimerKind>,
        now: Instant,
    ) -> bool {
        *self.requests.entry(owner).or_insert(0) += 1;
        self.update_interval(scheduler, now)
    }

    /// Drop one request from `owner`. Unknown owners are ignored.
    pub fn cancel_high_resolution(
        &mut self,
        owner: ResolutionOwner,
        scheduler: &mut Scheduler<TimerKind>,
        now: Instant,
    ) -> bool {
        if let Some(count) = self.requests.get_mut(&owner) {
            *count -= 1;
            if *count == 0 {
                self.requests.remove(&owner);
            }
        }
        self.update_interval(scheduler, now)
    }

    fn update_interval(&mut self, scheduler: &mut Scheduler<TimerKind>, now: Instant) -> bool {
        let interval = if self.requests.is_empty() {
            LOW_RES_INTERVAL
        } else {
            HIGH_RES_INTERVAL
        };

        if interval == self.interval {
            return false;
        }

        tracing::debug!(
            display = self.display.0,
            interval_ms = interval.as_millis() as u64,
            "cursor poll interval changed"
        );
        self.interval = interval;

        if self.poll_timer.is_some() {
            self.start(scheduler, now);
            return true;
        }
        false
    }

    /// Accept a sample pushed from an input event
    ///
    /// A jump larger than [`SPURIOUS_JUMP_THRESHOLD`] is not trusted; the
    /// display is polled instead and that answer (if any) is used.
    pub fn submit_sample(
        &mut self,
        position: Point,
        modifiers: Modifiers,
        source: &dyn PointerSource,
        now: Instant,
    ) -> Option<CursorChange> {
        if self.has_sample && self.sample.position.distance(position) > SPURIOUS_JUMP_THRESHOLD {
            tracing::debug!(
                from_x = self.sample.position.x,
                from_y = self.sample.position.y,
                to_x = position.x,
                to_y = position.y,
                "suspicious pointer jump, polling instead"
            );
            return self.poll(source, now);
        }
        self.accept(position, modifiers, now)
    }

    /// Query the display for the current pointer state
    pub fn poll(&mut self, source: &dyn PointerSource, now: Instant) -> Option<CursorChange> {
        let (position, modifiers) = source.query(self.display)?;
        self.accept(position, modifiers, now)
    }

    /// The pointer left the display surface; park it off-screen
    pub fn leave(&mut self, now: Instant) -> Option<CursorChange> {
        let modifiers = self.sample.modifiers;
        self.accept(Point::new(-1.0, -1.0), modifiers, now)
    }

    fn accept(&mut self, position: Point, modifiers: Modifiers, now: Instant) -> Option<CursorChange> {
        let previous = self.sample.position;
        let moved = !self.has_sample || previous != position;

        self.sample = CursorSample {
            position,
            modifiers,
            display: self.display,
            timestamp: now,
        };
        self.has_sample = true;

        moved.then_some(CursorChange {
            previous,
            sample: self.sample,
        })
    }
}

/// Trackers keyed by display, owned by the application root
#[derive(Debug, Clone, Default)]
pub struct CursorRegistry {
    trackers: HashMap<DisplayId, CursorTracker>,
}

impl CursorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker for `display`, created on first use
    pub fn tracker(&mut self, display: DisplayId, now: Instant) -> &mut CursorTracker {
        self.trackers
            .entry(display)
            .or_insert_with(|| CursorTracker::new(display, now))
    }

    pub fn get(&self, display: DisplayId) -> Option<&CursorTracker> {
        self.trackers.get(&display)
    }

    pub fn get_mut(&mut self, display: DisplayId) -> Option<&mut CursorTracker> {
        self.trackers.get_mut(&display)
    }

    /// Stop every tracker's timer
    pub fn stop_all(&mut self, scheduler: &mut Scheduler<TimerKind>) {
        for tracker in self.trackers.values_mut() {
            tracker.stop(scheduler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedSource(Cell<Option<(Point, Modifiers)>>);

    impl PointerSource for FixedSource {
        fn query(&self, _display: DisplayId) -> Option<(Point, Modifiers)> {
            self.0.get()
        }
    }

    fn tracker() -> (CursorTracker, Scheduler<TimerKind>, Instant) {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        let mut tracker = CursorTracker::new(DisplayId::PRIMARY, now);
        tracker.start(&mut scheduler, now);
        (tracker, scheduler, now)
    }

    #[test]
    fn test_low_resolution_by_default() {
        let (tracker, scheduler, _) = tracker();
        assert_eq!(tracker.interval(), LOW_RES_INTERVAL);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_request_and_cancel_switch_interval() {
        let (mut tracker, mut scheduler, now) = tracker();

        assert!(tracker.request_high_resolution(ResolutionOwner::Hover, &mut scheduler, now));
        assert_eq!(tracker.interval(), HIGH_RES_INTERVAL);

        assert!(tracker.cancel_high_resolution(ResolutionOwner::Hover, &mut scheduler, now));
        assert_eq!(tracker.interval(), LOW_RES_INTERVAL);
        assert_eq!(scheduler.len(), 1, "restart must not leak timers");
    }

    #[test]
    fn test_timer_restarts_only_on_change() {
        let (mut tracker, mut scheduler, now) = tracker();

        assert!(tracker.request_high_resolution(ResolutionOwner::Hover, &mut scheduler, now));
        assert!(!tracker.request_high_resolution(ResolutionOwner::Drag, &mut scheduler, now));
        assert!(!tracker.cancel_high_resolution(ResolutionOwner::Hover, &mut scheduler, now));
        assert_eq!(tracker.interval(), HIGH_RES_INTERVAL);
        assert!(tracker.cancel_high_resolution(ResolutionOwner::Drag, &mut scheduler, now));
    }

    #[test]
    fn test_requests_are_counted_per_owner() {
        let (mut tracker, mut scheduler, now) = tracker();

        tracker.request_high_resolution(ResolutionOwner::Hover, &mut scheduler, now);
        tracker.request_high_resolution(ResolutionOwner::Hover, &mut scheduler, now);
        tracker.cancel_high_resolution(ResolutionOwner::Hover, &mut scheduler, now);
        assert!(tracker.is_high_resolution());
        tracker.cancel_high_resolution(ResolutionOwner::Hover, &mut scheduler, now);
        assert!(!tracker.is_high_resolution());
    }

    #[test]
    fn test_cancel_without_request_is_noop() {
        let (mut tracker, mut scheduler, now) = tracker();
        assert!(!tracker.cancel_high_resolution(ResolutionOwner::Drag, &mut scheduler, now));
        assert_eq!(tracker.interval(), LOW_RES_INTERVAL);
    }

    #[test]
    fn test_change_carries_previous_position() {
        let (mut tracker, _, now) = tracker();
        let source = NullPointerSource;

        tracker.submit_sample(Point::new(10.0, 10.0), Modifiers::empty(), &source, now);
        let change = tracker
            .submit_sample(Point::new(20.0, 12.0), Modifiers::empty(), &source, now)
            .expect("moved");
        assert_eq!(change.previous, Point::new(10.0, 10.0));
        assert_eq!(change.sample.position, Point::new(20.0, 12.0));
    }

    #[test]
    fn test_same_position_emits_nothing() {
        let (mut tracker, _, now) = tracker();
        let source = NullPointerSource;

        tracker.submit_sample(Point::new(10.0, 10.0), Modifiers::empty(), &source, now);
        assert!(tracker
            .submit_sample(Point::new(10.0, 10.0), Modifiers::SHIFT, &source, now)
            .is_none());
        assert_eq!(tracker.sample().modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn test_spurious_jump_polls_instead() {
        let (mut tracker, _, now) = tracker();
        let source = FixedSource(Cell::new(Some((Point::new(15.0, 10.0), Modifiers::empty()))));

        tracker.submit_sample(Point::new(10.0, 10.0), Modifiers::empty(), &source, now);
        let change = tracker
            .submit_sample(Point::new(5000.0, 10.0), Modifiers::empty(), &source, now)
            .expect("poll answered");
        assert_eq!(change.sample.position, Point::new(15.0, 10.0));
    }

    #[test]
    fn test_unanswered_poll_keeps_sample() {
        let (mut tracker, _, now) = tracker();
        let source = FixedSource(Cell::new(None));

        tracker.submit_sample(Point::new(10.0, 10.0), Modifiers::empty(), &source, now);
        assert!(tracker.poll(&source, now).is_none());
        assert!(tracker
            .submit_sample(Point::new(9000.0, 10.0), Modifiers::empty(), &source, now)
            .is_none());
        assert_eq!(tracker.position(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut tracker, mut scheduler, _) = tracker();
        tracker.stop(&mut scheduler);
        tracker.stop(&mut scheduler);
        assert!(scheduler.is_empty());
        assert!(!tracker.is_polling());
    }

    #[test]
    fn test_registry_creates_once() {
        let now = Instant::now();
        let mut registry = CursorRegistry::new();
        registry.tracker(DisplayId(1), now);
        registry.tracker(DisplayId(1), now);
        assert!(registry.get(DisplayId(1)).is_some());
        assert!(registry.get(DisplayId(2)).is_none());
    }
}
