//! Animation bookkeeping
//!
//! [`AnimationState`] answers "does the render loop need another frame?".
//! Each component registers a named predicate once; the aggregate keeps
//! reporting `true` for one frame after every predicate went false so the
//! settled end state gets drawn.

use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

/// Identifies a registered animation predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationId {
    /// Zoom ramping in or out after the pointer entered/left the dock
    ZoomIn,
    /// Dock sliding toward hidden or visible
    HideSlide,
    /// An item sliding one slot after a reorder
    ItemSlide,
    /// Newly added items fading in
    ItemAdded,
    /// Removed items fading out
    ItemRemoved,
    /// Click feedback (bounce, darken, lighten)
    Click,
    /// Urgent bounce or state glow
    ItemState,
    /// A drag session is live
    Drag,
    /// The pointer moved since the last frame
    PointerMotion,
}

type Predicate<C> = Box<dyn Fn(&C, Instant) -> bool>;

/// Registry of named "still animating" predicates over a context `C`
pub struct AnimationState<C> {
    conditions: Vec<(AnimationId, Predicate<C>)>,
    previous: Cell<bool>,
}

impl<C> Default for AnimationState<C> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            previous: Cell::new(false),
        }
    }
}

impl<C> fmt::Debug for AnimationState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<AnimationId> = self.conditions.iter().map(|(id, _)| *id).collect();
        f.debug_struct("AnimationState")
            .field("conditions", &ids)
            .field("previous", &self.previous.get())
            .finish()
    }
}

impl<C> AnimationState<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate
    ///
    /// # Panics
    /// If `id` is already registered.
    pub fn add_condition(&mut self, id: AnimationId, predicate: impl Fn(&C, Instant) -> bool + 'static) {
        assert!(
            !self.conditions.iter().any(|(existing, _)| *existing == id),
            "animation condition {:?} registered twice",
            id
        );
        self.conditions.push((id, Box::new(predicate)));
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.conditions.iter().any(|(existing, _)| *existing == id)
    }

    /// Evaluate one predicate; unknown ids are false
    pub fn is_active(&self, id: AnimationId, ctx: &C, now: Instant) -> bool {
        self.conditions
            .iter()
            .find(|(existing, _)| *existing == id)
            .is_some_and(|(_, predicate)| predicate(ctx, now))
    }

    /// Ids whose predicate is currently true
    pub fn active_ids(&self, ctx: &C, now: Instant) -> Vec<AnimationId> {
        self.conditions
            .iter()
            .filter(|(_, predicate)| predicate(ctx, now))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Read once per frame: `previous || current`, then remember `current`
    pub fn animation_needed(&self, ctx: &C, now: Instant) -> bool {
        let current = self.conditions.iter().any(|(_, predicate)| predicate(ctx, now));
        let needed = self.previous.get() || current;
        self.previous.set(current);
        needed
    }

    /// Forget the hysteresis frame
    pub fn reset(&self) {
        self.previous.set(false);
    }
}

/// True while `since` lies within `duration` before `now`
pub fn within(since: Option<Instant>, duration: Duration, now: Instant) -> bool {
    since.is_some_and(|t| now.saturating_duration_since(t) < duration)
}

/// Progress of an animation started at `since`, in `[0, 1]`
pub fn progress(since: Instant, duration: Duration, now: Instant) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(since).as_secs_f32();
    (elapsed / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// A value easing between 0 (off) and 1 (on) over a fixed duration
///
/// Flipping direction mid-way continues from the current value instead of
/// jumping to the far end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    on: bool,
    since: Option<Instant>,
    duration: Duration,
}

impl Ramp {
    /// A settled ramp
    pub fn new(on: bool, duration: Duration) -> Self {
        Self {
            on,
            since: None,
            duration,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Change direction. Returns false if already heading that way.
    pub fn set(&mut self, on: bool, now: Instant) -> bool {
        if self.on == on {
            return false;
        }
        let remaining = 1.0 - self.value(now);
        let remaining = if on { remaining } else { 1.0 - remaining };
        // Start far enough in the past that the value is unchanged
        let head_start = self.duration.mul_f32(1.0 - remaining.clamp(0.0, 1.0));
        self.on = on;
        self.since = Some(now.checked_sub(head_start).unwrap_or(now));
        true
    }

    /// Current value in `[0, 1]`
    pub fn value(&self, now: Instant) -> f32 {
        let p = match self.since {
            Some(since) => progress(since, self.duration, now),
            None => 1.0,
        };
        if self.on {
            p
        } else {
            1.0 - p
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        within(self.since, self.duration, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_reverses_without_jump() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let d = Duration::from_millis(100);
        let mut ramp = Ramp::new(false, d);
        assert_eq!(ramp.value(t0), 0.0);
        assert!(!ramp.is_animating(t0));

        assert!(ramp.set(true, t0));
        assert!(!ramp.set(true, t0));
        let mid = t0 + Duration::from_millis(30);
        let before = ramp.value(mid);
        assert!((before - 0.3).abs() < 1e-3);

        ramp.set(false, mid);
        assert!((ramp.value(mid) - before).abs() < 1e-3);
        assert!(ramp.is_animating(mid));
        assert_eq!(ramp.value(mid + d), 0.0);
    }

    #[test]
    fn test_one_extra_frame_after_settle() {
        let mut state: AnimationState<Cell<bool>> = AnimationState::new();
        state.add_condition(AnimationId::ZoomIn, |flag: &Cell<bool>, _| flag.get());

        let now = Instant::now();
        let flag = Cell::new(true);

        // Frame N
        assert!(state.animation_needed(&flag, now));
        flag.set(false);
        // Frame N+1: settled, but one more frame
        assert!(state.animation_needed(&flag, now));
        // N+2 onward
        assert!(!state.animation_needed(&flag, now));
        assert!(!state.animation_needed(&flag, now));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let mut state: AnimationState<()> = AnimationState::new();
        state.add_condition(AnimationId::Click, |_, _| false);
        state.add_condition(AnimationId::Click, |_, _| true);
    }

    #[test]
    fn test_query_single_condition() {
        let mut state: AnimationState<()> = AnimationState::new();
        state.add_condition(AnimationId::Click, |_, _| true);
        state.add_condition(AnimationId::Drag, |_, _| false);

        let now = Instant::now();
        assert!(state.is_active(AnimationId::Click, &(), now));
        assert!(!state.is_active(AnimationId::Drag, &(), now));
        assert!(!state.is_active(AnimationId::ZoomIn, &(), now));
        assert_eq!(state.active_ids(&(), now), vec![AnimationId::Click]);
    }

    #[test]
    fn test_progress_clamps() {
        let t0 = Instant::now();
        let d = Duration::from_millis(100);
        assert_eq!(progress(t0, d, t0), 0.0);
        assert!((progress(t0, d, t0 + Duration::from_millis(50)) - 0.5).abs() < 1e-6);
        assert_eq!(progress(t0, d, t0 + Duration::from_secs(1)), 1.0);
        assert_eq!(progress(t0, Duration::ZERO, t0), 1.0);
    }

    #[test]
    fn test_within() {
        let t0 = Instant::now();
        let d = Duration::from_millis(100);
        assert!(within(Some(t0), d, t0 + Duration::from_millis(99)));
        assert!(!within(Some(t0), d, t0 + d));
        assert!(!within(None, d, t0));
    }
}
