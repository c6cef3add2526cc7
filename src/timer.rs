//! Cancellable timers for the single-threaded event loop
//!
//! Every component that needs a delayed or periodic callback asks the
//! [`Scheduler`] for a [`TimerHandle`]. The runtime asks for the next
//! deadline, sleeps until then, and drains due timers back into messages.
//! Repetition is a property of the timer, not of the callback.

use std::time::{Duration, Instant};

/// Opaque handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer<K> {
    handle: TimerHandle,
    kind: K,
    deadline: Instant,
    repeat: Option<Duration>,
}

/// Timer queue keyed by handle
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    next_id: u64,
    timers: Vec<Timer<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            next_id: 1,
            timers: Vec::new(),
        }
    }
}

impl<K: Clone> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: K, deadline: Instant, repeat: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            kind,
            deadline,
            repeat,
        });
        handle
    }

    /// Fire `kind` once, `delay` after `now`
    pub fn schedule_once(&mut self, kind: K, now: Instant, delay: Duration) -> TimerHandle {
        self.push(kind, now + delay, None)
    }

    /// Fire `kind` every `interval`, first at `now + interval`
    pub fn schedule_repeating(&mut self, kind: K, now: Instant, interval: Duration) -> TimerHandle {
        self.push(kind, now + interval, Some(interval))
    }

    /// Cancel a timer. Returns false if it was not pending (already fired or
    /// cancelled); that is not an error.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        before != self.timers.len()
    }

    /// Cancel the timer stored in `slot`, if any, and clear the slot
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Interval of a repeating timer
    pub fn interval(&self, handle: TimerHandle) -> Option<Duration> {
        self.timers
            .iter()
            .find(|t| t.handle == handle)
            .and_then(|t| t.repeat)
    }

    /// Earliest deadline among pending timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Remove and return every timer due at `now`, earliest first.
    ///
    /// Repeating timers are re-armed one interval after their deadline, or one
    /// interval after `now` if the loop fell behind.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(Instant, K)> = Vec::new();
        let mut kept = Vec::with_capacity(self.timers.len());

        for mut timer in self.timers.drain(..) {
            if timer.deadline > now {
                kept.push(timer);
                continue;
            }
            due.push((timer.deadline, timer.kind.clone()));
            if let Some(interval) = timer.repeat {
                let next = timer.deadline + interval;
                timer.deadline = if next > now { next } else { now + interval };
                kept.push(timer);
            }
        }

        self.timers = kept;
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, kind)| kind).collect()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_once_fires_once() {
        let t0 = Instant::now();
        let mut s: Scheduler<&str> = Scheduler::new();
        s.schedule_once("a", t0, 10 * MS);

        assert!(s.take_due(t0 + 5 * MS).is_empty());
        assert_eq!(s.take_due(t0 + 10 * MS), vec!["a"]);
        assert!(s.take_due(t0 + 100 * MS).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn test_repeating_rearms() {
        let t0 = Instant::now();
        let mut s: Scheduler<&str> = Scheduler::new();
        let h = s.schedule_repeating("tick", t0, 20 * MS);

        assert_eq!(s.take_due(t0 + 20 * MS), vec!["tick"]);
        assert_eq!(s.next_deadline(), Some(t0 + 40 * MS));
        assert_eq!(s.interval(h), Some(20 * MS));
    }

    #[test]
    fn test_repeating_skips_missed_ticks() {
        let t0 = Instant::now();
        let mut s: Scheduler<&str> = Scheduler::new();
        s.schedule_repeating("tick", t0, 20 * MS);

        // Loop stalled for 100ms: only one tick reported
        assert_eq!(s.take_due(t0 + 100 * MS), vec!["tick"]);
        assert_eq!(s.next_deadline(), Some(t0 + 120 * MS));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut s: Scheduler<&str> = Scheduler::new();
        let h = s.schedule_once("a", t0, MS);

        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(!s.is_pending(h));

        let mut slot = None;
        s.cancel_slot(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn test_due_timers_ordered_by_deadline() {
        let t0 = Instant::now();
        let mut s: Scheduler<&str> = Scheduler::new();
        s.schedule_once("late", t0, 30 * MS);
        s.schedule_once("early", t0, 10 * MS);

        assert_eq!(s.take_due(t0 + 50 * MS), vec!["early", "late"]);
    }
}
