//! Time sources for arrival and discharge stamps.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::EpochMillis;

/// Supplies timestamps to the engine.
///
/// Implementations must be strictly monotonic: every call to
/// [`now`](Clock::now) returns a value greater than the previous one, so
/// arrival stamps never tie.
pub trait Clock {
    /// Returns the next timestamp.
    fn now(&mut self) -> EpochMillis;

    /// Notes an externally produced timestamp (e.g. restored from disk);
    /// later calls to [`now`](Clock::now) return values after it.
    fn observe(&mut self, at: EpochMillis);
}

/// Wall-clock epoch milliseconds, bumped by one when the wall clock has
/// not advanced since the previous call.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    last: EpochMillis,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> EpochMillis {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as EpochMillis)
            .unwrap_or(0);
        let next = wall.max(self.last.saturating_add(1));
        self.last = next;
        next
    }

    fn observe(&mut self, at: EpochMillis) {
        self.last = self.last.max(at);
    }
}

/// Deterministic clock: starts at a fixed instant and advances by a fixed
/// step on every call.
///
/// # Examples
///
/// ```
/// use u_bedalloc::allocation::{Clock, ManualClock};
///
/// let mut clock = ManualClock::new(1_000);
/// assert_eq!(clock.now(), 1_000);
/// assert_eq!(clock.now(), 1_001);
/// clock.advance(50);
/// assert_eq!(clock.now(), 1_052);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    next: EpochMillis,
    step: EpochMillis,
}

impl ManualClock {
    /// Starts at `start` with a step of one millisecond.
    pub fn new(start: EpochMillis) -> Self {
        Self {
            next: start,
            step: 1,
        }
    }

    /// Sets the step between consecutive readings (at least 1).
    pub fn with_step(mut self, step: EpochMillis) -> Self {
        self.step = step.max(1);
        self
    }

    /// Skips ahead without producing a reading.
    pub fn advance(&mut self, by: EpochMillis) {
        self.next = self.next.saturating_add(by.max(0));
    }

    /// The value the next call to [`Clock::now`] returns.
    pub fn peek(&self) -> EpochMillis {
        self.next
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> EpochMillis {
        let at = self.next;
        self.next = self.next.saturating_add(self.step);
        at
    }

    fn observe(&mut self, at: EpochMillis) {
        self.next = self.next.max(at.saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_strictly_monotonic() {
        let mut clock = SystemClock::new();
        let mut prev = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next > prev, "clock went from {prev} to {next}");
            prev = next;
        }
    }

    #[test]
    fn test_system_clock_observe_future() {
        let mut clock = SystemClock::new();
        let far = clock.now() + 10_000_000;
        clock.observe(far);
        assert!(clock.now() > far);
    }

    #[test]
    fn test_manual_clock_step_and_observe() {
        let mut clock = ManualClock::new(10).with_step(5);
        assert_eq!(clock.now(), 10);
        assert_eq!(clock.now(), 15);
        clock.observe(100);
        assert_eq!(clock.now(), 101);
        // Observing the past has no effect.
        clock.observe(3);
        assert_eq!(clock.peek(), 106);
    }

    #[test]
    fn test_clocks_saturate_at_max() {
        let mut manual = ManualClock::new(0);
        manual.observe(EpochMillis::MAX);
        assert_eq!(manual.now(), EpochMillis::MAX);
        assert_eq!(manual.now(), EpochMillis::MAX);

        let mut system = SystemClock::new();
        system.observe(EpochMillis::MAX);
        assert_eq!(system.now(), EpochMillis::MAX);
    }
}
