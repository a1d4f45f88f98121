//! Timer abstraction for the wheel idle timeout, the double-tap window and
//! transition progress.
//!
//! The controller never sleeps or spawns; it asks the scheduler for the
//! current time and for timers that have come due, and the host calls
//! [`ZoomController::tick`](crate::ZoomController::tick) on every animation
//! frame or timer wake-up.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub trait Scheduler {
    /// Monotonic time since the scheduler was created.
    fn now(&self) -> Duration;

    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    /// Cancelling an expired or unknown timer is a no-op.
    fn clear_timeout(&mut self, id: TimerId);

    /// Remove and return every timer whose deadline has passed, earliest
    /// first.
    fn take_due(&mut self) -> Vec<TimerId>;
}

#[derive(Debug, Default)]
struct TimerQueue {
    next_id: u64,
    deadlines: BTreeMap<TimerId, Duration>,
}

impl TimerQueue {
    fn insert(&mut self, deadline: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.deadlines.insert(id, deadline);
        id
    }

    fn remove(&mut self, id: TimerId) {
        self.deadlines.remove(&id);
    }

    fn take_due(&mut self, now: Duration) -> Vec<TimerId> {
        let mut due: Vec<(Duration, TimerId)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}

/// Fake clock for deterministic tests: time only moves on [`advance`].
///
/// [`advance`]: ManualScheduler::advance
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    timers: TimerQueue,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.now += delta;
    }

    pub fn advance_ms(&mut self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.deadlines.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.timers.insert(self.now + delay)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.remove(id);
    }

    fn take_due(&mut self) -> Vec<TimerId> {
        self.timers.take_due(self.now)
    }
}

/// Wall-clock scheduler backed by [`Instant`].
#[derive(Debug)]
pub struct SystemScheduler {
    epoch: Instant,
    timers: TimerQueue,
}

impl SystemScheduler {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            timers: TimerQueue::default(),
        }
    }

    /// Time until the earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = self.now();
        self.timers
            .deadlines
            .values()
            .min()
            .map(|deadline| deadline.saturating_sub(now))
    }
}

impl Default for SystemScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for SystemScheduler {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let deadline = self.now() + delay;
        self.timers.insert(deadline)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.remove(id);
    }

    fn take_due(&mut self) -> Vec<TimerId> {
        let now = self.now();
        self.timers.take_due(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timers_fire_in_deadline_order() {
        let mut scheduler = ManualScheduler::new();
        let late = scheduler.set_timeout(Duration::from_millis(300));
        let early = scheduler.set_timeout(Duration::from_millis(100));

        scheduler.advance_ms(99);
        assert!(scheduler.take_due().is_empty());

        scheduler.advance_ms(250);
        assert_eq!(scheduler.take_due(), vec![early, late]);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let mut scheduler = ManualScheduler::new();
        let id = scheduler.set_timeout(Duration::from_millis(10));
        scheduler.clear_timeout(id);
        scheduler.advance_ms(20);
        assert!(scheduler.take_due().is_empty());
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut scheduler = ManualScheduler::new();
        let id = scheduler.set_timeout(Duration::ZERO);
        assert_eq!(scheduler.take_due(), vec![id]);
    }

    #[test]
    fn system_scheduler_reports_next_deadline() {
        let mut scheduler = SystemScheduler::new();
        assert_eq!(scheduler.next_deadline(), None);
        scheduler.set_timeout(Duration::from_secs(60));
        let remaining = scheduler.next_deadline().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(59));
    }
}
