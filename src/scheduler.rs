//! Repeating timers.
//!
//! A [`Scheduler`] only announces ticks. Whoever owns the clock receives each
//! [`TimerHandle`] as it fires and hands it to
//! [`RetroClock::on_tick`](crate::clock::RetroClock::on_tick) on a single
//! thread, so ticks for one clock never overlap.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::Sender,
    Arc,
};
use std::time::{Duration, Instant};

/// Shortest interval a scheduler will honor.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Identifies one repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Schedules and cancels repeating ticks.
pub trait Scheduler {
    /// Starts a timer that fires every `interval`, first after one interval.
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle;

    /// Stops a timer. Cancelling an unknown or already cancelled handle does
    /// nothing.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Runs each timer on its own thread and delivers ticks over a channel.
///
/// The receiving end decides the event type: anything convertible from a
/// [`TimerHandle`] works, so ticks can share a channel with other events.
pub struct ThreadScheduler<E = TimerHandle> {
    sender: Sender<E>,
    timers: HashMap<TimerHandle, Arc<AtomicBool>>,
    next_id: u64,
}

impl<E> ThreadScheduler<E>
where
    E: From<TimerHandle> + Send + 'static,
{
    pub fn new(sender: Sender<E>) -> Self {
        Self {
            sender,
            timers: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }
}

impl<E> Scheduler for ThreadScheduler<E>
where
    E: From<TimerHandle> + Send + 'static,
{
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let interval = interval.max(MIN_INTERVAL);
        let stop = Arc::new(AtomicBool::new(false));
        let sender = self.sender.clone();

        let flag = Arc::clone(&stop);
        std::thread::spawn(move || {
            // Deadlines advance by whole intervals so ticks don't drift.
            let mut deadline = Instant::now() + interval;
            loop {
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if sender.send(E::from(handle)).is_err() {
                    log::debug!("Timer {} receiver gone, stopping", handle.id());
                    break;
                }
                deadline += interval;
            }
        });

        self.timers.insert(handle, stop);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(stop) = self.timers.remove(&handle) {
            stop.store(true, Ordering::SeqCst);
        }
    }
}

impl<E> Drop for ThreadScheduler<E> {
    fn drop(&mut self) {
        for stop in self.timers.values() {
            stop.store(true, Ordering::SeqCst);
        }
    }
}

#[derive(Debug, Clone)]
struct ManualTimer {
    handle: TimerHandle,
    interval: Duration,
    due: Duration,
}

/// A scheduler driven by virtual time, for tests and one-shot rendering.
///
/// Nothing fires until [`advance`](ManualScheduler::advance) or
/// [`fire_next`](ManualScheduler::fire_next) moves the clock forward.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn interval_of(&self, handle: TimerHandle) -> Option<Duration> {
        self.timers
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.interval)
    }

    /// When the earliest pending tick is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Fires the earliest tick due no later than `limit`, moving virtual time
    /// to it. Returns `None`, without moving time, when nothing is due.
    pub fn fire_next(&mut self, limit: Duration) -> Option<TimerHandle> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|timer| timer.due <= limit)
            .min_by_key(|timer| (timer.due, timer.handle))?;

        self.now = self.now.max(timer.due);
        timer.due += timer.interval;
        Some(timer.handle)
    }

    /// Moves virtual time forward by `by`, returning every tick that fell due
    /// in firing order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerHandle> {
        let target = self.now + by;
        let mut fired = Vec::new();
        while let Some(handle) = self.fire_next(target) {
            fired.push(handle);
        }
        self.now = target;
        fired
    }

    /// Moves virtual time to `until` without firing anything due before it.
    pub fn set_now(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let interval = interval.max(MIN_INTERVAL);
        self.timers.push(ManualTimer {
            handle,
            interval,
            due: self.now + interval,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|timer| timer.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_manual_ticks_at_interval() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_repeating(SECOND);

        assert!(scheduler.advance(Duration::from_millis(999)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), vec![handle]);
        assert_eq!(scheduler.advance(3 * SECOND), vec![handle; 3]);
        assert_eq!(scheduler.now(), 4 * SECOND);
    }

    #[test]
    fn test_manual_interleaves_timers_in_order() {
        let mut scheduler = ManualScheduler::new();
        let fast = scheduler.schedule_repeating(SECOND);
        let slow = scheduler.schedule_repeating(2 * SECOND);

        assert_eq!(
            scheduler.advance(4 * SECOND),
            vec![fast, fast, slow, fast, fast, slow]
        );
    }

    #[test]
    fn test_manual_cancel_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_repeating(SECOND);
        scheduler.cancel(handle);
        scheduler.cancel(handle);

        assert_eq!(scheduler.active_timers(), 0);
        assert!(scheduler.advance(10 * SECOND).is_empty());
        assert_eq!(scheduler.interval_of(handle), None);
    }

    #[test]
    fn test_manual_fire_next_respects_limit() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_repeating(5 * SECOND);

        assert_eq!(scheduler.fire_next(4 * SECOND), None);
        assert_eq!(scheduler.now(), Duration::ZERO);
        assert_eq!(scheduler.fire_next(5 * SECOND), Some(handle));
        assert_eq!(scheduler.now(), 5 * SECOND);
        assert_eq!(scheduler.next_due(), Some(10 * SECOND));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_repeating(Duration::ZERO);
        assert_eq!(scheduler.interval_of(handle), Some(MIN_INTERVAL));
    }

    #[test]
    fn test_thread_scheduler_delivers_and_cancels() {
        let (tx, rx) = channel::<TimerHandle>();
        let mut scheduler = ThreadScheduler::new(tx);
        let handle = scheduler.schedule_repeating(Duration::from_millis(10));

        let received = rx.recv_timeout(SECOND).unwrap();
        assert_eq!(received, handle);

        scheduler.cancel(handle);
        assert_eq!(scheduler.active_timers(), 0);
        // Drain anything already in flight, then expect silence.
        std::thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
