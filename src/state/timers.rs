//! Timer Queue - Cooperative one-shot timers on a virtual clock
//!
//! The page is single-threaded: deferred work (typewriter steps, delayed
//! anchor scrolls, smooth-scroll frames) is queued here and runs only when
//! the host advances the clock. A host driving a real page advances by the
//! elapsed wall time each frame; tests advance by exact amounts.
//!
//! # Pattern
//!
//! - `set_timeout` queues a callback, returns its id
//! - `clear_timeout` cancels a pending callback
//! - `advance` moves the clock, running due callbacks in due order
//! - Callbacks may schedule further timers; those run in the same `advance`
//!   if they fall due inside the window
//!
//! # Example
//!
//! ```ignore
//! use pagefx::state::timers;
//! use std::time::Duration;
//!
//! let id = timers::set_timeout(Duration::from_millis(300), || println!("fired"));
//! timers::advance(Duration::from_millis(299)); // nothing
//! timers::advance(Duration::from_millis(1));   // "fired"
//! ```

use std::cell::RefCell;
use std::time::Duration;

/// Identifier of a scheduled timer.
pub type TimerId = usize;

// =============================================================================
// TIMER QUEUE
// =============================================================================

struct Timer {
    id: TimerId,
    due: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct TimerQueue {
    /// Virtual clock in milliseconds.
    now: u64,
    timers: Vec<Timer>,
    next_id: TimerId,
}

impl TimerQueue {
    /// Remove and return the earliest timer due at or before `limit`.
    fn pop_due(&mut self, limit: u64) -> Option<Timer> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        Some(self.timers.swap_remove(position))
    }
}

thread_local! {
    static QUEUE: RefCell<TimerQueue> = RefCell::new(TimerQueue::default());
}

fn to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Current virtual time in milliseconds.
pub fn now() -> u64 {
    QUEUE.with(|q| q.borrow().now)
}

/// Schedule `callback` to run once after `delay`.
pub fn set_timeout<F>(delay: Duration, callback: F) -> TimerId
where
    F: FnOnce() + 'static,
{
    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        let id = q.next_id;
        q.next_id += 1;
        let due = q.now.saturating_add(to_millis(delay));
        q.timers.push(Timer {
            id,
            due,
            callback: Box::new(callback),
        });
        tracing::trace!(id, due, "timer scheduled");
        id
    })
}

/// Cancel a pending timer. Returns false if it already ran or never existed.
pub fn clear_timeout(id: TimerId) -> bool {
    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        let before = q.timers.len();
        q.timers.retain(|t| t.id != id);
        q.timers.len() != before
    })
}

pub fn is_pending(id: TimerId) -> bool {
    QUEUE.with(|q| q.borrow().timers.iter().any(|t| t.id == id))
}

pub fn pending_count() -> usize {
    QUEUE.with(|q| q.borrow().timers.len())
}

/// Time at which the next timer falls due.
pub fn next_due() -> Option<u64> {
    QUEUE.with(|q| q.borrow().timers.iter().map(|t| t.due).min())
}

/// Advance the clock by `by`, running every timer that falls due.
///
/// Returns the number of callbacks run.
pub fn advance(by: Duration) -> usize {
    let target = now().saturating_add(to_millis(by));
    let mut fired = 0;

    loop {
        // Release the borrow before running so callbacks can reschedule
        let next = QUEUE.with(|q| {
            let mut q = q.borrow_mut();
            let timer = q.pop_due(target)?;
            q.now = q.now.max(timer.due);
            Some(timer)
        });
        let Some(timer) = next else { break };

        tracing::trace!(id = timer.id, at = timer.due, "timer fired");
        (timer.callback)();
        fired += 1;
    }

    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        q.now = q.now.max(target);
    });
    fired
}

/// Run timers already due at the current time (zero-delay timeouts).
pub fn run_due() -> usize {
    advance(Duration::ZERO)
}

/// Drop all timers and rewind the clock (for testing).
pub fn reset_timers() {
    QUEUE.with(|q| *q.borrow_mut() = TimerQueue::default());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn setup() {
        reset_timers();
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_only_when_due() {
        setup();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        set_timeout(ms(300), move || count_clone.set(count_clone.get() + 1));

        assert_eq!(advance(ms(299)), 0);
        assert_eq!(count.get(), 0);
        assert_eq!(advance(ms(1)), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(now(), 300);
        assert_eq!(pending_count(), 0);
    }

    #[test]
    fn test_due_order_and_ties() {
        setup();

        let log = Rc::new(RefCell::new(Vec::new()));
        for (label, delay) in [("c", 50), ("a", 10), ("b", 10)] {
            let log = log.clone();
            set_timeout(ms(delay), move || log.borrow_mut().push(label));
        }

        advance(ms(100));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear_timeout() {
        setup();

        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        let id = set_timeout(ms(10), move || fired_clone.set(true));

        assert!(is_pending(id));
        assert!(clear_timeout(id));
        assert!(!clear_timeout(id));
        advance(ms(20));
        assert!(!fired.get());
    }

    #[test]
    fn test_rescheduling_inside_window() {
        setup();

        // A self-rescheduling chain: 100ms steps
        fn chain(count: Rc<Cell<u32>>, times_seen: Rc<RefCell<Vec<u64>>>) {
            set_timeout(ms(100), move || {
                count.set(count.get() + 1);
                times_seen.borrow_mut().push(now());
                chain(count, times_seen);
            });
        }

        let count = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        chain(count.clone(), seen.clone());

        advance(ms(350));
        assert_eq!(count.get(), 3);
        assert_eq!(*seen.borrow(), vec![100, 200, 300]);
        assert_eq!(pending_count(), 1);
        assert_eq!(next_due(), Some(400));
    }

    #[test]
    fn test_zero_delay() {
        setup();

        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        set_timeout(Duration::ZERO, move || fired_clone.set(true));
        assert_eq!(run_due(), 1);
        assert!(fired.get());
    }
}
