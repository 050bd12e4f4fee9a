//! Keyed rate-limited work queues.
//!
//! Each key names an independent process: a FIFO queue of callbacks drained
//! at most once per interval. Scheduling onto an idle process runs the
//! front of its queue immediately (synchronously); when the interval has
//! not elapsed, the process parks with a wake deadline [`RETRY_DELAY`] out,
//! and the host resumes it by calling [`RateLimiter::tick`] once
//! [`RateLimiter::next_deadline`] has passed.
//!
//! # Invariants
//!
//! 1. Per key, callbacks run in FIFO order, exactly once each, and never
//!    while the registry is borrowed.
//! 2. At most one drain cycle is live per key (`polling` flag); scheduling
//!    onto a polling process only enqueues.
//! 3. Executions for a key are at least `interval` apart, measured from the
//!    start of the previous execution.
//! 4. A non-empty queue always has a wake deadline or a running cycle:
//!    queued work cannot strand.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `tick` before any deadline | host polls early | No-op |
//! | Re-entrant schedule from a callback | handler mutates during drain | Enqueued, runs in the same cycle |
//! | Interval change mid-stream | re-schedule with new interval | Latest interval wins for later executions |

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashMap;
use web_time::Instant;

use crate::clock::TimeSource;

/// How long a not-yet-due process waits before re-checking its queue.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Unit of rate-limited work. Runs exactly once.
pub type Callback = Box<dyn FnOnce()>;

struct Process {
    queue: VecDeque<Callback>,
    interval: Duration,
    last_run: Option<Instant>,
    /// A drain cycle is live (running now or parked on `next_wake`).
    polling: bool,
    next_wake: Option<Instant>,
}

#[derive(Default)]
struct Registry {
    processes: AHashMap<String, Process>,
}

/// Shared scheduler handle. `Clone` shares the registry.
pub struct RateLimiter {
    inner: Rc<RefCell<Registry>>,
    time: TimeSource,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            time: self.time.clone(),
        }
    }
}

impl RateLimiter {
    #[must_use]
    pub fn new(time: TimeSource) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry::default())),
            time,
        }
    }

    /// Enqueue `callback` on the process named `key` and, if the process is
    /// idle, drain it now. `interval` replaces the process's interval for
    /// all later executions.
    pub fn schedule(&self, key: &str, interval: Duration, callback: Callback) {
        {
            let mut registry = self.inner.borrow_mut();
            let process = registry
                .processes
                .entry(key.to_owned())
                .or_insert_with(|| Process {
                    queue: VecDeque::new(),
                    interval,
                    last_run: None,
                    polling: false,
                    next_wake: None,
                });
            process.queue.push_back(callback);
            process.interval = interval;
            if process.polling {
                return;
            }
            process.polling = true;
        }
        self.run_cycle(key);
    }

    /// Resume every process whose wake deadline has passed.
    pub fn tick(&self) {
        let now = self.time.now();
        let due: Vec<String> = self
            .inner
            .borrow()
            .processes
            .iter()
            .filter(|(_, p)| p.next_wake.is_some_and(|wake| wake <= now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in due {
            self.run_cycle(&key);
        }
    }

    /// Earliest parked wake deadline, if any process is waiting.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner
            .borrow()
            .processes
            .values()
            .filter_map(|p| p.next_wake)
            .min()
    }

    /// Callbacks still queued for `key`.
    #[must_use]
    pub fn queued(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .processes
            .get(key)
            .map_or(0, |p| p.queue.len())
    }

    /// Drain `key`'s queue until it empties or the interval blocks.
    /// The registry borrow is released before each callback runs.
    fn run_cycle(&self, key: &str) {
        loop {
            let callback = {
                let mut registry = self.inner.borrow_mut();
                let Some(process) = registry.processes.get_mut(key) else {
                    return;
                };
                if process.queue.is_empty() {
                    process.polling = false;
                    process.next_wake = None;
                    return;
                }
                let now = self.time.now();
                let due = process
                    .last_run
                    .is_none_or(|last| now.duration_since(last) >= process.interval);
                if !due {
                    process.next_wake = Some(now + RETRY_DELAY);
                    tracing::trace!(key, queued = process.queue.len(), "process parked");
                    return;
                }
                process.last_run = Some(now);
                process.next_wake = None;
                process.queue.pop_front()
            };
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.borrow();
        f.debug_struct("RateLimiter")
            .field("processes", &registry.processes.len())
            .finish()
    }
}
