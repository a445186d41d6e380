//! Wall-clock flavour of the scheduler.
//!
//! One or more threads insert tasks while a runner thread sleeps until the
//! earliest task is due. The runner wakes early when an earlier task is
//! inserted or when the scheduler is shut down.

use crate::engine::{DrainSummary, FailurePolicy, Pending, SimTime, TaskKey};
use crate::error::{DrainError, ScheduleError, TaskError};
use crate::traits::Clock;
use parking_lot::{Condvar, Mutex};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Microseconds elapsed since the clock was created.
#[derive(Debug)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> SimTime {
        self.epoch.elapsed().as_micros().min(u128::from(SimTime::MAX)) as SimTime
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Return from `run` as soon as possible, leaving pending tasks unexecuted.
    Immediate,
    /// Keep running until nothing is pending, then return.
    WhenIdle,
}

struct State<T> {
    pending: BinaryHeap<Reverse<Pending<T>>>,
    sequence: u64,
    shutdown: Option<ShutdownMode>,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    wake: Condvar,
    clock: Arc<dyn Clock>,
    policy: FailurePolicy,
}

/// Cloneable handle; every clone feeds the same pending set.
pub struct RealTimeScheduler<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for RealTimeScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for RealTimeScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RealTimeScheduler<T> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(WallClock::new()), FailurePolicy::default())
    }

    pub fn with_clock(clock: Arc<dyn Clock>, policy: FailurePolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    pending: BinaryHeap::new(),
                    sequence: 0,
                    shutdown: None,
                }),
                wake: Condvar::new(),
                clock,
                policy,
            }),
        }
    }

    pub fn now(&self) -> SimTime {
        self.shared.clock.now()
    }

    pub fn schedule(&self, time: SimTime, task: T) -> Result<TaskKey, ScheduleError> {
        let mut state = self.shared.state.lock();
        if state.shutdown.is_some() {
            return Err(ScheduleError::ShutDown);
        }
        let key = TaskKey {
            time,
            sequence: state.sequence,
        };
        state.sequence += 1;
        let earliest = state.pending.peek().map_or(true, |Reverse(p)| key < p.key);
        state.pending.push(Reverse(Pending { key, task }));
        drop(state);
        if earliest {
            self.shared.wake.notify_all();
        }
        Ok(key)
    }

    pub fn schedule_after(&self, delay: Duration, task: T) -> Result<TaskKey, ScheduleError> {
        let now = self.now();
        let delay = delay.as_micros().min(u128::from(SimTime::MAX)) as SimTime;
        let time = now
            .checked_add(delay)
            .ok_or(ScheduleError::TimeOverflow { now, delay })?;
        self.schedule(time, task)
    }

    pub fn shutdown(&self, mode: ShutdownMode) {
        debug!(?mode, "shutting down real-time scheduler");
        self.shared.state.lock().shutdown = Some(mode);
        self.shared.wake.notify_all();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.state.lock().shutdown.is_some()
    }

    /// Drops every pending task.
    pub fn clear(&self) {
        self.shared.state.lock().pending.clear();
        self.shared.wake.notify_all();
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().pending.is_empty()
    }

    pub fn next_due(&self) -> Option<SimTime> {
        self.shared.state.lock().pending.peek().map(|Reverse(p)| p.key.time)
    }

    /// Blocks until the next task is due and returns it, or `None` once the
    /// scheduler has been shut down (or, for [`ShutdownMode::WhenIdle`], has
    /// run dry).
    fn wait_next(&self) -> Option<(TaskKey, T)> {
        let mut state = self.shared.state.lock();
        loop {
            if state.shutdown == Some(ShutdownMode::Immediate) {
                return None;
            }
            let now = self.shared.clock.now();
            let due = state.pending.peek().map(|Reverse(p)| p.key.time);
            match due {
                None if state.shutdown == Some(ShutdownMode::WhenIdle) => return None,
                None => self.shared.wake.wait(&mut state),
                Some(due) if due <= now => {
                    if let Some(Reverse(p)) = state.pending.pop() {
                        return Some((p.key, p.task));
                    }
                }
                Some(due) => {
                    self.shared
                        .wake
                        .wait_for(&mut state, Duration::from_micros(due - now));
                }
            }
        }
    }

    /// Runs due tasks on the calling thread until shut down. Tasks execute
    /// without the lock held, so they may schedule more work through `self`.
    pub fn run<F>(&self, mut executor: F) -> Result<DrainSummary, DrainError>
    where
        F: FnMut(&Self, TaskKey, T) -> Result<(), TaskError>,
    {
        let mut summary = DrainSummary::default();
        while let Some((key, task)) = self.wait_next() {
            summary.executed += 1;
            if let Err(source) = executor(self, key, task) {
                match self.shared.policy {
                    FailurePolicy::Propagate => return Err(DrainError { key, source }),
                    FailurePolicy::Isolate => {
                        warn!(%key, error = %source, "task failed, continuing");
                        summary.failed += 1;
                    }
                }
            }
        }
        debug!(executed = summary.executed, "real-time scheduler stopped");
        Ok(summary)
    }
}
