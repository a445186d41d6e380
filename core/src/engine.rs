use crate::error::{DrainError, ScheduleError, TaskError};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use tracing::{trace, warn};

/// Virtual time in ticks. The reference workload treats one tick as a microsecond.
pub type SimTime = u64;

/// Position of a task in the total execution order.
///
/// Tasks run by time first; tasks sharing a time run in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub time: SimTime,
    pub sequence: u64,
}

impl Ord for TaskKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for TaskKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}#{}", self.time, self.sequence)
    }
}

/// What a drain does when a task returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop at the first failure and hand it back to the caller.
    #[default]
    Propagate,
    /// Log the failure, count it, keep draining.
    Isolate,
}

pub(crate) struct Pending<T> {
    pub(crate) key: TaskKey,
    pub(crate) task: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl<T> Eq for Pending<T> {}
impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Pending<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Runs tasks popped from a [`Scheduler`]. The scheduler is handed back so
/// the task can schedule follow-up work.
pub trait Executor<T> {
    fn execute(
        &mut self,
        scheduler: &mut Scheduler<T>,
        key: TaskKey,
        task: T,
    ) -> Result<(), TaskError>;
}

impl<T, F> Executor<T> for F
where
    F: FnMut(&mut Scheduler<T>, TaskKey, T) -> Result<(), TaskError>,
{
    fn execute(
        &mut self,
        scheduler: &mut Scheduler<T>,
        key: TaskKey,
        task: T,
    ) -> Result<(), TaskError> {
        self(scheduler, key, task)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub executed: u64,
    pub failed: u64,
}

/// Virtual-time task queue.
///
/// Tasks are executed synchronously on the thread calling [`drain`](Self::drain)
/// or [`step`](Self::step). The minimum is re-selected after every execution,
/// so work scheduled by a running task is visible to the very next pick.
pub struct Scheduler<T> {
    now: SimTime,
    sequence: u64,
    executed: u64,
    failed: u64,
    policy: FailurePolicy,
    pending: BinaryHeap<Reverse<Pending<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::with_policy(FailurePolicy::default())
    }

    pub fn with_policy(policy: FailurePolicy) -> Self {
        Self {
            now: 0,
            sequence: 0,
            executed: 0,
            failed: 0,
            policy,
            pending: BinaryHeap::new(),
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Logical time of the task currently (or most recently) executed.
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Tasks that returned an error, whichever the policy.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.pending.peek().map(|Reverse(p)| p.key.time)
    }

    /// Queues `task` for `time`. A time already in the past runs at `now`.
    pub fn schedule(&mut self, time: SimTime, task: T) -> TaskKey {
        let key = TaskKey {
            time: time.max(self.now),
            sequence: self.sequence,
        };
        self.sequence += 1;
        trace!(%key, pending = self.pending.len(), "schedule");
        self.pending.push(Reverse(Pending { key, task }));
        key
    }

    pub fn schedule_after(&mut self, delay: SimTime, task: T) -> Result<TaskKey, ScheduleError> {
        let time = self
            .now
            .checked_add(delay)
            .ok_or(ScheduleError::TimeOverflow {
                now: self.now,
                delay,
            })?;
        Ok(self.schedule(time, task))
    }

    /// Drops every pending task. Logical time and sequence numbers are kept.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pops and executes the earliest task, applying the failure policy.
    /// `None` once nothing is pending.
    fn run_next<E: Executor<T>>(
        &mut self,
        executor: &mut E,
    ) -> Option<Result<TaskKey, DrainError>> {
        let Reverse(Pending { key, task }) = self.pending.pop()?;
        self.now = key.time;
        self.executed += 1;
        trace!(%key, "execute");
        let Err(source) = executor.execute(self, key, task) else {
            return Some(Ok(key));
        };
        self.failed += 1;
        match self.policy {
            FailurePolicy::Propagate => Some(Err(DrainError { key, source })),
            FailurePolicy::Isolate => {
                warn!(%key, error = %source, "task failed, continuing");
                Some(Ok(key))
            }
        }
    }

    /// Executes the earliest pending task, if any.
    pub fn step<E: Executor<T>>(
        &mut self,
        executor: &mut E,
    ) -> Result<Option<TaskKey>, DrainError> {
        self.run_next(executor).transpose()
    }

    /// Executes tasks in (time, sequence) order until none remain.
    pub fn drain<E: Executor<T>>(&mut self, executor: &mut E) -> Result<DrainSummary, DrainError> {
        let failed_before = self.failed;
        let mut summary = DrainSummary::default();
        while let Some(result) = self.run_next(executor) {
            result?;
            summary.executed += 1;
        }
        summary.failed = self.failed - failed_before;
        Ok(summary)
    }
}
