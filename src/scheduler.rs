// SPDX-License-Identifier: MPL-2.0
//! Deterministic timer bookkeeping driven by an external clock.
//!
//! The scheduler never sleeps or spawns anything. The application shell
//! advances it from its periodic tick, and tests advance it with synthetic
//! instants, so every timer fires at a reproducible point.

use std::time::{Duration, Instant};

/// What a scheduled task is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Periodic seek-bar and position label refresh.
    ProgressPoll,
    /// One-shot overlay auto-hide.
    AutoHide,
}

/// Cancellation handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskToken(u64);

#[derive(Debug, Clone)]
struct Task {
    token: TaskToken,
    kind: TimerKind,
    due: Instant,
    interval: Option<Duration>,
}

/// One-shot and repeating timers keyed by [`TimerKind`].
#[derive(Debug, Clone)]
pub struct Scheduler {
    now: Instant,
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// The instant of the last [`Scheduler::advance`] call.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Schedules a task that fires once, `delay` after the current instant.
    pub fn schedule_once(&mut self, kind: TimerKind, delay: Duration) -> TaskToken {
        self.push(kind, delay, None)
    }

    /// Schedules a task that fires every `interval`, first after one interval.
    pub fn schedule_repeating(&mut self, kind: TimerKind, interval: Duration) -> TaskToken {
        self.push(kind, interval, Some(interval))
    }

    fn push(&mut self, kind: TimerKind, delay: Duration, interval: Option<Duration>) -> TaskToken {
        let token = TaskToken(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            token,
            kind,
            due: self.now + delay,
            interval,
        });
        token
    }

    /// Cancels a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.token != token);
        self.tasks.len() != before
    }

    #[must_use]
    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.tasks.iter().any(|task| task.token == token)
    }

    /// Number of pending tasks of the given kind.
    #[must_use]
    pub fn pending(&self, kind: TimerKind) -> usize {
        self.tasks.iter().filter(|task| task.kind == kind).count()
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|task| task.due).min()
    }

    /// Moves the clock to `now` and returns every task that came due, in
    /// deadline order. One-shot tasks are removed; repeating tasks are
    /// rescheduled one interval later (a late tick fires a repeating task
    /// once, not once per missed interval).
    pub fn advance(&mut self, now: Instant) -> Vec<(TaskToken, TimerKind)> {
        if now > self.now {
            self.now = now;
        }

        let now = self.now;
        let mut fired: Vec<(Instant, TaskToken, TimerKind)> = Vec::new();
        self.tasks.retain_mut(|task| {
            if task.due > now {
                return true;
            }
            fired.push((task.due, task.token, task.kind));
            match task.interval {
                Some(interval) => {
                    task.due += interval;
                    if task.due <= now {
                        task.due = now + interval;
                    }
                    true
                }
                None => false,
            }
        });

        fired.sort_by_key(|(due, _, _)| *due);
        fired
            .into_iter()
            .map(|(_, token, kind)| (token, kind))
            .collect()
    }
}
