//! Periodic task scheduling.
//!
//! The channelizer only needs "run this repeatedly at a fixed rate,
//! give me a cancellable handle" - expressed as the [`Scheduler`] trait
//! so tests can drive ticks manually and servers can plug their own
//! worker pool.
//!
//! [`TokioScheduler`] is the production implementation: one spawned task
//! per session, which also serializes a session's ticks (a slow tick
//! only delays that session's own schedule).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// A unit of work invoked on every scheduled tick.
pub trait ScheduledTask: Send + Sync {
    /// Run one tick.
    fn run(&self);
}

/// Cancellable handle for a scheduled periodic task.
pub trait TaskHandle: Send + Sync {
    /// Cancel the schedule.
    ///
    /// Does not interrupt a tick already in flight; callers must
    /// tolerate one trailing invocation.
    fn cancel(&self);
}

/// Submits periodic tasks to a shared worker pool.
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run every `interval`, first after
    /// `initial_delay`.
    fn schedule_at_fixed_rate(
        &self,
        task: Arc<dyn ScheduledTask>,
        initial_delay: Duration,
        interval: Duration,
    ) -> Box<dyn TaskHandle>;
}

/// Scheduler backed by the tokio runtime.
///
/// Must be constructed inside a runtime context (the spawn happens on
/// the ambient runtime).
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    /// Create a tokio-backed scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

struct TokioTaskHandle {
    handle: tokio::task::AbortHandle,
}

impl TaskHandle for TokioTaskHandle {
    fn cancel(&self) {
        self.handle.abort();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_at_fixed_rate(
        &self,
        task: Arc<dyn ScheduledTask>,
        initial_delay: Duration,
        interval: Duration,
    ) -> Box<dyn TaskHandle> {
        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + initial_delay, interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task.run();
            }
        });
        Box::new(TokioTaskHandle {
            handle: join.abort_handle(),
        })
    }
}
