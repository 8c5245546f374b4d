//! Execution scheduler - arms a task to run at the top of the next hour,
//! then once per period

use chrono::{DateTime, Timelike, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Source of the current time
pub type TimeProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Work handed to a scheduler; called once per tick
pub type ScheduledTask = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Default repeat interval after the first run
pub const DAILY: Duration = Duration::from_secs(24 * 60 * 60);

pub fn wall_clock() -> TimeProvider {
    Arc::new(Utc::now)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler is already scheduled")]
    AlreadyScheduled,

    #[error("no async runtime available to run scheduled tasks")]
    NoRuntime,
}

/// Something that can arm a repeating task
pub trait Scheduler: Send + Sync {
    /// Arm `task`; returns as soon as it is armed
    fn schedule(&self, task: ScheduledTask) -> Result<(), SchedulerError>;
}

/// Time left until the next `:00:00`, between one second and one hour
///
/// Lands exactly on the hour boundary; a time already at `:00:00` waits a
/// full hour.
pub fn delay_until_next_hour(now: DateTime<Utc>) -> Duration {
    let elapsed = now.minute() * 60 + now.second();
    Duration::from_secs(u64::from(3600 - elapsed))
}

/// Runs its task at the top of the next hour, then every period (a day by
/// default)
///
/// A `DailyScheduler` arms exactly once. The background task is detached:
/// it keeps running after the scheduler is dropped, until the runtime shuts
/// down.
pub struct DailyScheduler {
    clock: TimeProvider,
    period: Duration,
    armed: AtomicBool,
}

impl DailyScheduler {
    pub fn new() -> Self {
        Self {
            clock: wall_clock(),
            period: DAILY,
            armed: AtomicBool::new(false),
        }
    }

    pub fn with_time_provider(mut self, clock: TimeProvider) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

impl Default for DailyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for DailyScheduler {
    fn schedule(&self, task: ScheduledTask) -> Result<(), SchedulerError> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        if self
            .armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SchedulerError::AlreadyScheduled);
        }

        let delay = delay_until_next_hour((self.clock)());
        let period = self.period;
        info!(
            "Scheduled first run in {}s, then every {}s",
            delay.as_secs(),
            period.as_secs()
        );

        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            loop {
                debug!("Scheduled task firing");
                task().await;
                tokio::time::sleep(period).await;
            }
        });

        Ok(())
    }
}
