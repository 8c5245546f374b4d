//! Scheduled execution of pipelines

pub mod job;
pub mod scheduler;

pub use job::PipelineJob;
pub use scheduler::{
    delay_until_next_hour, DailyScheduler, ScheduledTask, Scheduler, SchedulerError, TimeProvider,
};
