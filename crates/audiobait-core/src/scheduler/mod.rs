mod burst;
mod ports;

pub use burst::{BurstConfig, BurstScheduler, BurstSummary, SchedulerState, StepOutcome};
pub use ports::{Clock, EventReporter, PlaybackDevice, Sleeper, SystemClock, TokioSleeper};
