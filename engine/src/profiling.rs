use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimings {
    pub step: Duration,
    pub record: Duration,
    pub total: Duration,
}

/// Hook for observing how long each `HeadlessRunner` step took.
pub trait Profiler {
    fn on_step(&mut self, _frame: usize, _timings: StepTimings) {}
}

/// Logs steps slower than `budget` at debug level.
#[derive(Debug, Clone, Copy)]
pub struct SlowStepLogger {
    pub budget: Duration,
}

impl Profiler for SlowStepLogger {
    fn on_step(&mut self, frame: usize, timings: StepTimings) {
        if timings.total > self.budget {
            tracing::debug!(
                frame,
                step_us = timings.step.as_micros() as u64,
                record_us = timings.record.as_micros() as u64,
                "slow step"
            );
        }
    }
}
