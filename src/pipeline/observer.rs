use std::time::Duration;

use tracing::{debug, info, warn};

/// Events emitted while a [`super::Pipeline`] runs.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStarted {
        pipeline: String,
        steps: usize,
    },
    StepStarted {
        index: usize,
        verb: &'static str,
        rows_in: usize,
    },
    StepFinished {
        index: usize,
        verb: &'static str,
        rows_out: usize,
        columns_out: usize,
        elapsed: Duration,
    },
    StepFailed {
        index: usize,
        verb: &'static str,
        message: String,
    },
    RunFinished {
        pipeline: String,
        rows_out: usize,
        elapsed: Duration,
    },
}

/// Observer hook for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Ignores every event.
#[derive(Debug, Default)]
pub struct NoopPipelineObserver;

impl PipelineObserver for NoopPipelineObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Forwards pipeline events to `tracing`.
///
/// Step boundaries log at `debug`, the finished run at `info`, failures at `warn`.
#[derive(Debug, Default)]
pub struct TracingPipelineObserver;

impl PipelineObserver for TracingPipelineObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { pipeline, steps } => {
                debug!(pipeline = %pipeline, steps, "pipeline started");
            }
            PipelineEvent::StepStarted { index, verb, rows_in } => {
                debug!(step = index, verb, rows_in, "step started");
            }
            PipelineEvent::StepFinished {
                index,
                verb,
                rows_out,
                columns_out,
                elapsed,
            } => {
                debug!(step = index, verb, rows_out, columns_out, elapsed = ?elapsed, "step finished");
            }
            PipelineEvent::StepFailed { index, verb, message } => {
                warn!(step = index, verb, error = %message, "step failed");
            }
            PipelineEvent::RunFinished {
                pipeline,
                rows_out,
                elapsed,
            } => {
                info!(pipeline = %pipeline, rows_out, elapsed = ?elapsed, "pipeline finished");
            }
        }
    }
}
