//! Stage reporting for pipeline runs
//!
//! The processor announces every state transition to a `ProgressReporter`,
//! which lets frontends log, display, or record them.

use crate::types::{PipelineStage, ProcessingTimings};
use instant::Instant;
use std::sync::Mutex;

/// Stage transition with timing
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since the request was received (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(stage: PipelineStage, start_time: Instant) -> Self {
        Self {
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Receiver for pipeline stage transitions
pub trait ProgressReporter: Send + Sync {
    /// A stage was entered
    fn report_progress(&self, update: ProgressUpdate);

    /// The pipeline reached `Responded`
    fn report_completion(&self, timings: &ProcessingTimings);

    /// The pipeline reached `Failed` after `stage`
    fn report_error(&self, stage: PipelineStage, error: &str);
}

/// Reporter that discards everything
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _timings: &ProcessingTimings) {}

    fn report_error(&self, _stage: PipelineStage, _error: &str) {}
}

/// Reporter that logs through the `log` facade
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!("{} ({}ms elapsed)", update.description, update.elapsed_ms);
        } else {
            log::debug!("{}", update.description);
        }
    }

    fn report_completion(&self, timings: &ProcessingTimings) {
        log::info!("Sticker ready in {}ms", timings.total_ms);

        if self.verbose {
            log::info!("  Background removal: {}ms", timings.removal_ms);
            log::info!("  Border: {}ms", timings.border_ms);
            log::info!("  Gloss: {}ms", timings.gloss_ms);
            log::info!("  Flatten + encode: {}ms", timings.flatten_ms);
        }
    }

    fn report_error(&self, stage: PipelineStage, error: &str) {
        log::error!("Failed after '{}': {}", stage.description(), error);
    }
}

/// Reporter that keeps every stage it sees, in order
#[derive(Default)]
pub struct RecordingProgressReporter {
    stages: Mutex<Vec<PipelineStage>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stages(&self) -> Vec<PipelineStage> {
        self.stages.lock().map(|s| s.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProgressReporter for RecordingProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if let Ok(mut stages) = self.stages.lock() {
            stages.push(update.stage);
        }
    }

    fn report_completion(&self, _timings: &ProcessingTimings) {}

    fn report_error(&self, _stage: PipelineStage, error: &str) {
        if let Ok(mut stages) = self.stages.lock() {
            stages.push(PipelineStage::Failed);
        }
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(error.to_string());
        }
    }
}

impl<T: ProgressReporter + ?Sized> ProgressReporter for std::sync::Arc<T> {
    fn report_progress(&self, update: ProgressUpdate) {
        (**self).report_progress(update);
    }

    fn report_completion(&self, timings: &ProcessingTimings) {
        (**self).report_completion(timings);
    }

    fn report_error(&self, stage: PipelineStage, error: &str) {
        (**self).report_error(stage, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_update_carries_description() {
        let update = ProgressUpdate::new(PipelineStage::BorderAdded, Instant::now());
        assert_eq!(update.description, "Border added");
        assert_eq!(update.stage, PipelineStage::BorderAdded);
    }

    #[test]
    fn test_recording_reporter() {
        let reporter = RecordingProgressReporter::new();
        let start = Instant::now();
        reporter.report_progress(ProgressUpdate::new(PipelineStage::Received, start));
        reporter.report_error(PipelineStage::Received, "boom");

        assert_eq!(
            reporter.stages(),
            vec![PipelineStage::Received, PipelineStage::Failed]
        );
        assert_eq!(reporter.errors(), vec!["boom".to_string()]);
    }

    #[test]
    fn test_console_and_noop_reporters_do_not_panic() {
        let start = Instant::now();
        for reporter in [
            Box::new(NoOpProgressReporter) as Box<dyn ProgressReporter>,
            Box::new(ConsoleProgressReporter::new(true)),
            Box::new(ConsoleProgressReporter::new(false)),
        ] {
            reporter.report_progress(ProgressUpdate::new(PipelineStage::Flattened, start));
            reporter.report_completion(&ProcessingTimings::default());
            reporter.report_error(PipelineStage::Received, "error");
        }
    }
}
