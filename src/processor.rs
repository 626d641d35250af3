//! Sticker pipeline orchestrator
//!
//! One request moves through
//! `Received -> BackgroundRemoved -> BorderAdded -> (GlossApplied | GlossSkipped) -> Flattened -> Responded`.
//! Any failure ends the run in `Failed` and no bytes are produced. The
//! processor keeps no per-request state, so one instance can serve
//! concurrent requests through `&self`.

use crate::{
    config::RequestOptions,
    effects::{add_border, apply_gloss, flatten},
    error::{ErrorPayload, Result, StickerError},
    extractor::SubjectExtractor,
    services::{NoOpProgressReporter, ProgressReporter, ProgressUpdate},
    tracing_config::{events, spans},
    types::{PipelineStage, ProcessingTimings, StickerResult},
    utils::UploadValidator,
};
use image::RgbaImage;
use instant::Instant;
use log::{debug, info};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Records the stages of one run and forwards them to the reporter
struct StageTracker {
    start: Instant,
    stages: Vec<PipelineStage>,
    reporter: Arc<dyn ProgressReporter>,
}

impl StageTracker {
    fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            start: Instant::now(),
            stages: Vec::with_capacity(6),
            reporter,
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        tracing::debug!(stage = ?stage, elapsed_ms = self.elapsed_ms(), "stage entered");
        self.stages.push(stage);
        self.reporter
            .report_progress(ProgressUpdate::new(stage, self.start));
    }

    fn fail(&mut self, error: &StickerError) {
        let last = self.stages.last().copied().unwrap_or(PipelineStage::Received);
        self.stages.push(PipelineStage::Failed);
        tracing::warn!(after = ?last, error = %error, "pipeline failed");
        self.reporter.report_error(last, &error.to_string());
    }

    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Runs the sticker pipeline against a subject extractor
pub struct StickerProcessor {
    extractor: Arc<dyn SubjectExtractor>,
    options: RequestOptions,
    reporter: Arc<dyn ProgressReporter>,
}

impl StickerProcessor {
    /// Create a processor with default options and no progress reporting
    pub fn new<E: SubjectExtractor + 'static>(extractor: E) -> Self {
        Self::from_shared(Arc::new(extractor))
    }

    /// Create a processor around an extractor shared with other owners
    #[must_use]
    pub fn from_shared(extractor: Arc<dyn SubjectExtractor>) -> Self {
        Self {
            extractor,
            options: RequestOptions::default(),
            reporter: Arc::new(NoOpProgressReporter),
        }
    }

    /// Replace the default options used by [`StickerProcessor::process_bytes`]
    ///
    /// # Errors
    /// - Options fail validation
    pub fn with_options(mut self, options: RequestOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    #[must_use]
    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// Run the pipeline with the processor's default options
    ///
    /// # Errors
    /// See [`StickerProcessor::process_with_options`].
    pub async fn process_bytes(&self, image_bytes: &[u8]) -> Result<StickerResult> {
        self.process_with_options(image_bytes, &self.options).await
    }

    /// Run the pipeline for one upload with per-request options
    ///
    /// # Errors
    /// - `InvalidConfig` for out-of-range options
    /// - `InvalidInput` for empty, oversized, or unsupported uploads
    /// - `Decode` for uploads that are not a decodable image
    /// - `ExternalService` / `Transport` / `Decode` from the extractor
    /// - `Encode` if the PNG encoder fails
    pub async fn process_with_options(
        &self,
        image_bytes: &[u8],
        options: &RequestOptions,
    ) -> Result<StickerResult> {
        let request_id = Uuid::new_v4().to_string();
        let span = spans::request(&request_id, self.extractor.name(), image_bytes.len());

        self.run(image_bytes, options).instrument(span).await
    }

    /// Like [`StickerProcessor::process_with_options`], but failures come back
    /// as the structured payload a transport layer returns to its client
    ///
    /// # Errors
    /// - Any pipeline failure, rendered as `{"error": "<message>"}`
    pub async fn process_payload(
        &self,
        image_bytes: &[u8],
        options: &RequestOptions,
    ) -> std::result::Result<StickerResult, ErrorPayload> {
        self.process_with_options(image_bytes, options)
            .await
            .map_err(ErrorPayload::from)
    }

    async fn run(&self, image_bytes: &[u8], options: &RequestOptions) -> Result<StickerResult> {
        let mut tracker = StageTracker::new(Arc::clone(&self.reporter));
        let mut timings = ProcessingTimings::new();
        tracker.enter(PipelineStage::Received);

        if let Err(e) = options
            .validate()
            .and_then(|()| UploadValidator::validate(image_bytes).map(|_| ()))
        {
            tracker.fail(&e);
            return Err(e);
        }

        let removal_start = Instant::now();
        let subject = match self.extractor.extract(image_bytes).await {
            Ok(subject) => subject,
            Err(e) => {
                tracker.fail(&e);
                return Err(e);
            },
        };
        timings.removal_ms = removal_start.elapsed().as_millis() as u64;
        tracker.enter(PipelineStage::BackgroundRemoved);
        info!(
            "Subject extracted by {} ({}x{}) in {}ms",
            self.extractor.name(),
            subject.width(),
            subject.height(),
            timings.removal_ms
        );

        let dimensions = subject.dimensions();
        let options = options.clone();
        let span = spans::compositing(dimensions, options.gloss_enabled());
        let rendered = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let png = render(&subject, &options, &mut tracker, &mut timings);
            (png, tracker, timings)
        })
        .await;

        let (png, mut tracker, mut timings) = match rendered {
            Ok(parts) => parts,
            Err(join_error) => {
                let e = StickerError::internal(format!("Compositing task failed: {}", join_error));
                self.reporter
                    .report_error(PipelineStage::BackgroundRemoved, &e.to_string());
                return Err(e);
            },
        };

        let png = match png {
            Ok(png) => png,
            Err(e) => {
                tracker.fail(&e);
                return Err(e);
            },
        };

        timings.total_ms = tracker.elapsed_ms();
        tracker.enter(PipelineStage::Responded);
        self.reporter.report_completion(&timings);

        Ok(StickerResult {
            png,
            dimensions,
            stages: tracker.stages,
            timings,
        })
    }
}

/// Border, optional gloss, and flatten for an extracted subject
fn render(
    subject: &RgbaImage,
    options: &RequestOptions,
    tracker: &mut StageTracker,
    timings: &mut ProcessingTimings,
) -> Result<Vec<u8>> {
    let stage_start = Instant::now();
    let bordered = add_border(
        subject,
        options.border_thickness,
        options.border_color,
        options.blur_radius,
    );
    timings.border_ms = stage_start.elapsed().as_millis() as u64;
    events::stage_timing("border", timings.border_ms);
    tracker.enter(PipelineStage::BorderAdded);

    let glossed = if options.gloss_enabled() {
        let stage_start = Instant::now();
        let glossed = apply_gloss(&bordered, options.gloss_intensity);
        timings.gloss_ms = stage_start.elapsed().as_millis() as u64;
        events::stage_timing("gloss", timings.gloss_ms);
        tracker.enter(PipelineStage::GlossApplied);
        glossed
    } else {
        debug!("Gloss intensity is zero, skipping");
        tracker.enter(PipelineStage::GlossSkipped);
        bordered
    };

    let stage_start = Instant::now();
    let png = flatten(&glossed, options.background_color)?;
    timings.flatten_ms = stage_start.elapsed().as_millis() as u64;
    events::stage_timing("flatten", timings.flatten_ms);
    tracker.enter(PipelineStage::Flattened);

    Ok(png)
}

/// Run the pixel stages on an already extracted subject
///
/// Same border, gloss and flatten sequence as the processor, without the
/// extractor or stage reporting.
///
/// # Errors
/// - Options fail validation
/// - PNG encoding fails
pub fn compose_sticker(subject: &RgbaImage, options: &RequestOptions) -> Result<Vec<u8>> {
    options.validate()?;
    let mut tracker = StageTracker::new(Arc::new(NoOpProgressReporter));
    let mut timings = ProcessingTimings::new();
    render(subject, options, &mut tracker, &mut timings)
}
