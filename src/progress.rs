//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its stages.
//!
//! # Why stage events, not page events?
//!
//! Each stage is a single child process that handles every page in one go;
//! the collaborators emit no per-page feedback while they run. Stage
//! boundaries (plus the page count discovered up front) are therefore the
//! finest granularity the pipeline can honestly report.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a log, or a terminal progress bar without the
//! library knowing how the host application communicates. Events arrive
//! strictly in pipeline order, but the trait is `Send + Sync` because the
//! conversion future may hop runtime threads between stages.
//!
//! # Example
//!
//! ```rust
//! use pdf2ocr::{ConversionConfig, ConversionProgressCallback, PipelineStage};
//! use std::sync::Arc;
//!
//! struct StderrCallback;
//!
//! impl ConversionProgressCallback for StderrCallback {
//!     fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64, artifacts: usize) {
//!         eprintln!("{} done in {}ms ({} files)", stage, elapsed_ms, artifacts);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(StderrCallback) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// One stage of the conversion pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// PDF toolkit burst: input PDF → single-page PDFs.
    Burst,
    /// Image toolkit: page PDFs → TIFF images.
    Rasterize,
    /// OCR engine: images → output file.
    Recognize,
}

impl PipelineStage {
    /// Short machine-friendly name.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Burst => "burst",
            PipelineStage::Rasterize => "rasterize",
            PipelineStage::Recognize => "recognize",
        }
    }

    /// Human-readable description for progress displays.
    pub fn description(&self) -> &'static str {
        match self {
            PipelineStage::Burst => "splitting the PDF into single pages",
            PipelineStage::Rasterize => "rasterizing pages to images",
            PipelineStage::Recognize => "recognizing text",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Called by the conversion pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the input is resolved and its page count is known.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a stage's child process is spawned.
    fn on_stage_start(&self, stage: PipelineStage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    ///
    /// # Arguments
    /// * `stage`      — the stage that finished
    /// * `elapsed_ms` — wall-clock duration of the stage
    /// * `artifacts`  — number of files the stage produced
    fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64, artifacts: usize) {
        let _ = (stage, elapsed_ms, artifacts);
    }

    /// Called when a stage fails; the pipeline aborts right after.
    fn on_stage_error(&self, stage: PipelineStage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once when the output file exists and the pipeline is done.
    fn on_conversion_complete(&self, total_pages: usize, elapsed_ms: u64) {
        let _ = (total_pages, elapsed_ms);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
