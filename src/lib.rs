//! # pdf2ocr
//!
//! Turn a scanned PDF into a searchable file by sequencing three external
//! tools: `pdftk` (page splitting), ImageMagick (rasterization), and
//! `tesseract` (recognition).
//!
//! ## Why this crate?
//!
//! Text extractors (pdftotext and friends) return nothing useful on scanned
//! documents: there is no text layer to extract, only page images. The
//! reliable recipe is decades old — split the PDF, rasterize each page, OCR
//! the images — and this crate is that recipe as one command, with real
//! argument checking, precise errors, progress events, and cleanup, instead
//! of a shell one-liner that keeps going after a failed step.
//!
//! ## Pipeline Overview
//!
//! ```text
//! scan.pdf
//!  │
//!  ├─ 1. Input      validate the PDF, resolve paths
//!  ├─ 2. Metadata   pdftk dump_data: page count, document info
//!  ├─ 3. Burst      pdftk: one PDF per page in a temp working area
//!  ├─ 4. Rasterize  magick: page PDFs → grayscale 300-DPI TIFFs
//!  ├─ 5. Recognize  tesseract: image list → scan_ocr.<format>
//!  └─ 6. Cleanup    working area deleted (or kept on request)
//! ```
//!
//! Every stage is gated on the previous one exiting zero; the first failure
//! aborts the pipeline and carries the failing tool's stderr.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2ocr::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("scan.pdf", "scan_ocr", "txt", &config).await?;
//!     println!("wrote {}", output.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Required External Tools
//!
//! | Tool        | Debian package  | Used for |
//! |-------------|-----------------|----------|
//! | `pdftk`     | `pdftk-java`    | page splitting, metadata |
//! | `magick`    | `imagemagick`   | rasterizing pages |
//! | `tesseract` | `tesseract-ocr` | text recognition |
//!
//! [`probe_tools`] checks all three up front; the CLI exposes it as
//! `--check-tools`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2ocr` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2ocr = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod exec;
pub mod output;
pub mod pipeline;
pub mod probe;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_from_bytes, convert_sync, inspect};
pub use error::Pdf2OcrError;
pub use exec::{ExternalTool, SystemRunner, ToolInvocation, ToolOutput, ToolRunner};
pub use output::{ConversionOutput, ConversionStats, DocumentInfo};
pub use probe::{probe_tools, ToolProbe, ToolStatus};
pub use progress::{
    ConversionProgressCallback, NoopProgressCallback, PipelineStage, ProgressCallback,
};
