//! Output types produced by the conversion pipeline.
//!
//! Everything here is serde-serializable so the CLI can emit the result as
//! JSON (`--json`) for scripting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a completed conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The file the OCR engine wrote: `<output_base>.<format>`.
    pub output_path: PathBuf,

    /// Number of pages that went through the pipeline.
    pub pages: usize,

    /// Output format token the OCR engine was asked for.
    pub format: String,

    /// The working area, when `keep_intermediates` left it on disk.
    /// `None` means it was deleted as usual.
    pub kept_workspace: Option<PathBuf>,

    /// Wall-clock statistics per stage.
    pub stats: ConversionStats,
}

/// Wall-clock timings for one conversion, in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// PDF toolkit burst stage.
    pub burst_ms: u64,
    /// Image toolkit rasterization stage.
    pub rasterize_ms: u64,
    /// OCR engine recognition stage.
    pub recognize_ms: u64,
    /// Whole pipeline including setup and metadata.
    pub total_ms: u64,
}

/// Document details from the PDF toolkit's metadata dump.
///
/// Field availability depends entirely on what the producing application
/// stamped into the PDF; only `page_count` is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
}
