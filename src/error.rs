//! Error types for the pdf2ocr library.
//!
//! Every failure is fatal for the invocation: the pipeline has no retries
//! and no partial-output mode, so a single [`Pdf2OcrError`] enum covers the
//! whole taxonomy:
//!
//! * input errors — the PDF is absent, unreadable, or not a PDF at all;
//! * external tool errors — one of the three collaborators (`pdftk`,
//!   `magick`, `tesseract`) is missing, could not be started, exited
//!   non-zero, or claimed success without producing its artifacts;
//! * infrastructure errors — the temporary working area or configuration.
//!
//! Usage errors (wrong argument count) never reach this enum; the argument
//! parser in the binary owns those and exits with its own usage code.
//! Everything else maps to a process exit code via [`Pdf2OcrError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

use crate::exec::ExternalTool;

/// All errors returned by the pdf2ocr library.
#[derive(Debug, Error)]
pub enum Pdf2OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The requested output file is the input file.
    #[error("Output file '{path}' would overwrite the input PDF.\nPick a different output base name.")]
    OutputOverwritesInput { path: PathBuf },

    /// The output base name cannot be turned into a file path.
    #[error("Invalid output base name '{base}': {detail}")]
    InvalidOutputBase { base: PathBuf, detail: String },

    /// The format token could never be a valid OCR engine config name.
    #[error("Invalid output format token '{token}': {detail}\nUse a token the OCR engine understands, e.g. pdf, txt, hocr.")]
    InvalidFormat { token: String, detail: String },

    // ── External tool errors ──────────────────────────────────────────────
    /// The tool's executable could not be found on the execution path.
    #[error("{tool} executable '{program}' not found on PATH.\n{}", .tool.install_hint())]
    ToolMissing { tool: ExternalTool, program: PathBuf },

    /// The tool's executable exists but the process could not be started.
    #[error("Failed to start {tool} ('{program}'): {source}")]
    ToolSpawnFailed {
        tool: ExternalTool,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited non-zero; its stderr is reproduced verbatim.
    #[error("{tool} failed with {}\n{}", exit_label(.code), diagnostic_block(.stderr))]
    ToolFailed {
        tool: ExternalTool,
        code: Option<i32>,
        stderr: String,
    },

    /// The tool exited zero but left no page files behind.
    #[error("{tool} reported success but produced no page files in '{dir}'\nThe input PDF may be empty or damaged.")]
    NoPagesProduced { tool: ExternalTool, dir: PathBuf },

    /// The OCR engine exited zero but the expected output file is absent.
    #[error("OCR finished but the expected output '{path}' does not exist.\nSome format tokens write a different extension; check the engine's docs for the token you passed.")]
    OutputMissing { path: PathBuf },

    /// The PDF toolkit's metadata dump could not be interpreted.
    #[error("Could not parse document metadata: {detail}")]
    MetadataParse { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Filesystem work around the pipeline failed (working area, list file,
    /// path resolution).
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2OcrError {
    /// Process exit code for this error.
    ///
    /// A failed collaborator propagates its own exit code; a collaborator
    /// missing from PATH uses the shell's 127 convention; everything else
    /// is 1. Usage errors exit with the argument parser's own code (2) and
    /// never construct a `Pdf2OcrError`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Pdf2OcrError::ToolFailed { code: Some(c), .. } => *c,
            Pdf2OcrError::ToolMissing { .. } => 127,
            _ => 1,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (terminated by a signal)".to_string(),
    }
}

fn diagnostic_block(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "The tool produced no diagnostic output.".to_string()
    } else {
        trimmed.to_string()
    }
}
