//! Pipeline stages for scanned-PDF conversion.
//!
//! Each submodule owns exactly one transformation step. Keeping stages
//! separate makes each independently testable and keeps every collaborator's
//! command-line grammar in one place.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ metadata ──▶ burst ──▶ rasterize ──▶ recognize
//! (paths)   (pdftk)     (pdftk)   (magick)      (tesseract)
//! ```
//!
//! 1. [`input`]     — validate the input PDF, resolve paths to absolute form
//! 2. [`workspace`] — the per-invocation temp area every stage works in
//! 3. [`metadata`]  — `dump_data` page count and document info
//! 4. [`burst`]     — split the input into single-page PDFs
//! 5. [`rasterize`] — one image-toolkit pass: page PDFs → TIFFs
//! 6. [`recognize`] — OCR the image list into `<base>.<format>`

pub mod burst;
pub mod input;
pub mod metadata;
pub mod rasterize;
pub mod recognize;
pub mod workspace;
