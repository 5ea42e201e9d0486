//! The temporary working area shared by every pipeline stage.
//!
//! One area per invocation: the burst page PDFs, the rasterized TIFFs, the
//! OCR list file and the PDF toolkit's `doc_data.txt` side file all land
//! here, so dropping the area removes every intermediate in one sweep. A
//! fresh area per run also means a rerun can never pick up a stale page
//! file from an earlier attempt.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::Pdf2OcrError;

/// Per-invocation working area under the system temp directory.
///
/// Deleted on drop (best-effort, as with any temp directory); call
/// [`Workspace::keep`] to disarm deletion and hand the path to the caller.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh, uniquely named working area.
    pub fn create() -> Result<Self, Pdf2OcrError> {
        let dir = tempfile::Builder::new()
            .prefix("pdf2ocr-")
            .tempdir()
            .map_err(|e| Pdf2OcrError::Io {
                context: "creating the working area".to_string(),
                source: e,
            })?;
        debug!("working area: {}", dir.path().display());
        Ok(Workspace { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Collect `page_*.<ext>` files in name order.
    ///
    /// Both producing collaborators number their outputs with a zero-padded
    /// `%04d` pattern, so lexicographic order is page order.
    pub fn page_files(&self, ext: &str) -> Result<Vec<PathBuf>, Pdf2OcrError> {
        let entries = std::fs::read_dir(self.path()).map_err(|e| Pdf2OcrError::Io {
            context: format!("listing the working area '{}'", self.path().display()),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension().and_then(|e| e.to_str()) == Some(ext)
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("page_"))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Disarm deletion; the area stays on disk for the caller to inspect.
    pub fn keep(self) -> PathBuf {
        let kept = self.dir.keep();
        info!("keeping working area: {}", kept.display());
        kept
    }
}
