//! Input and output-path resolution.
//!
//! ## Why absolute paths?
//!
//! Two of the collaborators run with the temporary working area as their
//! current directory (the PDF toolkit drops a `doc_data.txt` side file into
//! whatever directory it runs in, and the OCR list file uses names relative
//! to the area). Caller-supplied paths are resolved to absolute form up
//! front so they keep naming the same files no matter which directory a
//! child process runs in.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Pdf2OcrError;

/// Resolve and validate the input PDF path.
///
/// Checks existence, read permission, and the `%PDF` magic bytes before any
/// collaborator is spawned, so a bad input fails fast with a precise error
/// instead of a confusing toolkit message.
pub fn resolve_pdf(path: &Path) -> Result<PathBuf, Pdf2OcrError> {
    if !path.exists() {
        return Err(Pdf2OcrError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2OcrError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2OcrError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2OcrError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    let resolved = path.canonicalize().map_err(|e| Pdf2OcrError::Io {
        context: format!("resolving input path '{}'", path.display()),
        source: e,
    })?;
    debug!("resolved input PDF: {}", resolved.display());
    Ok(resolved)
}

/// Resolve the output base name to an absolute path.
///
/// The base carries no extension (the OCR engine appends its own); its
/// parent directory is created if missing, matching what callers expect
/// from an output path option.
pub fn resolve_output_base(base: &Path) -> Result<PathBuf, Pdf2OcrError> {
    let file_name = base
        .file_name()
        .ok_or_else(|| Pdf2OcrError::InvalidOutputBase {
            base: base.to_path_buf(),
            detail: "it has no file name component".to_string(),
        })?;

    if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
        if matches!(
            ext.to_ascii_lowercase().as_str(),
            "pdf" | "txt" | "hocr" | "tsv" | "tif" | "tiff"
        ) {
            warn!(
                "output base '{}' already ends in .{}; the OCR engine appends its own extension",
                base.display(),
                ext
            );
        }
    }

    let parent = match base.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| Pdf2OcrError::Io {
        context: format!("creating output directory '{}'", parent.display()),
        source: e,
    })?;
    let abs_parent = parent.canonicalize().map_err(|e| Pdf2OcrError::Io {
        context: format!("resolving output directory '{}'", parent.display()),
        source: e,
    })?;

    Ok(abs_parent.join(file_name))
}

/// The file the OCR engine will write for a given base and format token.
pub fn expected_output_path(base: &Path, format: &str) -> PathBuf {
    let mut name = base
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(format);
    base.with_file_name(name)
}

/// Reject format tokens that could never name an OCR engine config.
///
/// No list of valid tokens is kept (the engine is the authority and grows
/// new ones); this only refuses shapes that would be misread as options or
/// paths on the engine's command line.
pub fn validate_format_token(token: &str) -> Result<(), Pdf2OcrError> {
    if token.is_empty() {
        return Err(Pdf2OcrError::InvalidFormat {
            token: token.to_string(),
            detail: "it is empty".to_string(),
        });
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Pdf2OcrError::InvalidFormat {
            token: token.to_string(),
            detail: "only ASCII letters, digits and '_' can appear in a config name".to_string(),
        });
    }
    Ok(())
}
