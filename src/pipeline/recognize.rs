//! Recognize stage: the OCR engine reads the images and writes the output.
//!
//! ## Why a list file?
//!
//! The engine accepts a plain-text file naming one image per line and
//! treats the list as a single multi-page document: one invocation, one
//! output file covering every page in order. The alternative (one run per
//! page plus manual stitching) is slower and re-implements what the engine
//! already does.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::Pdf2OcrError;
use crate::exec::{self, ExternalTool, ToolInvocation, ToolRunner};
use crate::pipeline::input::expected_output_path;
use crate::pipeline::workspace::Workspace;

/// Name of the list file inside the working area.
pub const LIST_FILE_NAME: &str = "pages.txt";

/// Command line for the recognition pass.
///
/// Argument grammar: input, output base, options, then the format token as
/// a trailing config name. The engine appends the output extension itself.
pub fn recognize_invocation(
    program: &Path,
    output_base: &Path,
    language: &str,
    format: &str,
    workspace: &Path,
) -> ToolInvocation {
    ToolInvocation::new(ExternalTool::Tesseract, program)
        .arg(LIST_FILE_NAME)
        .arg(output_base)
        .arg("-l")
        .arg(language)
        .arg(format)
        .current_dir(workspace)
}

/// Write the list file: one image name per line, page order.
///
/// Names are relative to the working area; the engine runs there and
/// resolves them against its own current directory.
pub async fn write_list_file(
    workspace: &Workspace,
    images: &[PathBuf],
) -> Result<PathBuf, Pdf2OcrError> {
    let mut contents = String::new();
    for image in images {
        let name = image
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Pdf2OcrError::Internal(format!(
                    "image path has no usable file name: {}",
                    image.display()
                ))
            })?;
        contents.push_str(name);
        contents.push('\n');
    }

    let path = workspace.path().join(LIST_FILE_NAME);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| Pdf2OcrError::Io {
            context: format!("writing the OCR list file '{}'", path.display()),
            source: e,
        })?;
    Ok(path)
}

/// Run the OCR engine over the images and return the produced output file.
pub async fn recognize(
    runner: &Arc<dyn ToolRunner>,
    program: &Path,
    images: &[PathBuf],
    workspace: &Workspace,
    output_base: &Path,
    language: &str,
    format: &str,
) -> Result<PathBuf, Pdf2OcrError> {
    write_list_file(workspace, images).await?;
    exec::run_checked(
        runner,
        recognize_invocation(program, output_base, language, format, workspace.path()),
    )
    .await?;

    let expected = expected_output_path(output_base, format);
    if !expected.exists() {
        return Err(Pdf2OcrError::OutputMissing { path: expected });
    }
    info!("wrote {}", expected.display());
    Ok(expected)
}
