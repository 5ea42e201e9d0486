//! Rasterize stage: the image toolkit turns page PDFs into TIFF images.
//!
//! ## Why these settings?
//!
//! The defaults reproduce the classic scanned-archive recipe: grayscale
//! (the OCR engine binarizes anyway, color buys nothing), LZW compression
//! (lossless and universally read back by OCR engines), white background
//! with alpha removed (transparent regions would otherwise rasterize to
//! black), 8-bit depth. `-density` must precede the input files: ImageMagick
//! applies it while *reading* a PDF; placed after the inputs it would only
//! annotate the already-rasterized image.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Pdf2OcrError;
use crate::exec::{self, ExternalTool, ToolInvocation, ToolRunner};
use crate::pipeline::workspace::Workspace;

/// Output pattern; numbering restarts at the toolkit's scene counter but
/// stays zero-padded, so name order is still page order.
pub const PAGE_TIFF_PATTERN: &str = "page_%04d.tif";

/// Settings applied after the inputs are read.
const POST_INPUT_SETTINGS: [&str; 10] = [
    "-type",
    "Grayscale",
    "-compress",
    "lzw",
    "-background",
    "white",
    "-alpha",
    "off",
    "-depth",
    "8",
];

/// Command line for one rasterization pass over all page PDFs.
pub fn rasterize_invocation(
    program: &Path,
    pages: &[PathBuf],
    workspace: &Path,
    dpi: u32,
) -> ToolInvocation {
    ToolInvocation::new(ExternalTool::Magick, program)
        .arg("-density")
        .arg(dpi.to_string())
        .args(pages.iter().map(|p| p.as_os_str().to_os_string()))
        .args(POST_INPUT_SETTINGS)
        .arg(PAGE_TIFF_PATTERN)
        .current_dir(workspace)
}

/// Rasterize every page PDF into a TIFF inside the working area.
pub async fn rasterize_pages(
    runner: &Arc<dyn ToolRunner>,
    program: &Path,
    pages: &[PathBuf],
    workspace: &Workspace,
    dpi: u32,
) -> Result<Vec<PathBuf>, Pdf2OcrError> {
    exec::run_checked(
        runner,
        rasterize_invocation(program, pages, workspace.path(), dpi),
    )
    .await?;

    let images = workspace.page_files("tif")?;
    if images.is_empty() {
        return Err(Pdf2OcrError::NoPagesProduced {
            tool: ExternalTool::Magick,
            dir: workspace.path().to_path_buf(),
        });
    }
    if images.len() != pages.len() {
        warn!(
            "expected {} image(s) but the image toolkit produced {}",
            pages.len(),
            images.len()
        );
    }
    info!("rasterized {} page(s) at {} DPI", images.len(), dpi);
    Ok(images)
}
