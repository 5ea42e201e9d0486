//! Burst stage: the PDF toolkit splits the input into single-page PDFs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::Pdf2OcrError;
use crate::exec::{self, ExternalTool, ToolInvocation, ToolRunner};
use crate::pipeline::workspace::Workspace;

/// Output pattern handed to the toolkit; `%04d` keeps name order = page order.
pub const PAGE_PDF_PATTERN: &str = "page_%04d.pdf";

/// Command line for the burst.
///
/// The toolkit writes its `doc_data.txt` side file into whatever directory
/// it runs in, so the child runs inside the working area; the pattern is
/// relative and lands there too.
pub fn burst_invocation(program: &Path, pdf: &Path, workspace: &Path) -> ToolInvocation {
    ToolInvocation::new(ExternalTool::Pdftk, program)
        .arg(pdf)
        .arg("burst")
        .arg("output")
        .arg(PAGE_PDF_PATTERN)
        .current_dir(workspace)
}

/// Split the input PDF into per-page files inside the working area.
pub async fn burst_pages(
    runner: &Arc<dyn ToolRunner>,
    program: &Path,
    pdf: &Path,
    workspace: &Workspace,
) -> Result<Vec<PathBuf>, Pdf2OcrError> {
    exec::run_checked(runner, burst_invocation(program, pdf, workspace.path())).await?;

    let pages = workspace.page_files("pdf")?;
    if pages.is_empty() {
        return Err(Pdf2OcrError::NoPagesProduced {
            tool: ExternalTool::Pdftk,
            dir: workspace.path().to_path_buf(),
        });
    }
    info!("burst into {} page(s)", pages.len());
    Ok(pages)
}
