//! Document metadata via the PDF toolkit's `dump_data` report.
//!
//! The toolkit prints a line-oriented report: `NumberOfPages`, `PdfID`,
//! page-media blocks, and the document info dictionary as
//! `InfoBegin`/`InfoKey`/`InfoValue` triples. Only the page count and the
//! common info keys are extracted; values are reproduced exactly as the
//! toolkit prints them (it escapes non-Latin text itself).

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::Pdf2OcrError;
use crate::exec::{self, ExternalTool, ToolInvocation, ToolRunner};
use crate::output::DocumentInfo;

/// Command line for the metadata dump.
pub fn dump_data_invocation(program: &Path, pdf: &Path) -> ToolInvocation {
    ToolInvocation::new(ExternalTool::Pdftk, program)
        .arg(pdf)
        .arg("dump_data")
}

/// Run `dump_data` and parse the report.
///
/// This doubles as the pipeline's corruption check: the toolkit refuses to
/// read a broken PDF here, before any page work has been spent on it.
pub async fn document_info(
    runner: &Arc<dyn ToolRunner>,
    program: &Path,
    pdf: &Path,
) -> Result<DocumentInfo, Pdf2OcrError> {
    let output = exec::run_checked(runner, dump_data_invocation(program, pdf)).await?;
    let info = parse_dump_data(&output.stdout_lossy())?;
    debug!("document has {} page(s)", info.page_count);
    Ok(info)
}

/// Parse a `dump_data` report into [`DocumentInfo`].
pub fn parse_dump_data(report: &str) -> Result<DocumentInfo, Pdf2OcrError> {
    let mut info = DocumentInfo::default();
    let mut page_count: Option<usize> = None;
    let mut pending_key: Option<String> = None;

    for line in report.lines() {
        if let Some(rest) = line.strip_prefix("InfoKey:") {
            pending_key = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("InfoValue:") {
            let value = rest.trim();
            let target = match pending_key.take().as_deref() {
                Some("Title") => &mut info.title,
                Some("Author") => &mut info.author,
                Some("Subject") => &mut info.subject,
                Some("Creator") => &mut info.creator,
                Some("Producer") => &mut info.producer,
                Some("CreationDate") => &mut info.creation_date,
                Some("ModDate") => &mut info.modification_date,
                _ => continue,
            };
            if !value.is_empty() {
                *target = Some(value.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("NumberOfPages:") {
            page_count = rest.trim().parse().ok();
        }
    }

    info.page_count = page_count.ok_or_else(|| Pdf2OcrError::MetadataParse {
        detail: "the report has no NumberOfPages line".to_string(),
    })?;
    Ok(info)
}
