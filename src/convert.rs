//! Conversion entry points: the three-tool pipeline, start to finish.
//!
//! ## Why one linear path?
//!
//! Each stage is a whole-document child process and stage N+1 reads the
//! files stage N wrote, so there is nothing to parallelize inside a single
//! conversion. The driver runs the stages strictly in order and aborts on
//! the first failure, reproducing the classic shell recipe with real error
//! reporting and cleanup around it.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::ConversionConfig;
use crate::error::Pdf2OcrError;
use crate::exec::ExternalTool;
use crate::output::{ConversionOutput, ConversionStats, DocumentInfo};
use crate::pipeline::{burst, input, metadata, rasterize, recognize, workspace::Workspace};
use crate::progress::{PipelineStage, ProgressCallback};

/// Convert a scanned PDF into `<output_base>.<format>`.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`       — path to the source PDF (extension included)
/// * `output_base` — base name for the result, without extension; the OCR
///   engine appends its own
/// * `format`      — output format token the OCR engine understands
///   (`"pdf"`, `"txt"`, `"hocr"`, …)
/// * `config`      — pipeline configuration
///
/// # Errors
/// Any stage failing aborts the whole conversion; see
/// [`Pdf2OcrError`] for the taxonomy. There are no retries and no partial
/// outputs: when this returns `Ok`, the output file exists.
pub async fn convert(
    input: impl AsRef<Path>,
    output_base: impl AsRef<Path>,
    format: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2OcrError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    let output_base = output_base.as_ref();
    info!(
        "starting conversion: {} -> {}.{}",
        input.display(),
        output_base.display(),
        format
    );

    // ── Step 1: Resolve paths ────────────────────────────────────────────
    input::validate_format_token(format)?;
    let pdf_path = input::resolve_pdf(input)?;
    let base = input::resolve_output_base(output_base)?;
    let expected = input::expected_output_path(&base, format);
    if expected == pdf_path {
        return Err(Pdf2OcrError::OutputOverwritesInput { path: expected });
    }

    // ── Step 2: Working area ─────────────────────────────────────────────
    let workspace = Workspace::create()?;

    let runner = config.runner();
    let progress = config.progress();

    // Stages run inside one block so the working area can still be kept (or
    // dropped) on the error path before the result propagates.
    let outcome = async {
        // ── Step 3: Page count and document info ────────────────────────
        let doc = metadata::document_info(
            &runner,
            config.program_for(ExternalTool::Pdftk),
            &pdf_path,
        )
        .await?;
        progress.on_conversion_start(doc.page_count);

        // ── Step 4: Burst into single-page PDFs ──────────────────────────
        let (page_pdfs, burst_ms) = timed_stage(
            &progress,
            PipelineStage::Burst,
            burst::burst_pages(
                &runner,
                config.program_for(ExternalTool::Pdftk),
                &pdf_path,
                &workspace,
            ),
        )
        .await?;
        progress.on_stage_complete(PipelineStage::Burst, burst_ms, page_pdfs.len());
        debug!("burst stage took {}ms", burst_ms);

        // ── Step 5: Rasterize pages to TIFF ──────────────────────────────
        let (images, rasterize_ms) = timed_stage(
            &progress,
            PipelineStage::Rasterize,
            rasterize::rasterize_pages(
                &runner,
                config.program_for(ExternalTool::Magick),
                &page_pdfs,
                &workspace,
                config.dpi,
            ),
        )
        .await?;
        progress.on_stage_complete(PipelineStage::Rasterize, rasterize_ms, images.len());
        debug!("rasterize stage took {}ms", rasterize_ms);

        // ── Step 6: Recognize text ───────────────────────────────────────
        let (output_path, recognize_ms) = timed_stage(
            &progress,
            PipelineStage::Recognize,
            recognize::recognize(
                &runner,
                config.program_for(ExternalTool::Tesseract),
                &images,
                &workspace,
                &base,
                &config.language,
                format,
            ),
        )
        .await?;
        progress.on_stage_complete(PipelineStage::Recognize, recognize_ms, 1);
        debug!("recognize stage took {}ms", recognize_ms);

        Ok(StageOutcome {
            pages: images.len(),
            output_path,
            burst_ms,
            rasterize_ms,
            recognize_ms,
        })
    }
    .await;

    // ── Step 7: Finish the working area, then report ─────────────────────
    let kept_workspace = if config.keep_intermediates {
        Some(workspace.keep())
    } else {
        drop(workspace);
        None
    };

    let outcome = outcome?;
    let stats = ConversionStats {
        burst_ms: outcome.burst_ms,
        rasterize_ms: outcome.rasterize_ms,
        recognize_ms: outcome.recognize_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };
    progress.on_conversion_complete(outcome.pages, stats.total_ms);
    info!(
        "conversion complete: {} page(s) -> {} in {}ms",
        outcome.pages,
        outcome.output_path.display(),
        stats.total_ms
    );

    Ok(ConversionOutput {
        output_path: outcome.output_path,
        pages: outcome.pages,
        format: format.to_string(),
        kept_workspace,
        stats,
    })
}

/// What the stage block hands back on success.
struct StageOutcome {
    pages: usize,
    output_path: PathBuf,
    burst_ms: u64,
    rasterize_ms: u64,
    recognize_ms: u64,
}

/// Time a stage and report its failure to the progress callback.
async fn timed_stage<T, F>(
    progress: &ProgressCallback,
    stage: PipelineStage,
    fut: F,
) -> Result<(T, u64), Pdf2OcrError>
where
    F: Future<Output = Result<T, Pdf2OcrError>>,
{
    progress.on_stage_start(stage);
    let start = Instant::now();
    match fut.await {
        Ok(value) => Ok((value, start.elapsed().as_millis() as u64)),
        Err(e) => {
            progress.on_stage_error(stage, &e.to_string());
            Err(e)
        }
    }
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output_base: impl AsRef<Path>,
    format: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2OcrError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2OcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, output_base, format, config))
}

/// Read document info without converting anything.
///
/// Only the PDF toolkit is involved; the image toolkit and OCR engine are
/// never spawned.
pub async fn inspect(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentInfo, Pdf2OcrError> {
    let pdf_path = input::resolve_pdf(input.as_ref())?;
    let runner = config.runner();
    metadata::document_info(&runner, config.program_for(ExternalTool::Pdftk), &pdf_path).await
}

/// Convert PDF bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is cleaned up on
/// return or panic; the external tools need a real file to work on.
///
/// # Example
/// ```rust,no_run
/// use pdf2ocr::{convert_from_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("scan.pdf")?;
/// let config = ConversionConfig::default();
/// let output = convert_from_bytes(&bytes, "scan_ocr", "txt", &config).await?;
/// println!("wrote {}", output.output_path.display());
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: &[u8],
    output_base: impl AsRef<Path>,
    format: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2OcrError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("pdf2ocr-input-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2OcrError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2OcrError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| Pdf2OcrError::Internal(format!("tempfile flush: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `convert` returns.
    convert(tmp.path(), output_base, format, config).await
}
