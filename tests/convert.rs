//! Pipeline integration tests with a scripted process runner.
//!
//! No external tools run here: the scripted runner stands in for pdftk,
//! magick and tesseract by writing the files each stage is expected to leave
//! behind. Real-tool coverage lives in `tests/e2e.rs`.

use pdf2ocr::{
    convert, convert_from_bytes, inspect, ConversionConfig, ExternalTool, Pdf2OcrError,
    ToolInvocation, ToolOutput, ToolRunner,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Scripted runner ──────────────────────────────────────────────────────────

/// One recorded collaborator call.
#[derive(Debug, Clone)]
struct RecordedCall {
    tool: ExternalTool,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

/// Stand-in for the three external tools.
///
/// Every call is recorded, then its on-disk effect is simulated: burst writes
/// page PDFs (plus pdftk's doc_data.txt side file), magick writes TIFFs, and
/// tesseract reads the list file and writes the output file. `fail_at` makes
/// one tool exit non-zero with scripted stderr instead.
struct ScriptedRunner {
    pages: usize,
    report: String,
    fail_at: Option<(ExternalTool, &'static str)>,
    calls: Mutex<Vec<RecordedCall>>,
    list_file: Mutex<Option<String>>,
}

impl ScriptedRunner {
    fn new(pages: usize) -> Arc<Self> {
        Self::with_report(pages, format!("NumberOfPages: {pages}\n"))
    }

    fn with_report(pages: usize, report: String) -> Arc<Self> {
        Arc::new(Self {
            pages,
            report,
            fail_at: None,
            calls: Mutex::new(Vec::new()),
            list_file: Mutex::new(None),
        })
    }

    fn failing_at(pages: usize, tool: ExternalTool, stderr: &'static str) -> Arc<Self> {
        Arc::new(Self {
            pages,
            report: format!("NumberOfPages: {pages}\n"),
            fail_at: Some((tool, stderr)),
            calls: Mutex::new(Vec::new()),
            list_file: Mutex::new(None),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_for(&self, tool: ExternalTool) -> usize {
        self.calls().iter().filter(|c| c.tool == tool).count()
    }

    fn list_file(&self) -> Option<String> {
        self.list_file.lock().unwrap().clone()
    }

    fn ok(stdout: &str) -> ToolOutput {
        ToolOutput {
            success: true,
            code: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, Pdf2OcrError> {
        let args: Vec<String> = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.calls.lock().unwrap().push(RecordedCall {
            tool: invocation.tool,
            args: args.clone(),
            cwd: invocation.cwd.clone(),
        });

        if let Some((tool, stderr)) = self.fail_at {
            // dump_data is exempt so a scripted pdftk failure hits the burst
            // stage, not the metadata read before it.
            if tool == invocation.tool && args.last().map(String::as_str) != Some("dump_data") {
                return Ok(ToolOutput {
                    success: false,
                    code: Some(3),
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                });
            }
        }

        match invocation.tool {
            ExternalTool::Pdftk if args.last().map(String::as_str) == Some("dump_data") => {
                Ok(Self::ok(&self.report))
            }
            ExternalTool::Pdftk => {
                let dir = invocation
                    .cwd
                    .as_deref()
                    .expect("burst runs in the working area");
                for n in 1..=self.pages {
                    std::fs::write(dir.join(format!("page_{n:04}.pdf")), b"%PDF-1.4 page")
                        .unwrap();
                }
                std::fs::write(dir.join("doc_data.txt"), self.report.as_bytes()).unwrap();
                Ok(Self::ok(""))
            }
            ExternalTool::Magick => {
                let dir = invocation
                    .cwd
                    .as_deref()
                    .expect("magick runs in the working area");
                for n in 0..self.pages {
                    std::fs::write(dir.join(format!("page_{n:04}.tif")), b"II*\x00").unwrap();
                }
                Ok(Self::ok(""))
            }
            ExternalTool::Tesseract => {
                let dir = invocation
                    .cwd
                    .as_deref()
                    .expect("tesseract runs in the working area");
                if let Ok(list) = std::fs::read_to_string(dir.join(&args[0])) {
                    *self.list_file.lock().unwrap() = Some(list);
                }
                let base = &args[1];
                let format = args.last().expect("format token is the last argument");
                let seq = self.calls_for(ExternalTool::Tesseract);
                std::fs::write(
                    format!("{base}.{format}"),
                    format!("recognized text (run {seq})\n"),
                )
                .unwrap();
                Ok(Self::ok(""))
            }
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(
        &path,
        b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<<>>\n%%EOF\n",
    )
    .unwrap();
    path
}

fn config_with(runner: Arc<ScriptedRunner>) -> ConversionConfig {
    ConversionConfig::builder().runner(runner).build().unwrap()
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_pipeline_writes_the_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(3);
    let config = config_with(Arc::clone(&runner));

    let out = convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .expect("conversion should succeed");

    assert_eq!(out.pages, 3);
    assert_eq!(out.format, "txt");
    assert!(out.kept_workspace.is_none());
    assert!(out.output_path.ends_with("scan_ocr.txt"), "{:?}", out.output_path);
    let text = std::fs::read_to_string(&out.output_path).unwrap();
    assert!(text.starts_with("recognized text"));
}

#[tokio::test]
async fn stages_run_in_order_inside_one_working_area() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(2);
    let config = config_with(Arc::clone(&runner));

    convert(&input, dir.path().join("scan_ocr"), "pdf", &config)
        .await
        .expect("conversion should succeed");

    let calls = runner.calls();
    let order: Vec<ExternalTool> = calls.iter().map(|c| c.tool).collect();
    assert_eq!(
        order,
        vec![
            ExternalTool::Pdftk, // dump_data
            ExternalTool::Pdftk, // burst
            ExternalTool::Magick,
            ExternalTool::Tesseract,
        ]
    );
    assert_eq!(calls[0].args.last().map(String::as_str), Some("dump_data"));
    assert!(calls[0].cwd.is_none());

    // Burst, rasterize and recognize all share one working area.
    let ws = calls[1].cwd.clone().expect("burst sets a working directory");
    assert_eq!(calls[2].cwd.as_ref(), Some(&ws));
    assert_eq!(calls[3].cwd.as_ref(), Some(&ws));

    // The working area is gone once the conversion finishes.
    assert!(!ws.exists());
}

#[tokio::test]
async fn command_lines_match_the_documented_recipe() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(2);
    let config = ConversionConfig::builder()
        .runner(Arc::clone(&runner) as Arc<dyn ToolRunner>)
        .dpi(400)
        .language("deu")
        .build()
        .unwrap();

    convert(&input, dir.path().join("scan_ocr"), "hocr", &config)
        .await
        .expect("conversion should succeed");

    let calls = runner.calls();

    // pdftk <input> burst output page_%04d.pdf
    let burst = &calls[1].args;
    assert!(burst[0].ends_with("scan.pdf"), "{burst:?}");
    assert_eq!(burst[1..], ["burst", "output", "page_%04d.pdf"]);

    // magick -density 400 <pages…> <settings…> page_%04d.tif
    let magick = &calls[2].args;
    assert_eq!(magick[0..2], ["-density", "400"]);
    assert!(magick[2].ends_with("page_0001.pdf"), "{magick:?}");
    assert!(magick[3].ends_with("page_0002.pdf"), "{magick:?}");
    assert!(magick.contains(&"-type".to_string()));
    assert!(magick.contains(&"Grayscale".to_string()));
    assert_eq!(magick.last().map(String::as_str), Some("page_%04d.tif"));

    // tesseract pages.txt <base> -l deu hocr
    let tess = &calls[3].args;
    assert_eq!(tess[0], "pages.txt");
    assert!(tess[1].ends_with("scan_ocr"), "{tess:?}");
    assert_eq!(tess[2..], ["-l", "deu", "hocr"]);
}

#[tokio::test]
async fn list_file_names_every_page_in_order() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(3);
    let config = config_with(Arc::clone(&runner));

    convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .expect("conversion should succeed");

    assert_eq!(
        runner.list_file().as_deref(),
        Some("page_0000.tif\npage_0001.tif\npage_0002.tif\n")
    );
}

#[tokio::test]
async fn only_the_output_file_is_left_next_to_the_input() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(2);
    let config = config_with(Arc::clone(&runner));

    convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .expect("conversion should succeed");

    // No burst pages, TIFFs, list file or doc_data.txt leak out of the
    // working area; the output directory gains exactly one file.
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["scan.pdf", "scan_ocr.txt"]);
}

#[tokio::test]
async fn rerun_overwrites_the_previous_output() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(1);
    let config = config_with(Arc::clone(&runner));
    let base = dir.path().join("scan_ocr");

    convert(&input, &base, "txt", &config).await.expect("first run");
    convert(&input, &base, "txt", &config).await.expect("second run");

    let text = std::fs::read_to_string(dir.path().join("scan_ocr.txt")).unwrap();
    assert_eq!(text, "recognized text (run 2)\n");

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["scan.pdf", "scan_ocr.txt"]);
}

// ── Input rejection ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_input_spawns_no_tools() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(1);
    let config = config_with(Arc::clone(&runner));

    let err = convert(
        dir.path().join("absent.pdf"),
        dir.path().join("out"),
        "txt",
        &config,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Pdf2OcrError::FileNotFound { .. }), "got: {err}");
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn non_pdf_input_spawns_no_tools() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("photo.pdf");
    std::fs::write(&path, b"GIF89a not a pdf at all").unwrap();
    let runner = ScriptedRunner::new(1);
    let config = config_with(Arc::clone(&runner));

    let err = convert(&path, dir.path().join("out"), "txt", &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Pdf2OcrError::NotAPdf { .. }), "got: {err}");
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn output_that_overwrites_the_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(1);
    let config = config_with(Arc::clone(&runner));

    // scan + .pdf resolves to the input file itself.
    let err = convert(&input, dir.path().join("scan"), "pdf", &config)
        .await
        .unwrap_err();

    assert!(
        matches!(err, Pdf2OcrError::OutputOverwritesInput { .. }),
        "got: {err}"
    );
    assert!(runner.calls().is_empty());
    assert!(std::fs::read(&input).unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn malformed_format_token_is_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(1);
    let config = config_with(Arc::clone(&runner));

    let err = convert(&input, dir.path().join("out"), "two words", &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Pdf2OcrError::InvalidFormat { .. }), "got: {err}");
    assert!(runner.calls().is_empty());
}

// ── Failure propagation ──────────────────────────────────────────────────────

#[tokio::test]
async fn burst_failure_stops_the_pipeline() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::failing_at(
        2,
        ExternalTool::Pdftk,
        "Error: Unexpected end of file while reading the input",
    );
    let config = config_with(Arc::clone(&runner));

    let err = convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            Pdf2OcrError::ToolFailed {
                tool: ExternalTool::Pdftk,
                ..
            }
        ),
        "got: {err}"
    );
    assert_eq!(runner.calls_for(ExternalTool::Magick), 0);
    assert_eq!(runner.calls_for(ExternalTool::Tesseract), 0);
}

#[tokio::test]
async fn rasterize_failure_aborts_before_recognition() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::failing_at(
        2,
        ExternalTool::Magick,
        "magick: no images defined `page_%04d.tif'",
    );
    let config = config_with(Arc::clone(&runner));

    let err = convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .unwrap_err();

    match &err {
        Pdf2OcrError::ToolFailed { tool, code, stderr } => {
            assert_eq!(*tool, ExternalTool::Magick);
            assert_eq!(*code, Some(3));
            assert!(stderr.contains("no images defined"), "got: {stderr}");
        }
        other => panic!("expected ToolFailed, got: {other}"),
    }
    assert_eq!(err.exit_code(), 3);

    // The OCR engine never ran and no output appeared.
    assert_eq!(runner.calls_for(ExternalTool::Tesseract), 0);
    assert!(!dir.path().join("scan_ocr.txt").exists());
}

#[tokio::test]
async fn burst_that_produces_no_pages_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(0);
    let config = config_with(Arc::clone(&runner));

    let err = convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            Pdf2OcrError::NoPagesProduced {
                tool: ExternalTool::Pdftk,
                ..
            }
        ),
        "got: {err}"
    );
    assert_eq!(runner.calls_for(ExternalTool::Magick), 0);
}

// ── Working area retention ───────────────────────────────────────────────────

#[tokio::test]
async fn keep_intermediates_leaves_the_working_area() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::new(2);
    let config = ConversionConfig::builder()
        .runner(Arc::clone(&runner) as Arc<dyn ToolRunner>)
        .keep_intermediates(true)
        .build()
        .unwrap();

    let out = convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .expect("conversion should succeed");

    let kept = out.kept_workspace.expect("working area should be reported");
    assert!(kept.is_dir());
    assert!(kept.join("page_0001.pdf").exists());
    assert!(kept.join("page_0000.tif").exists());
    assert!(kept.join("pages.txt").exists());
    assert!(kept.join("doc_data.txt").exists());

    std::fs::remove_dir_all(&kept).unwrap();
}

#[tokio::test]
async fn keep_intermediates_survives_a_failed_stage() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let runner = ScriptedRunner::failing_at(
        2,
        ExternalTool::Tesseract,
        "Error opening data file /usr/share/tesseract-ocr/tessdata/xyz.traineddata",
    );
    let config = ConversionConfig::builder()
        .runner(Arc::clone(&runner) as Arc<dyn ToolRunner>)
        .keep_intermediates(true)
        .build()
        .unwrap();

    let err = convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            Pdf2OcrError::ToolFailed {
                tool: ExternalTool::Tesseract,
                ..
            }
        ),
        "got: {err}"
    );

    // The kept area holds everything needed for a post-mortem.
    let ws = runner
        .calls()
        .last()
        .and_then(|c| c.cwd.clone())
        .expect("tesseract ran in the working area");
    assert!(ws.is_dir());
    assert!(ws.join("page_0000.tif").exists());

    std::fs::remove_dir_all(&ws).unwrap();
}

// ── Library surface ──────────────────────────────────────────────────────────

#[tokio::test]
async fn inspect_reads_metadata_without_converting() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let report =
        "InfoBegin\nInfoKey: Title\nInfoValue: Quarterly Report\nNumberOfPages: 12\n".to_string();
    let runner = ScriptedRunner::with_report(12, report);
    let config = config_with(Arc::clone(&runner));

    let info = inspect(&input, &config)
        .await
        .expect("inspect should succeed");

    assert_eq!(info.page_count, 12);
    assert_eq!(info.title.as_deref(), Some("Quarterly Report"));

    let calls = runner.calls();
    assert_eq!(calls.len(), 1, "only dump_data may run: {calls:?}");
    assert_eq!(calls[0].args.last().map(String::as_str), Some("dump_data"));
}

#[tokio::test]
async fn convert_from_bytes_runs_the_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(1);
    let config = config_with(Arc::clone(&runner));

    let out = convert_from_bytes(
        b"%PDF-1.4\nminimal document\n%%EOF\n",
        dir.path().join("bytes_ocr"),
        "txt",
        &config,
    )
    .await
    .expect("conversion should succeed");

    assert_eq!(out.pages, 1);
    assert!(dir.path().join("bytes_ocr.txt").exists());
}

#[tokio::test]
async fn progress_events_fire_in_stage_order() {
    use pdf2ocr::{ConversionProgressCallback, PipelineStage};

    #[derive(Default)]
    struct EventLog(Mutex<Vec<String>>);

    impl ConversionProgressCallback for EventLog {
        fn on_conversion_start(&self, total_pages: usize) {
            self.0.lock().unwrap().push(format!("start {total_pages}"));
        }
        fn on_stage_start(&self, stage: PipelineStage) {
            self.0.lock().unwrap().push(format!("+{stage}"));
        }
        fn on_stage_complete(&self, stage: PipelineStage, _elapsed_ms: u64, artifacts: usize) {
            self.0.lock().unwrap().push(format!("-{stage} {artifacts}"));
        }
        fn on_conversion_complete(&self, total_pages: usize, _elapsed_ms: u64) {
            self.0.lock().unwrap().push(format!("done {total_pages}"));
        }
    }

    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "scan.pdf");
    let log = Arc::new(EventLog::default());
    let runner = ScriptedRunner::new(2);
    let config = ConversionConfig::builder()
        .runner(Arc::clone(&runner) as Arc<dyn ToolRunner>)
        .progress_callback(Arc::clone(&log) as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    convert(&input, dir.path().join("scan_ocr"), "txt", &config)
        .await
        .expect("conversion should succeed");

    let events = log.0.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start 2",
            "+burst",
            "-burst 2",
            "+rasterize",
            "-rasterize 2",
            "+recognize",
            "-recognize 1",
            "done 2",
        ]
    );
}
