//! CLI binary for pdf2ocr.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2ocr::{
    convert, inspect, probe_tools, ConversionConfig, ConversionProgressCallback, Pdf2OcrError,
    PipelineStage, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live stage bar and per-stage log
/// lines using [indicatif]. The bar counts pipeline stages rather than pages;
/// the external tools give no usable per-page feedback while they run.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
}

/// Burst, rasterize, recognize.
const STAGE_COUNT: u64 = 3;

impl CliProgressCallback {
    /// Create a callback that starts as a plain spinner and switches to the
    /// stage bar in `on_conversion_start` (once the page count is known).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        // Initial style: spinner only (nothing to count yet).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Switch to the full stage-bar style.
    fn activate_bar(&self) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos}/{len} stages  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(STAGE_COUNT);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_pages} page(s)…"))
        ));
    }

    fn on_stage_start(&self, stage: PipelineStage) {
        self.bar.set_message(stage.description().to_string());
    }

    fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64, artifacts: usize) {
        self.bar.println(format!(
            "  {} {:<10} {:<10} {}",
            green("✓"),
            stage.name(),
            dim(&format!("{artifacts} file(s)")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_stage_error(&self, stage: PipelineStage, error: &str) {
        // First line only; main prints the full diagnostics once the bar
        // is out of the way.
        let first = error.lines().next().unwrap_or("failed");
        self.bar
            .println(format!("  {} {:<10} {}", red("✗"), stage.name(), red(first)));
        self.bar.finish_and_clear();
    }

    fn on_conversion_complete(&self, total_pages: usize, elapsed_ms: u64) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} page(s) recognized in {:.1}s",
            green("✔"),
            bold(&total_pages.to_string()),
            elapsed_ms as f64 / 1000.0
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scanned PDF to plain text (writes scan_ocr.txt)
  pdf2ocr scan.pdf scan_ocr txt

  # Searchable PDF: page images with an invisible text layer
  pdf2ocr scan.pdf scan_ocr pdf

  # German document at a higher density
  pdf2ocr --lang deu --dpi 400 brief.pdf brief_ocr txt

  # Keep the burst PDFs and TIFFs for inspection
  pdf2ocr --keep-intermediates scan.pdf scan_ocr txt

  # Page count and document info only, no conversion
  pdf2ocr --inspect-only scan.pdf

  # Verify the external tools before a batch run
  pdf2ocr --check-tools

  # JSON result for scripting
  pdf2ocr --json scan.pdf scan_ocr txt > result.json

OUTPUT FORMATS:
  The format token is handed to the OCR engine unchanged, so anything the
  installed engine supports works. Common tokens:
    txt    plain text
    pdf    searchable PDF (original images, invisible text layer)
    hocr   hOCR XHTML with word bounding boxes
    tsv    tab-separated values with per-word confidence

REQUIRED EXTERNAL TOOLS:
  Tool       Role                      Debian/Ubuntu package
  ─────────  ────────────────────────  ─────────────────────
  pdftk      page splitting, metadata  pdftk-java
  magick     rasterization             imagemagick
  tesseract  text recognition          tesseract-ocr

  Recognizing languages other than English also needs the matching
  tesseract data package (e.g. tesseract-ocr-deu for --lang deu).

EXIT CODES:
  0    success
  1    conversion failed (bad input, I/O or parse errors)
  2    usage error
  127  a required external tool is not installed
  else the failing tool's own exit code, passed through

ENVIRONMENT VARIABLES:
  PDF2OCR_DPI        Rasterization density (same as --dpi)
  PDF2OCR_LANG       Recognition language (same as --lang)
  PDF2OCR_PDFTK      Path to the pdftk executable
  PDF2OCR_MAGICK     Path to the ImageMagick executable
  PDF2OCR_TESSERACT  Path to the tesseract executable
  RUST_LOG           Tracing filter, overrides -v/-q
"#;

/// Make a scanned PDF searchable with pdftk, ImageMagick, and Tesseract.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2ocr",
    version,
    about = "Make a scanned PDF searchable using pdftk, ImageMagick, and Tesseract",
    long_about = "Convert a scanned (image-only) PDF into a searchable file by splitting it \
into one PDF per page with pdftk, rasterizing the pages with ImageMagick, and recognizing \
the text with Tesseract. All three tools must be installed; `pdf2ocr --check-tools` \
verifies them and prints their versions.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Scanned PDF to convert, extension included.
    #[arg(value_name = "INPUT", required_unless_present = "check_tools")]
    input: Option<PathBuf>,

    /// Output basename without extension; the OCR engine appends `.<FORMAT>`.
    #[arg(
        value_name = "OUTPUT_BASE",
        required_unless_present_any = ["check_tools", "inspect_only"]
    )]
    output_base: Option<PathBuf>,

    /// Output format token for the OCR engine: txt, pdf, hocr, tsv, …
    #[arg(
        value_name = "FORMAT",
        required_unless_present_any = ["check_tools", "inspect_only"]
    )]
    format: Option<String>,

    /// Rasterization density in DPI (72–1200).
    #[arg(long, env = "PDF2OCR_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// Recognition language tag, e.g. eng, deu, eng+fra.
    #[arg(short, long, env = "PDF2OCR_LANG", default_value = "eng")]
    lang: String,

    /// Keep the temporary working area (burst PDFs, TIFFs, list file).
    #[arg(long, env = "PDF2OCR_KEEP_INTERMEDIATES")]
    keep_intermediates: bool,

    /// Path to the pdftk executable.
    #[arg(long, env = "PDF2OCR_PDFTK", value_name = "PATH")]
    pdftk: Option<PathBuf>,

    /// Path to the ImageMagick executable.
    #[arg(long, env = "PDF2OCR_MAGICK", value_name = "PATH")]
    magick: Option<PathBuf>,

    /// Path to the tesseract executable.
    #[arg(long, env = "PDF2OCR_TESSERACT", value_name = "PATH")]
    tesseract: Option<PathBuf>,

    /// Print page count and document info only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Probe the three external tools and exit.
    #[arg(long)]
    check_tools: bool,

    /// Output structured JSON instead of human-readable text.
    #[arg(long, env = "PDF2OCR_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2OCR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2OCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2OCR_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli, show_progress).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", red("error:"));
            for cause in err.chain().skip(1) {
                eprintln!("  {} {cause}", dim("caused by:"));
            }
            // Tool failures carry the tool's own exit code; a missing tool
            // maps to the shell convention 127; everything else is 1.
            let code = err
                .downcast_ref::<Pdf2OcrError>()
                .map(Pdf2OcrError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli, show_progress: bool) -> Result<ExitCode> {
    // ── Tool check mode ──────────────────────────────────────────────────
    if cli.check_tools {
        let config = build_config(&cli, None)?;
        let probe = probe_tools(&config).await;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&probe).context("Failed to serialize tool report")?
            );
        } else {
            for status in &probe.tools {
                if status.available {
                    println!(
                        "{} {:<10} {:<10} {}",
                        green("✓"),
                        status.tool,
                        status.version.as_deref().unwrap_or("?"),
                        dim(&status.program.display().to_string()),
                    );
                } else {
                    println!(
                        "{} {:<10} {}",
                        red("✗"),
                        status.tool,
                        red(status.detail.as_deref().unwrap_or("not available")),
                    );
                }
            }
        }

        return Ok(if probe.all_available() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(127)
        });
    }

    // clap guarantees INPUT for every mode except --check-tools.
    let input = cli.input.clone().context("missing input path")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        let meta = inspect(&input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:      {}", input.display());
            println!("Pages:     {}", meta.page_count);
            if let Some(ref t) = meta.title {
                println!("Title:     {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:    {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:   {}", s);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:   {}", c);
            }
            if let Some(ref p) = meta.producer {
                println!("Producer:  {}", p);
            }
            if let Some(ref d) = meta.creation_date {
                println!("Created:   {}", d);
            }
            if let Some(ref d) = meta.modification_date {
                println!("Modified:  {}", d);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Build config ─────────────────────────────────────────────────────
    // The bar starts as a spinner (no page count yet); `on_conversion_start`
    // switches it to the stage bar once the PDF has been inspected.
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // clap guarantees both of these once --check-tools/--inspect-only are off.
    let output_base = cli
        .output_base
        .clone()
        .context("missing output basename")?;
    let format = cli.format.clone().context("missing format token")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&input, &output_base, &format, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{json}");
    } else if !cli.quiet {
        // The callback already printed the final green tick when active.
        if !show_progress {
            eprintln!(
                "{} {} page(s) recognized in {:.1}s",
                green("✔"),
                output.pages,
                output.stats.total_ms as f64 / 1000.0
            );
        }
        eprintln!(
            "   {}  →  {}",
            dim(&format!(
                "burst {}ms, rasterize {}ms, recognize {}ms",
                output.stats.burst_ms, output.stats.rasterize_ms, output.stats.recognize_ms
            )),
            bold(&output.output_path.display().to_string()),
        );
        if let Some(ref kept) = output.kept_workspace {
            eprintln!("   {} {}", dim("intermediates kept at"), kept.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.lang.as_str())
        .keep_intermediates(cli.keep_intermediates);

    if let Some(ref program) = cli.pdftk {
        builder = builder.pdftk_program(program);
    }
    if let Some(ref program) = cli.magick {
        builder = builder.magick_program(program);
    }
    if let Some(ref program) = cli.tesseract {
        builder = builder.tesseract_program(program);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
