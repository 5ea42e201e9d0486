//! Child-process execution for the three external collaborators.
//!
//! ## Why a runner trait?
//!
//! Every stage of the pipeline is a child process, so the seam for testing
//! sits exactly here: [`ToolRunner`] abstracts "spawn, wait, capture", and
//! [`crate::config::ConversionConfig`] lets callers inject an alternative
//! implementation. Tests drive the whole pipeline with scripted runners and
//! never need the real binaries installed.
//!
//! ## Why spawn_blocking?
//!
//! `std::process::Command::output()` blocks the calling thread until the
//! child exits. `tokio::task::spawn_blocking` moves that wait onto the
//! blocking thread pool so Tokio worker threads are never stalled, while the
//! pipeline itself stays strictly sequential: one tool at a time, each
//! awaited to completion before the next starts.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::error::Pdf2OcrError;

/// The three external programs this crate sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalTool {
    /// PDF toolkit: bursts the input into single-page PDFs, dumps metadata.
    Pdftk,
    /// ImageMagick: rasterizes page PDFs into TIFF images.
    Magick,
    /// OCR engine: recognizes the images and writes the output file.
    Tesseract,
}

impl ExternalTool {
    /// All collaborators, in pipeline order.
    pub const ALL: [ExternalTool; 3] = [
        ExternalTool::Pdftk,
        ExternalTool::Magick,
        ExternalTool::Tesseract,
    ];

    /// Conventional executable name, used unless the config overrides it.
    pub fn default_program(&self) -> &'static str {
        match self {
            ExternalTool::Pdftk => "pdftk",
            ExternalTool::Magick => "magick",
            ExternalTool::Tesseract => "tesseract",
        }
    }

    /// Arguments that make the tool print its version and exit zero.
    ///
    /// ImageMagick uses a single dash for long options; the other two take
    /// the GNU spelling.
    pub fn version_args(&self) -> &'static [&'static str] {
        match self {
            ExternalTool::Pdftk => &["--version"],
            ExternalTool::Magick => &["-version"],
            ExternalTool::Tesseract => &["--version"],
        }
    }

    /// One-line installation hint for error messages.
    pub fn install_hint(&self) -> &'static str {
        match self {
            ExternalTool::Pdftk => {
                "Install it with: apt install pdftk-java (Debian/Ubuntu) or brew install pdftk-java (macOS)."
            }
            ExternalTool::Magick => {
                "Install ImageMagick 7 with: apt install imagemagick (Debian/Ubuntu) or brew install imagemagick (macOS)."
            }
            ExternalTool::Tesseract => {
                "Install it with: apt install tesseract-ocr (Debian/Ubuntu) or brew install tesseract (macOS)."
            }
        }
    }
}

impl fmt::Display for ExternalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

/// A fully assembled command line for one collaborator invocation.
///
/// Built by the pipeline stages, executed by a [`ToolRunner`]. Arguments are
/// `OsString` so non-UTF-8 paths survive the trip.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool: ExternalTool,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Working directory for the child, if it must differ from the parent's.
    pub cwd: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(tool: ExternalTool, program: impl Into<PathBuf>) -> Self {
        ToolInvocation {
            tool,
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable command line for logs and diagnostics.
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Captured result of a finished collaborator process.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Spawns a collaborator process and waits for it.
///
/// Implementations must be cheap to call repeatedly; the pipeline runs one
/// invocation at a time and never caches runners.
pub trait ToolRunner: Send + Sync {
    /// Execute the invocation to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit is NOT an error at this level; it comes back in
    /// [`ToolOutput`] so callers can attach stage context. Only failures to
    /// start the process at all are `Err`.
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, Pdf2OcrError>;
}

/// Default runner: real child processes via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, Pdf2OcrError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Pdf2OcrError::ToolMissing {
                tool: invocation.tool,
                program: invocation.program.clone(),
            },
            _ => Pdf2OcrError::ToolSpawnFailed {
                tool: invocation.tool,
                program: invocation.program.clone(),
                source: e,
            },
        })?;

        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Run an invocation off the async runtime without gating on exit status.
pub async fn run(
    runner: &Arc<dyn ToolRunner>,
    invocation: ToolInvocation,
) -> Result<ToolOutput, Pdf2OcrError> {
    debug!("running: {}", invocation.display_line());
    let runner = Arc::clone(runner);
    tokio::task::spawn_blocking(move || runner.run(&invocation))
        .await
        .map_err(|e| Pdf2OcrError::Internal(format!("Tool task panicked: {}", e)))?
}

/// Run an invocation and require a zero exit status.
///
/// On non-zero exit the tool's stderr is captured into
/// [`Pdf2OcrError::ToolFailed`] verbatim; the pipeline aborts there.
pub async fn run_checked(
    runner: &Arc<dyn ToolRunner>,
    invocation: ToolInvocation,
) -> Result<ToolOutput, Pdf2OcrError> {
    let tool = invocation.tool;
    let output = run(runner, invocation).await?;
    if !output.success {
        return Err(Pdf2OcrError::ToolFailed {
            tool,
            code: output.code,
            stderr: output.stderr_lossy(),
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_line_joins_program_and_args() {
        let inv = ToolInvocation::new(ExternalTool::Pdftk, "pdftk")
            .arg("input.pdf")
            .arg("burst")
            .args(["output", "page_%04d.pdf"]);
        assert_eq!(inv.display_line(), "pdftk input.pdf burst output page_%04d.pdf");
    }

    #[test]
    fn system_runner_maps_missing_binary_to_tool_missing() {
        let inv = ToolInvocation::new(
            ExternalTool::Tesseract,
            "definitely-not-a-real-ocr-binary-7f3a",
        );
        let err = SystemRunner.run(&inv).unwrap_err();
        match err {
            Pdf2OcrError::ToolMissing { tool, .. } => assert_eq!(tool, ExternalTool::Tesseract),
            other => panic!("expected ToolMissing, got: {other:?}"),
        }
        assert_eq!(err_code_for_missing(), 127);
    }

    fn err_code_for_missing() -> i32 {
        Pdf2OcrError::ToolMissing {
            tool: ExternalTool::Tesseract,
            program: PathBuf::from("tesseract"),
        }
        .exit_code()
    }

    #[tokio::test]
    async fn run_checked_turns_nonzero_exit_into_tool_failed() {
        struct FailingRunner;
        impl ToolRunner for FailingRunner {
            fn run(&self, _invocation: &ToolInvocation) -> Result<ToolOutput, Pdf2OcrError> {
                Ok(ToolOutput {
                    success: false,
                    code: Some(2),
                    stdout: Vec::new(),
                    stderr: b"Error: Unable to find file.".to_vec(),
                })
            }
        }

        let runner: Arc<dyn ToolRunner> = Arc::new(FailingRunner);
        let inv = ToolInvocation::new(ExternalTool::Pdftk, "pdftk").arg("nope.pdf");
        let err = run_checked(&runner, inv).await.unwrap_err();
        match err {
            Pdf2OcrError::ToolFailed { tool, code, stderr } => {
                assert_eq!(tool, ExternalTool::Pdftk);
                assert_eq!(code, Some(2));
                assert!(stderr.contains("Unable to find file"));
            }
            other => panic!("expected ToolFailed, got: {other:?}"),
        }
    }

    #[test]
    fn version_args_per_tool() {
        assert_eq!(ExternalTool::Pdftk.version_args(), &["--version"]);
        assert_eq!(ExternalTool::Magick.version_args(), &["-version"]);
        assert_eq!(ExternalTool::Tesseract.version_args(), &["--version"]);
    }
}
