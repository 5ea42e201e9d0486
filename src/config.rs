//! Configuration types for the scanned-PDF conversion pipeline.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Pdf2OcrError;
use crate::exec::{ExternalTool, SystemRunner, ToolRunner};
use crate::progress::{NoopProgressCallback, ProgressCallback};

/// Configuration for a scanned-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2ocr::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(400)
///     .language("deu")
///     .keep_intermediates(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rasterization density in DPI. Range: 72–1200. Default: 300.
    ///
    /// 300 DPI is the OCR engine's documented sweet spot: glyphs are large
    /// enough to segment reliably while the intermediate TIFFs stay a few
    /// megabytes per page. Raise it for small print or degraded scans;
    /// every step up inflates intermediate size and rasterization time
    /// quadratically.
    pub dpi: u32,

    /// Recognition language passed to the OCR engine (`-l`). Default: `"eng"`.
    ///
    /// Takes any tag the engine has trained data for, including combined
    /// tags like `"eng+fra"`. The engine itself reports unknown tags as a
    /// failed stage; no list is maintained here.
    pub language: String,

    /// Keep the temporary working area instead of deleting it. Default: false.
    ///
    /// The burst PDFs, rasterized TIFFs, and OCR list file normally vanish
    /// with the working area when the conversion finishes. Keeping them is
    /// the quickest way to see what the OCR engine actually looked at when
    /// output quality surprises you. The kept path is logged and returned in
    /// [`crate::output::ConversionOutput::kept_workspace`].
    pub keep_intermediates: bool,

    /// Executable for the PDF toolkit. Default: `"pdftk"` (found via PATH).
    pub pdftk_program: PathBuf,

    /// Executable for the image toolkit. Default: `"magick"` (found via PATH).
    pub magick_program: PathBuf,

    /// Executable for the OCR engine. Default: `"tesseract"` (found via PATH).
    pub tesseract_program: PathBuf,

    /// Alternative process runner. Default: none (spawn real processes).
    ///
    /// Tests inject scripted runners here to drive the pipeline without any
    /// of the external tools installed.
    pub runner: Option<Arc<dyn ToolRunner>>,

    /// Progress callback receiving stage events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            language: "eng".to_string(),
            keep_intermediates: false,
            pdftk_program: PathBuf::from(ExternalTool::Pdftk.default_program()),
            magick_program: PathBuf::from(ExternalTool::Magick.default_program()),
            tesseract_program: PathBuf::from(ExternalTool::Tesseract.default_program()),
            runner: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("language", &self.language)
            .field("keep_intermediates", &self.keep_intermediates)
            .field("pdftk_program", &self.pdftk_program)
            .field("magick_program", &self.magick_program)
            .field("tesseract_program", &self.tesseract_program)
            .field("runner", &self.runner.as_ref().map(|_| "<dyn ToolRunner>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured executable for a collaborator.
    pub fn program_for(&self, tool: ExternalTool) -> &Path {
        match tool {
            ExternalTool::Pdftk => &self.pdftk_program,
            ExternalTool::Magick => &self.magick_program,
            ExternalTool::Tesseract => &self.tesseract_program,
        }
    }

    /// The runner to execute collaborators with.
    pub fn runner(&self) -> Arc<dyn ToolRunner> {
        self.runner
            .clone()
            .unwrap_or_else(|| Arc::new(SystemRunner))
    }

    /// The progress callback, or a no-op when none is configured.
    pub fn progress(&self) -> ProgressCallback {
        self.progress_callback
            .clone()
            .unwrap_or_else(|| Arc::new(NoopProgressCallback))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 1200);
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn keep_intermediates(mut self, v: bool) -> Self {
        self.config.keep_intermediates = v;
        self
    }

    pub fn pdftk_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.pdftk_program = program.into();
        self
    }

    pub fn magick_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.magick_program = program.into();
        self
    }

    pub fn tesseract_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.tesseract_program = program.into();
        self
    }

    pub fn runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.config.runner = Some(runner);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2OcrError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 1200 {
            return Err(Pdf2OcrError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                c.dpi
            )));
        }
        if c.language.is_empty() || c.language.chars().any(char::is_whitespace) {
            return Err(Pdf2OcrError::InvalidConfig(format!(
                "Language must be a non-empty tag without whitespace, got '{}'",
                c.language
            )));
        }
        for tool in ExternalTool::ALL {
            if c.program_for(tool).as_os_str().is_empty() {
                return Err(Pdf2OcrError::InvalidConfig(format!(
                    "Executable for {tool} must not be empty"
                )));
            }
        }
        Ok(self.config)
    }
}
