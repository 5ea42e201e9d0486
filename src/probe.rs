//! Availability and version probing for the three collaborators.
//!
//! Each tool has a cheap "print version and exit zero" invocation; running
//! all three answers "can a conversion possibly succeed here?" without
//! touching any input. The probe never fails as a whole: absent tools are
//! reported, not raised, so callers always get a complete picture.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConversionConfig;
use crate::exec::{self, ExternalTool, ToolInvocation, ToolRunner};

/// First thing that looks like a dotted version number in a banner.
static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)*").unwrap());

/// Availability report for one collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    /// Conventional tool name (`pdftk`, `magick`, `tesseract`).
    pub tool: String,
    /// The executable that was probed.
    pub program: PathBuf,
    pub available: bool,
    /// Parsed version number, when the tool printed one.
    pub version: Option<String>,
    /// Failure detail when unavailable.
    pub detail: Option<String>,
}

/// Combined report over all three collaborators, in pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProbe {
    pub tools: Vec<ToolStatus>,
}

impl ToolProbe {
    /// True when every collaborator answered its version command.
    pub fn all_available(&self) -> bool {
        self.tools.iter().all(|t| t.available)
    }

    /// Names of the collaborators that did not answer.
    pub fn missing(&self) -> Vec<&str> {
        self.tools
            .iter()
            .filter(|t| !t.available)
            .map(|t| t.tool.as_str())
            .collect()
    }
}

/// Probe every collaborator with its version command.
pub async fn probe_tools(config: &ConversionConfig) -> ToolProbe {
    let runner = config.runner();
    let mut tools = Vec::with_capacity(ExternalTool::ALL.len());
    for tool in ExternalTool::ALL {
        tools.push(probe_tool(&runner, tool, config.program_for(tool)).await);
    }
    ToolProbe { tools }
}

async fn probe_tool(
    runner: &Arc<dyn ToolRunner>,
    tool: ExternalTool,
    program: &Path,
) -> ToolStatus {
    let invocation =
        ToolInvocation::new(tool, program).args(tool.version_args().iter().copied());

    let mut status = ToolStatus {
        tool: tool.to_string(),
        program: program.to_path_buf(),
        available: false,
        version: None,
        detail: None,
    };

    match exec::run(runner, invocation).await {
        Ok(output) if output.success => {
            status.available = true;
            status.version = extract_version(&output.stdout_lossy(), &output.stderr_lossy());
        }
        Ok(output) => {
            status.detail = Some(match output.code {
                Some(code) => format!("version command exited with code {code}"),
                None => "version command was terminated by a signal".to_string(),
            });
        }
        Err(e) => {
            status.detail = Some(e.to_string());
        }
    }
    status
}

/// Tools disagree about where the banner goes (the OCR engine printed its
/// version on stderr for years); take stdout first, then stderr.
fn extract_version(stdout: &str, stderr: &str) -> Option<String> {
    let text = if stdout.trim().is_empty() { stderr } else { stdout };
    RE_VERSION.find(text).map(|m| m.as_str().to_string())
}
