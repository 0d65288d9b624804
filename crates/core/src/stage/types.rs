//! Types for the stage executor contract.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{FormatMode, Resolution};
use crate::job::JobState;

/// Characters that are invalid in output filenames on common filesystems.
static INVALID_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Maximum length of a sanitized filename stem.
const MAX_FILENAME_LEN: usize = 200;

/// The kind of pipeline stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Fetch the source stream.
    Download,
    /// Convert the fetched stream to the run's output format.
    Transcode,
}

impl StageKind {
    /// Returns the kind as a string (for labels and metrics).
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Download => "download",
            StageKind::Transcode => "transcode",
        }
    }

    /// The job state a job is in while this stage runs.
    pub fn job_state(&self) -> JobState {
        match self {
            StageKind::Download => JobState::Downloading,
            StageKind::Transcode => JobState::Encoding,
        }
    }
}

/// One stage invocation for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRequest {
    /// Job this stage belongs to.
    pub job_id: String,
    /// The source reference being processed.
    pub reference: String,
    /// Which stage to run.
    pub kind: StageKind,
    /// Maximum resolution, captured at run start.
    pub resolution: Resolution,
    /// Output format mode, captured at run start.
    pub format_mode: FormatMode,
    /// Output of the previous stage, if any. `None` for the download stage;
    /// the transcode stage receives the downloaded file here.
    pub input_path: Option<PathBuf>,
    /// Directory final files are written to.
    pub output_directory: PathBuf,
    /// Filename the stage should produce, without directory.
    pub dest_filename: String,
}

/// Incremental progress for one stage invocation.
///
/// Contract: `percent` is monotonically non-decreasing within one
/// invocation. The orchestrator treats any value >= 100 as stage completion
/// and ignores later events for that stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageProgress {
    /// Job the progress belongs to.
    pub job_id: String,
    /// Stage kind the progress belongs to.
    pub kind: StageKind,
    /// Completion percentage (0.0-100.0).
    pub percent: f32,
}

/// Result of a successful stage invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutcome {
    /// Where the stage wrote its output, if it produced a file.
    pub output_path: Option<PathBuf>,
}

/// Strips characters that are invalid in filenames and caps the length.
pub fn sanitized_filename(title: &str) -> String {
    let cleaned = INVALID_FILENAME_CHARS.replace_all(title, "");
    cleaned.chars().take(MAX_FILENAME_LEN).collect()
}

/// Builds the destination filename for a job title under the given format
/// mode. Passthrough keeps the source container, so only a sanitized stem is
/// produced; transcode modes append their suffix.
pub fn output_filename(title: &str, mode: FormatMode) -> String {
    let stem = sanitized_filename(title);
    match mode.output_suffix() {
        Some(suffix) => format!("{stem}{suffix}"),
        None => stem,
    }
}
