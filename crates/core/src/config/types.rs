use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    pub output: RunConfig,
}

/// Output configuration for a batch run.
///
/// Captured once when a run starts and applied identically to every job in
/// that run; later edits only affect the next run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    /// Directory final files are written to.
    pub directory: PathBuf,

    /// Maximum resolution to fetch.
    #[serde(default)]
    pub resolution: Resolution,

    /// Output format mode.
    #[serde(default)]
    pub format_mode: FormatMode,
}

/// Maximum resolution for the download stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Resolution {
    /// 720p (1280x720)
    #[serde(rename = "720p")]
    R720p,
    /// 1080p (1920x1080)
    #[serde(rename = "1080p")]
    R1080p,
    /// 4K/2160p (3840x2160)
    #[serde(rename = "4k")]
    R2160p,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::R1080p
    }
}

impl Resolution {
    /// Returns the resolution as a display keyword.
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Resolution::R720p => "720p",
            Resolution::R1080p => "1080p",
            Resolution::R2160p => "2160p",
        }
    }

    /// Maximum frame height in pixels.
    pub fn max_height(&self) -> u32 {
        match self {
            Resolution::R720p => 720,
            Resolution::R1080p => 1080,
            Resolution::R2160p => 2160,
        }
    }
}

/// Output format mode for a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatMode {
    /// Keep the downloaded stream as-is, no transcode stage.
    Passthrough,
    /// Transcode to ProRes 422 for heavy editing.
    Prores,
    /// Transcode to H.264 with a constant frame rate.
    H264Cfr,
}

impl Default for FormatMode {
    fn default() -> Self {
        FormatMode::H264Cfr
    }
}

impl FormatMode {
    /// Whether this mode needs a transcode stage after the download.
    pub fn requires_transcode(&self) -> bool {
        !matches!(self, FormatMode::Passthrough)
    }

    /// Filename suffix appended to transcoded output, if any.
    pub fn output_suffix(&self) -> Option<&'static str> {
        match self {
            FormatMode::Passthrough => None,
            FormatMode::Prores => Some("_ProRes.mov"),
            FormatMode::H264Cfr => Some("_CFR.mp4"),
        }
    }

    /// Returns the mode as a string (for labels and metrics).
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatMode::Passthrough => "passthrough",
            FormatMode::Prores => "prores",
            FormatMode::H264Cfr => "h264_cfr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[output]
directory = "/downloads"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.directory, PathBuf::from("/downloads"));
        assert_eq!(config.output.resolution, Resolution::R1080p);
        assert_eq!(config.output.format_mode, FormatMode::H264Cfr);
    }

    #[test]
    fn test_deserialize_full_output_section() {
        let toml = r#"
[output]
directory = "/media/edit"
resolution = "4k"
format_mode = "prores"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.resolution, Resolution::R2160p);
        assert_eq!(config.output.format_mode, FormatMode::Prores);
    }

    #[test]
    fn test_deserialize_missing_output_fails() {
        let toml = r#"
[orchestrator]
start_stagger_ms = 100
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolution_keywords_and_heights() {
        assert_eq!(Resolution::R720p.as_keyword(), "720p");
        assert_eq!(Resolution::R2160p.max_height(), 2160);
        assert!(Resolution::R720p < Resolution::R1080p);
    }

    #[test]
    fn test_format_mode_transcode_and_suffix() {
        assert!(!FormatMode::Passthrough.requires_transcode());
        assert!(FormatMode::Prores.requires_transcode());
        assert!(FormatMode::H264Cfr.requires_transcode());
        assert_eq!(FormatMode::Passthrough.output_suffix(), None);
        assert_eq!(FormatMode::Prores.output_suffix(), Some("_ProRes.mov"));
        assert_eq!(FormatMode::H264Cfr.output_suffix(), Some("_CFR.mp4"));
    }

    #[test]
    fn test_resolution_serde_names() {
        let json = serde_json::to_string(&Resolution::R2160p).unwrap();
        assert_eq!(json, "\"4k\"");
        let parsed: Resolution = serde_json::from_str("\"720p\"").unwrap();
        assert_eq!(parsed, Resolution::R720p);
    }
}
