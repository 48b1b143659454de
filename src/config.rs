//! JSON configuration for the command-line tools.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineParams;
use crate::profile::ToleranceProfile;
use crate::types::MeasureMethod;

#[derive(Debug, Deserialize)]
pub struct MeasureToolConfig {
    /// Image to measure.
    pub input: PathBuf,
    /// Mask-acquisition method. AI methods degrade to Standard when no
    /// backend is attached, which is always the case for the offline tool.
    #[serde(default = "default_method")]
    pub method: MeasureMethod,
    /// Calibration ratio for the fixed rig.
    pub mm_per_px: f32,
    #[serde(default)]
    pub params: PipelineParams,
    /// Expected dimensions; when present the tool also reports pass/fail
    /// and the size grade.
    #[serde(default)]
    pub profile: Option<ToleranceProfile>,
    pub output: MeasureOutputConfig,
}

fn default_method() -> MeasureMethod {
    MeasureMethod::Standard
}

#[derive(Debug, Deserialize)]
pub struct MeasureOutputConfig {
    #[serde(rename = "result_json")]
    pub result_json: PathBuf,
    /// Optional dump of the segmented mask for visual inspection.
    #[serde(default, rename = "mask_png")]
    pub mask_png: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<MeasureToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
