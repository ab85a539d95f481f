use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use avatar_lens_motion_core::MotionConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub motion: MotionConfig,
    /// Select the first listed clip whenever a model is bound.
    pub auto_select_first_clip: bool,
}

impl SessionConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse session config")
    }
}
