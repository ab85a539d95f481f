//! Output records of indexing and classification.

use avatar_lens_api_core::{ClipId, ControlType, LayerKind};
use serde::{Deserialize, Serialize};

/// Menu path under which never-referenced clips are surfaced.
pub const UNCATEGORIZED_PATH: &str = "Uncategorized";

/// Parameter label used for uncategorized records that have no parameter.
pub const NO_PARAMETER: &str = "No Parameter";

/// One way a clip can be reached in the animator graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterClipRecord {
    /// Driving parameter; `None` for clips reached unconditionally.
    pub parameter_name: Option<String>,
    pub clip: ClipId,
    pub layer: LayerKind,
    pub state_path: String,
    pub trigger_value: Option<f32>,
    pub blend_tree_path: Option<String>,
}

impl ParameterClipRecord {
    pub fn parameter(&self) -> Option<&str> {
        self.parameter_name.as_deref()
    }
}

/// A clip as it appears behind a menu control (or under [`UNCATEGORIZED_PATH`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedClip {
    pub clip: ClipId,
    pub control_type: ControlType,
    pub parameter_name: String,
    pub menu_path: String,
    pub layer: LayerKind,
    pub trigger_value: Option<f32>,
}

impl ClassifiedClip {
    pub fn is_uncategorized(&self) -> bool {
        self.menu_path == UNCATEGORIZED_PATH
    }

    /// Identity used when publishing: every field but the trigger value.
    pub(crate) fn dedup_key(&self) -> (ClipId, ControlType, String, String, LayerKind) {
        (
            self.clip,
            self.control_type,
            self.parameter_name.clone(),
            self.menu_path.clone(),
            self.layer,
        )
    }
}
