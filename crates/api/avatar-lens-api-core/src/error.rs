use thiserror::Error;

use crate::ids::{ClipId, MachineId, MenuId, StateId};

/// Errors produced while loading or validating avatar asset data.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("avatar json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{owner} references missing {id}")]
    MissingClip { owner: String, id: ClipId },
    #[error("{owner} references missing {id}")]
    MissingState { owner: String, id: StateId },
    #[error("{owner} references missing {id}")]
    MissingMachine { owner: String, id: MachineId },
    #[error("{owner} references missing {id}")]
    MissingMenu { owner: String, id: MenuId },
    #[error("{controller}: {id} is listed by more than one state machine")]
    SharedState { controller: String, id: StateId },
    #[error("duplicate expression parameter '{0}'")]
    DuplicateParameter(String),
}
