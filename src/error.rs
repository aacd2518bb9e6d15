use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("cursor {cursor} is out of range for a text of {len} characters")]
    OutOfRange { cursor: usize, len: usize },

    #[error("terminal display failed: {0}")]
    Display(#[from] io::Error),

    #[error("cannot save config to {}: {source}", path.display())]
    ConfigSave {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GameError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;
