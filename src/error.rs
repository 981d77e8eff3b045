//! Error types for the backend boundary.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

/// Why a backend command did not produce data.
///
/// None of these are fatal: the view keeps running and the next refresh
/// retries the command.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{command}: cannot read snapshot {path}: {source}")]
    Io {
        command: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{command}: backend unreachable: {details}")]
    Transport {
        command: &'static str,
        details: String,
    },

    #[error("{command}: malformed response: {details}")]
    Decode {
        command: &'static str,
        details: String,
    },

    #[error("{command}: snapshot has no `{section}` section")]
    MissingSection {
        command: &'static str,
        section: &'static str,
    },
}

impl BackendError {
    /// Name of the backend command that failed.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Io { command, .. }
            | Self::Transport { command, .. }
            | Self::Decode { command, .. }
            | Self::MissingSection { command, .. } => command,
        }
    }
}
