use std::path::PathBuf;
use thiserror::Error;

/// Exit status for a malformed edit, kept apart from server-side failures.
pub const EXIT_MALFORMED_EDIT: i32 = 2;

#[derive(Error, Debug)]
pub enum OsdfError {
    #[error("No credential file found at {}. Run `osdf init` first.", .0.display())]
    ConfigMissing(PathBuf),

    #[error(
        "Credential file {} has mode {mode:04o}; it must be readable only by its owner (0400).",
        path.display()
    )]
    ConfigInsecure { path: PathBuf, mode: u32 },

    #[error("Invalid credential file: {0}")]
    ConfigInvalid(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error [{status}]: {message}")]
    Status { status: u16, message: String },

    #[error("Unable to retrieve node {id}: {source}")]
    NodeUnavailable {
        id: String,
        #[source]
        source: Box<OsdfError>,
    },

    #[error("Aborted. Edited data resulted in invalid JSON.")]
    MalformedEdit(#[source] serde_json::Error),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Unable to save node {id}: {source}")]
    SaveFailed {
        id: String,
        #[source]
        source: Box<OsdfError>,
    },

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl OsdfError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            OsdfError::MalformedEdit(_) => EXIT_MALFORMED_EDIT,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, OsdfError>;
