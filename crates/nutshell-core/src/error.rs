//! Error taxonomy shared by every nutshell crate.

use crate::types::EntityKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A rejected form submission. Carries the HTTP status to answer with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub status: u16,
}

impl ValidationError {
    /// A `400 Bad Request` validation failure.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 400,
        }
    }
}

/// Failures talking to the document store itself, as opposed to a missing key.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store transport error: {0}")]
    Transport(String),
    #[error("store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unknown index {0}")]
    UnknownIndex(String),
    #[error("malformed store response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No such {kind} '{id}'")]
    NotFound { kind: EntityKind, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Document '{id}' already exists")]
    KeyExists { id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }
}
