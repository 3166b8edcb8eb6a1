use thiserror::Error;

/// Error taxonomy for the fieldops client.
///
/// Validation and date errors are raised before any network call; remote
/// variants carry the raw status and body so the UI layer can map them to
/// user-facing copy.
#[derive(Debug, Error)]
pub enum FieldOpsError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unrecognized date: {0:?}")]
    InvalidDate(String),

    #[error("Authentication error: {0}")]
    Auth(anyhow::Error),

    #[error("Remote store rejected request ({status}): {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Upload failed ({status}): {body}")]
    UploadFailed { status: u16, body: String },

    #[error("Image asset has no readable source")]
    InvalidAsset,

    #[error("No collections selected for deposit")]
    EmptySelection,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response from remote store: {0}")]
    BadResponse(#[from] serde_json::Error),
}

impl FieldOpsError {
    /// HTTP status of the remote failure, if this error came off the wire.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status, .. } | Self::UploadFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FieldOpsError>;
