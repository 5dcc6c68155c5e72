use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

use crate::maven::version::VersionMode;

/// Everything that aborts a publish. There is no partial success: the first error stops the
///  pipeline, and uploads that already happened stay in the remote repository.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid format for {mode} version: {version:?}")]
    InvalidVersion {
        version: String,
        mode: VersionMode,
    },

    #[error("remote index {path} exists but could not be parsed")]
    IndexCorrupt {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to upload {path}: {cause}")]
    UploadFailed {
        path: String,
        cause: UploadFailure,
    },

    #[error("invalid descriptor {}: {reason}", .path.display())]
    InvalidDescriptor {
        path: PathBuf,
        reason: String,
    },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub enum UploadFailure {
    /// the server answered, but not with a 2xx status
    Status(u16),
    /// no response at all
    Transport(anyhow::Error),
}
impl Display for UploadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadFailure::Status(status) => write!(f, "response from server was {}", status),
            UploadFailure::Transport(e) => write!(f, "{:#}", e),
        }
    }
}

/// Returned by signers that can not sign. Never fatal.
#[derive(Debug, Error)]
#[error("artifact signing is not yet supported")]
pub struct SigningUnsupported;
