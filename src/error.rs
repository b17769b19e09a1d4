// Error type shared by the credential store and the judge API client.
// The command layer wraps these with `anyhow` context before they reach the
// user, so the messages here stay short and factual.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`], used by callers that only care
/// about which class of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    NotFound,
    Parse,
    Io,
    Input,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to the judge service failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("login failed with status {status}: {message}")]
    Auth { status: u16, message: String },

    #[error("stored credentials are incomplete (token or token id is empty)")]
    InvalidCredentials,

    #[error("no credentials file found (searched: {})", display_paths(.searched))]
    CredentialsNotFound { searched: Vec<PathBuf> },

    #[error("failed to {operation}: judge service answered with status {status}")]
    Status {
        operation: &'static str,
        status: u16,
    },

    #[error("credentials file {} is malformed: {source}", .path.display())]
    CorruptCredentials {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    #[error("{0} must not be empty")]
    InvalidInput(&'static str),

    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) => ErrorKind::Network,
            Error::Auth { .. } | Error::InvalidCredentials => ErrorKind::Auth,
            Error::CredentialsNotFound { .. } | Error::Status { .. } => ErrorKind::NotFound,
            Error::CorruptCredentials { .. } | Error::Decode { .. } => ErrorKind::Parse,
            Error::Io { .. } | Error::NoConfigDir => ErrorKind::Io,
            Error::InvalidInput(_) | Error::InvalidBaseUrl { .. } => ErrorKind::Input,
        }
    }

    /// HTTP status carried by the error, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Status { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".into();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
