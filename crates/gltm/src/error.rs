use std::fmt;

use thiserror::Error;

use crate::model::{InvalidDate, OwnerKind};

/// Failures reported by a [`HostClient`](crate::host::HostClient) call.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to connect to host: {0}")]
    Network(String),

    #[error("Authentication rejected (HTTP 401): {0}")]
    Authentication(String),

    #[error("Permission denied (HTTP 403): {0}")]
    Permission(String),

    #[error("Not found (HTTP 404): {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HostError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// The remote operation a [`TokenError::Remote`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lookup,
    List,
    Create,
    Rotate,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Lookup => "Getting access token",
            Self::List => "Listing access tokens",
            Self::Create => "Creating access token",
            Self::Rotate => "Rotating access token",
            Self::Delete => "Deleting access token",
        };
        f.write_str(verb)
    }
}

/// Error taxonomy for a token management invocation.
///
/// Fatal variants abort the whole run. The rest only cancel the action that
/// produced them; see [`TokenError::is_fatal`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed! Check the GitLab URL and private token: {0}")]
    Authentication(String),

    #[error("Cannot resolve {kind} \"{selector}\": {source}")]
    OwnerResolution {
        kind: OwnerKind,
        selector: String,
        #[source]
        source: HostError,
    },

    #[error("Access token \"{reference}\" not found")]
    TokenNotFound { reference: String },

    #[error("Access token name \"{name}\" is ambiguous, matching ids: {ids:?}")]
    AmbiguousToken { name: String, ids: Vec<u64> },

    #[error("Access token with name \"{name}\" already exists")]
    AlreadyExists { name: String },

    #[error("{operation} failed: {source}")]
    Remote {
        operation: Operation,
        #[source]
        source: HostError,
    },

    #[error("Failed to write access token to {target}: {source}")]
    Output {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

impl TokenError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wrap a host failure for `operation`. A rejected credential is never
    /// scoped to one operation, so it is lifted to [`TokenError::Authentication`].
    pub fn remote(operation: Operation, source: HostError) -> Self {
        match source {
            HostError::Authentication(message) => Self::Authentication(message),
            source => Self::Remote { operation, source },
        }
    }

    pub fn output(target: impl Into<String>, source: std::io::Error) -> Self {
        Self::Output {
            target: target.into(),
            source,
        }
    }

    /// Whether this error must abort the invocation with a non-zero status.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::Authentication(_)
                | Self::OwnerResolution { .. }
                | Self::AlreadyExists { .. }
        )
    }
}

impl From<InvalidDate> for TokenError {
    fn from(err: InvalidDate) -> Self {
        Self::Configuration(err.to_string())
    }
}
