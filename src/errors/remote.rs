// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Remote API errors
//!
//! Providers never panic or bail on an HTTP failure. They hand back a
//! `RemoteError` describing what went wrong and the command decides whether
//! the run can continue.

use miette::Diagnostic;
use thiserror::Error;

use super::RecoverySuggestion;

/// Result type for remote provider calls
pub type RemoteResult<T> = Result<T, RemoteError>;

/// A failed call against a git host or deployment target
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum RemoteError {
    #[error("Invalid {provider} token")]
    #[diagnostic(code(danku::remote::unauthorized))]
    Unauthorized { provider: &'static str },

    #[error("{provider} token has insufficient permissions")]
    #[diagnostic(code(danku::remote::forbidden))]
    Forbidden { provider: &'static str },

    #[error("{provider} resource not found: {resource}")]
    #[diagnostic(code(danku::remote::not_found))]
    NotFound {
        provider: &'static str,
        resource: String,
    },

    #[error("{provider} API error (HTTP {status}): {message}")]
    #[diagnostic(code(danku::remote::api))]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Could not reach {provider}: {message}")]
    #[diagnostic(code(danku::remote::network))]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("Unexpected response from {provider}: {message}")]
    #[diagnostic(code(danku::remote::decode))]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(code(danku::remote::rejected))]
    Rejected {
        provider: &'static str,
        message: String,
    },

    #[error("Failed to encrypt secret: {message}")]
    #[diagnostic(code(danku::remote::encryption))]
    Encryption { message: String },

    /// The cause is part of the message, so it is not also reported as a source
    #[error("{context}: {cause}")]
    #[diagnostic(code(danku::remote::failed))]
    Context {
        context: String,
        cause: Box<RemoteError>,
    },
}

impl RemoteError {
    /// Classify a non-success HTTP status
    pub fn from_status(provider: &'static str, status: u16, resource: &str, message: String) -> Self {
        match status {
            401 => Self::Unauthorized { provider },
            403 => Self::Forbidden { provider },
            404 => Self::NotFound {
                provider,
                resource: resource.to_string(),
            },
            _ => Self::Api {
                provider,
                status,
                message,
            },
        }
    }

    /// Wrap a transport-level failure
    pub fn network(provider: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Network {
            provider,
            message: error.to_string(),
        }
    }

    /// Wrap a body that could not be decoded
    pub fn decode(provider: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Decode {
            provider,
            message: error.to_string(),
        }
    }

    /// Prefix this error with what was being attempted
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            cause: Box::new(self),
        }
    }

    /// The innermost error, with every context layer removed
    pub fn root(&self) -> &RemoteError {
        match self {
            Self::Context { cause, .. } => cause.root(),
            other => other,
        }
    }

    /// Whether the remote reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound { .. })
    }

    /// Whether the failure is an authentication or authorization problem
    pub fn is_auth(&self) -> bool {
        matches!(
            self.root(),
            Self::Unauthorized { .. } | Self::Forbidden { .. }
        )
    }

    /// Suggestion printed next to the error by the CLI
    pub fn recovery(&self) -> Option<RecoverySuggestion> {
        match self.root() {
            Self::Unauthorized { provider } => Some(RecoverySuggestion::replace_token(provider)),
            Self::Forbidden { provider } => Some(RecoverySuggestion::grant_permissions(provider)),
            Self::Network { provider, .. } => Some(RecoverySuggestion::check_network(provider)),
            _ => None,
        }
    }
}

/// Map a `RemoteResult<bool>` existence probe so that 404 becomes `false`
pub fn exists_or_not_found(result: RemoteResult<()>) -> RemoteResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            RemoteError::from_status("GitHub", 401, "user", String::new()),
            RemoteError::Unauthorized { .. }
        ));
        assert!(matches!(
            RemoteError::from_status("GitHub", 403, "user", String::new()),
            RemoteError::Forbidden { .. }
        ));
        assert!(RemoteError::from_status("GitHub", 404, "repo", String::new()).is_not_found());
        assert!(matches!(
            RemoteError::from_status("GitHub", 422, "repo", "exists".into()),
            RemoteError::Api { status: 422, .. }
        ));
    }

    #[test]
    fn test_context_keeps_root_classification() {
        let err = RemoteError::Forbidden { provider: "GitHub" }
            .context("Failed to add/update secret");

        assert!(err.is_auth());
        assert!(matches!(err.root(), RemoteError::Forbidden { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to add/update secret: GitHub token has insufficient permissions"
        );
        // the cause is already in the message
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_not_found_is_clean_negative() {
        let missing = RemoteError::NotFound {
            provider: "GitHub",
            resource: "repos/acme/site".into(),
        };
        assert!(!exists_or_not_found(Err(missing)).unwrap());
        assert!(exists_or_not_found(Ok(())).unwrap());

        let denied = RemoteError::Unauthorized { provider: "GitHub" };
        assert!(exists_or_not_found(Err(denied)).is_err());
    }
}
