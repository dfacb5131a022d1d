//! Error types for client operations.
//!
//! Every call resolves to a typed value or one of the [`ClientError`]
//! variants below. HTTP failures first surface as a [`TransportFault`];
//! the per-call error policy may turn them into a [`DomainError`] or a
//! substitute value. Validation failures are never remapped.

use std::fmt;

use calmesh_core::{DomainError, ValidationError};
use thiserror::Error;

/// A non-2xx HTTP response.
///
/// Carries no body: the status code and status text are the only inputs
/// to error classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFault {
    request_url: String,
    status_code: u16,
    status_text: String,
}

impl TransportFault {
    /// Creates a fault for a request to `request_url`.
    pub fn new(
        request_url: impl Into<String>,
        status_code: u16,
        status_text: impl Into<String>,
    ) -> Self {
        Self {
            request_url: request_url.into(),
            status_code,
            status_text: status_text.into(),
        }
    }

    /// Returns the resolved URL of the failed request.
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns the status text, or the server message standing in for it.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request to {} failed with status {}",
            self.request_url, self.status_code
        )?;
        if !self.status_text.is_empty() {
            write!(f, ": {}", self.status_text)?;
        }
        Ok(())
    }
}

impl std::error::Error for TransportFault {}

/// An error returned by a client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a status outside 200..=299 and no policy rule matched.
    #[error(transparent)]
    Transport(#[from] TransportFault),

    /// A policy rule classified the failure.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The response body did not match the expected shape.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request never produced an HTTP response (DNS, connect, TLS, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The client was configured with unusable values.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the transport fault, if this is one.
    pub fn as_transport(&self) -> Option<&TransportFault> {
        match self {
            Self::Transport(fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns the domain error, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code for transport faults.
    pub fn status_code(&self) -> Option<u16> {
        self.as_transport().map(TransportFault::status_code)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Network(format!("connection failed: {}", err))
        } else if err.is_timeout() {
            Self::Network("request timeout".to_string())
        } else if err.is_builder() {
            Self::Config(format!("invalid request: {}", err))
        } else {
            Self::Network(format!("request failed: {}", err))
        }
    }
}

/// A specialized Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_display() {
        let fault = TransportFault::new("https://api.test/v1/users/u1", 404, "user missing");
        insta::assert_snapshot!(
            fault.to_string(),
            @"request to https://api.test/v1/users/u1 failed with status 404: user missing"
        );

        let bare = TransportFault::new("https://api.test/v1/x", 502, "");
        assert_eq!(bare.to_string(), "request to https://api.test/v1/x failed with status 502");
    }

    #[test]
    fn domain_errors_render_transparently() {
        let err = ClientError::from(DomainError::organization_not_found("acme"));
        assert_eq!(err.to_string(), "organization 'acme' not found");
        assert!(err.as_domain().is_some());
        assert!(err.status_code().is_none());
    }

    #[test]
    fn transport_accessors() {
        let err = ClientError::from(TransportFault::new("u", 409, "Conflict"));
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(err.as_transport().unwrap().status_text(), "Conflict");
    }
}
