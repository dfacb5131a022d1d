//! Domain error types.
//!
//! These are the errors SDK consumers match on. The client crate produces
//! them from HTTP failures through per-call error policies; they carry the
//! identifiers needed to render a message and are never mutated afterwards.

use thiserror::Error;

use crate::entities::Provider;

/// A typed, context-carrying failure understood by SDK consumers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No organization exists with this slug.
    #[error("organization '{slug}' not found")]
    OrganizationNotFound {
        /// The organization slug that was looked up.
        slug: String,
    },

    /// No user exists with this identifier.
    #[error("user '{user_id}' not found")]
    UserNotFound {
        /// The user identifier that was looked up.
        user_id: String,
    },

    /// An organization with this slug already exists.
    #[error("organization '{slug}' already exists")]
    OrganizationAlreadyExists {
        /// The conflicting slug.
        slug: String,
    },

    /// A user with this identifier already exists.
    #[error("user '{user_id}' already exists")]
    UserAlreadyExists {
        /// The conflicting user identifier.
        user_id: String,
    },

    /// OAuth client credentials have not been configured for the provider.
    #[error("OAuth credentials for provider '{provider}' are not set")]
    ProviderCredentialsNotSet {
        /// The calendar provider missing credentials.
        provider: Provider,
    },

    /// The user has no OAuth connection to the provider.
    #[error("OAuth connection to '{provider}' not found for user '{user_id}'")]
    OAuthConnectionNotFound {
        /// The user identifier.
        user_id: String,
        /// The provider the connection was expected for.
        provider: Provider,
    },

    /// No event exists with this identifier.
    #[error("event '{id}' not found")]
    EventNotFound {
        /// The event identifier that was looked up.
        id: String,
    },

    /// A failure that has no dedicated variant.
    #[error("{message}")]
    Unclassified {
        /// The original message.
        message: String,
    },
}

impl DomainError {
    /// Creates an [`DomainError::OrganizationNotFound`].
    pub fn organization_not_found(slug: impl Into<String>) -> Self {
        Self::OrganizationNotFound { slug: slug.into() }
    }

    /// Creates a [`DomainError::UserNotFound`].
    pub fn user_not_found(user_id: impl Into<String>) -> Self {
        Self::UserNotFound {
            user_id: user_id.into(),
        }
    }

    /// Creates an [`DomainError::OrganizationAlreadyExists`].
    pub fn organization_already_exists(slug: impl Into<String>) -> Self {
        Self::OrganizationAlreadyExists { slug: slug.into() }
    }

    /// Creates a [`DomainError::UserAlreadyExists`].
    pub fn user_already_exists(user_id: impl Into<String>) -> Self {
        Self::UserAlreadyExists {
            user_id: user_id.into(),
        }
    }

    /// Creates a [`DomainError::ProviderCredentialsNotSet`].
    pub fn provider_credentials_not_set(provider: Provider) -> Self {
        Self::ProviderCredentialsNotSet { provider }
    }

    /// Creates an [`DomainError::OAuthConnectionNotFound`].
    pub fn oauth_connection_not_found(user_id: impl Into<String>, provider: Provider) -> Self {
        Self::OAuthConnectionNotFound {
            user_id: user_id.into(),
            provider,
        }
    }

    /// Creates an [`DomainError::EventNotFound`].
    pub fn event_not_found(id: impl Into<String>) -> Self {
        Self::EventNotFound { id: id.into() }
    }

    /// Creates an [`DomainError::Unclassified`].
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
        }
    }

    /// Returns a stable machine-readable name for this error.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrganizationNotFound { .. } => "organization_not_found",
            Self::UserNotFound { .. } => "user_not_found",
            Self::OrganizationAlreadyExists { .. } => "organization_already_exists",
            Self::UserAlreadyExists { .. } => "user_already_exists",
            Self::ProviderCredentialsNotSet { .. } => "provider_credentials_not_set",
            Self::OAuthConnectionNotFound { .. } => "oauth_connection_not_found",
            Self::EventNotFound { .. } => "event_not_found",
            Self::Unclassified { .. } => "unclassified",
        }
    }

    /// Returns true if this error means the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::OrganizationNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::OAuthConnectionNotFound { .. }
                | Self::EventNotFound { .. }
        )
    }
}
