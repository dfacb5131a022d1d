//! Client configuration.
//!
//! The base URL and bearer token may each be given as a literal value, a
//! closure evaluated once at client construction, or read from the
//! environment:
//!
//! - `CALMESH_API_TOKEN` - bearer token
//! - `CALMESH_BASE_URL` - API origin, defaults to [`ClientConfig::DEFAULT_BASE_URL`]

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use url::Url;

/// Environment variable holding the bearer token.
pub const TOKEN_ENV_VAR: &str = "CALMESH_API_TOKEN";

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV_VAR: &str = "CALMESH_BASE_URL";

/// Prefixes of tokens issued by the API.
pub const TOKEN_PREFIXES: [&str; 2] = ["cm_live_", "cm_test_"];

/// Where a configuration string comes from.
#[derive(Clone)]
pub enum ValueSource {
    /// A literal value.
    Value(String),
    /// A closure producing the value.
    Provider(Arc<dyn Fn() -> String + Send + Sync>),
    /// An environment variable; unset reads as missing.
    Env(&'static str),
}

impl ValueSource {
    /// Creates a source from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Provider(Arc::new(f))
    }

    /// Resolves the value. Returns `None` only for an unset environment variable.
    pub fn resolve(&self) -> Option<String> {
        match self {
            Self::Value(v) => Some(v.clone()),
            Self::Provider(f) => Some(f()),
            Self::Env(var) => std::env::var(var).ok(),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Literal values may be secrets.
        match self {
            Self::Value(_) => f.write_str("Value(..)"),
            Self::Provider(_) => f.write_str("Provider(..)"),
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
        }
    }
}

impl From<String> for ValueSource {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for ValueSource {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

/// Result of the token sanity check performed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// Token has a known prefix.
    Ok,
    /// Token is empty or missing.
    Empty,
    /// Token does not start with any known prefix.
    UnknownPrefix,
}

impl TokenCheck {
    /// Classifies a token.
    pub fn of(token: &str) -> Self {
        if token.trim().is_empty() {
            Self::Empty
        } else if TOKEN_PREFIXES.iter().any(|p| token.starts_with(p)) {
            Self::Ok
        } else {
            Self::UnknownPrefix
        }
    }
}

/// Configuration for [`CalmeshClient`](crate::CalmeshClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin, without the `/v1` prefix.
    pub base_url: ValueSource,

    /// Bearer token sent with every request.
    pub token: ValueSource,

    /// Per-request timeout.
    ///
    /// `None` (the default) means the SDK imposes no deadline; callers may
    /// wrap calls in their own.
    pub timeout: Option<Duration>,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl ClientConfig {
    /// API origin used when neither an explicit value nor `CALMESH_BASE_URL` is set.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.calmesh.dev";

    /// Creates a configuration with the given token and the base URL taken
    /// from `CALMESH_BASE_URL` or the default.
    pub fn new(token: impl Into<ValueSource>) -> Self {
        Self {
            base_url: ValueSource::Env(BASE_URL_ENV_VAR),
            token: token.into(),
            timeout: None,
            user_agent: format!("calmesh-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Creates a configuration reading both token and base URL from the environment.
    pub fn from_env() -> Self {
        Self::new(ValueSource::Env(TOKEN_ENV_VAR))
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<ValueSource>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets a token-producing closure.
    pub fn with_token_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.token = ValueSource::from_fn(f);
        self
    }

    /// Sets a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolves and parses the base URL, falling back to the default.
    pub fn resolve_base_url(&self) -> Result<Url, String> {
        let raw = self
            .base_url
            .resolve()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let url = Url::parse(raw.trim()).map_err(|e| format!("invalid base URL '{}': {}", raw, e))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(format!("base URL must be an http(s) URL, got '{}'", raw));
        }
        // Endpoint paths are appended to the base, so a query or fragment would swallow them.
        if url.query().is_some() || url.fragment().is_some() {
            return Err(format!(
                "base URL must not have a query string or fragment, got '{}'",
                raw
            ));
        }
        Ok(url)
    }

    /// Resolves the token. An unusable token is logged, not rejected: the
    /// server answers 401/403 for it.
    pub fn resolve_token(&self) -> String {
        let token = self.token.resolve().unwrap_or_default();
        match TokenCheck::of(&token) {
            TokenCheck::Ok => {}
            TokenCheck::Empty => warn!(
                "no API token configured; set {} or pass a token explicitly",
                TOKEN_ENV_VAR
            ),
            TokenCheck::UnknownPrefix => warn!(
                "API token does not start with a known prefix ({}); requests will likely be rejected",
                TOKEN_PREFIXES.join(", ")
            ),
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_check() {
        assert_eq!(TokenCheck::of("cm_live_abc"), TokenCheck::Ok);
        assert_eq!(TokenCheck::of("cm_test_abc"), TokenCheck::Ok);
        assert_eq!(TokenCheck::of(""), TokenCheck::Empty);
        assert_eq!(TokenCheck::of("   "), TokenCheck::Empty);
        assert_eq!(TokenCheck::of("sk_abc"), TokenCheck::UnknownPrefix);
    }

    #[test]
    fn malformed_token_still_resolves() {
        let config = ClientConfig::new("not-a-token");
        assert_eq!(config.resolve_token(), "not-a-token");

        let empty = ClientConfig::new("");
        assert_eq!(empty.resolve_token(), "");
    }

    #[test]
    fn token_fn_is_evaluated() {
        let config = ClientConfig::new("ignored").with_token_fn(|| "cm_test_from_fn".to_string());
        assert_eq!(config.resolve_token(), "cm_test_from_fn");
    }

    #[test]
    fn explicit_base_url() {
        let config = ClientConfig::new("cm_test_x").with_base_url("http://localhost:8080/");
        let url = config.resolve_base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn base_url_from_closure() {
        let config = ClientConfig::new("cm_test_x")
            .with_base_url(ValueSource::from_fn(|| "https://eu.api.calmesh.dev".to_string()));
        assert_eq!(
            config.resolve_base_url().unwrap().host_str(),
            Some("eu.api.calmesh.dev")
        );
    }

    #[test]
    fn empty_base_url_falls_back_to_default() {
        let config = ClientConfig::new("cm_test_x").with_base_url("");
        assert_eq!(
            config.resolve_base_url().unwrap().as_str(),
            "https://api.calmesh.dev/"
        );
    }

    #[test]
    fn unset_env_base_url_falls_back_to_default() {
        let config = ClientConfig::new("cm_test_x")
            .with_base_url(ValueSource::Env("CALMESH_TEST_SURELY_UNSET_BASE_URL"));
        assert_eq!(
            config.resolve_base_url().unwrap().as_str(),
            "https://api.calmesh.dev/"
        );
    }

    #[test]
    fn invalid_base_url() {
        assert!(
            ClientConfig::new("t")
                .with_base_url("not a url")
                .resolve_base_url()
                .is_err()
        );
        assert!(
            ClientConfig::new("t")
                .with_base_url("ftp://files.example.com")
                .resolve_base_url()
                .is_err()
        );
    }

    #[test]
    fn base_url_with_query_or_fragment_is_rejected() {
        for base in [
            "https://api.example.com/?tenant=eu",
            "https://api.example.com/#v2",
            "https://api.example.com/calmesh?",
        ] {
            let err = ClientConfig::new("cm_test_x")
                .with_base_url(base)
                .resolve_base_url()
                .unwrap_err();
            assert!(err.contains("query string or fragment"), "{base}: {err}");
        }
    }

    #[test]
    fn unusable_tokens_do_not_prevent_construction() {
        for token in ["", "not-a-token"] {
            let config = ClientConfig::new(token).with_base_url("https://api.example.com");
            assert!(crate::CalmeshClient::new(config).is_ok(), "token {token:?}");
        }
    }

    #[test]
    fn debug_redacts_literal_token() {
        let config = ClientConfig::new("cm_live_secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("cm_live_secret"));
        assert!(debug.contains("CALMESH_BASE_URL"));
    }
}
