//! Provider credentials and per-user OAuth connections.
//!
//! The token exchange itself happens server-side; these calls only forward
//! client credentials and authorization codes.

use calmesh_core::{AuthorizationUrl, DomainError, OAuthConnection, Provider};
use serde_json::json;

use crate::client::CalmeshClient;
use crate::error::ClientResult;
use crate::policy::{ErrorPolicy, ErrorRule};
use crate::query::QueryParams;
use crate::request::{Endpoint, RequestOptions, segment};

/// Server message fragment for a user without a link to the provider.
const CONNECTION_NOT_FOUND: &str = "OAuth connection not found";

/// Server message fragment for a provider without configured client credentials.
const CREDENTIALS_NOT_SET: &str = "credentials";

/// OAuth operations.
#[derive(Debug, Clone, Copy)]
pub struct OAuthService<'a> {
    client: &'a CalmeshClient,
}

impl<'a> OAuthService<'a> {
    pub(crate) fn new(client: &'a CalmeshClient) -> Self {
        Self { client }
    }

    /// Stores the OAuth client credentials used for `provider`.
    pub async fn set_credentials(
        &self,
        provider: Provider,
        client_id: &str,
        client_secret: &str,
    ) -> ClientResult<()> {
        let options = RequestOptions::new().body(json!({
            "clientId": client_id,
            "clientSecret": client_secret,
        }));

        self.client
            .request_void(&credentials_endpoint(provider, false), &options, &ErrorPolicy::none())
            .await
    }

    /// Removes the OAuth client credentials for `provider`.
    pub async fn delete_credentials(&self, provider: Provider) -> ClientResult<()> {
        let policy = ErrorPolicy::new().rule(
            ErrorRule::status(404).throws(DomainError::provider_credentials_not_set(provider)),
        );

        self.client
            .request_void(&credentials_endpoint(provider, true), &RequestOptions::new(), &policy)
            .await
    }

    /// Returns the consent URL a user must visit to link `provider`.
    pub async fn authorization_url(
        &self,
        user_id: &str,
        provider: Provider,
        redirect_uri: &str,
    ) -> ClientResult<AuthorizationUrl> {
        let options = RequestOptions::new().query(
            QueryParams::new()
                .param("userId", user_id)
                .param("redirectUri", redirect_uri),
        );

        self.client
            .request_json(
                &Endpoint::get(format!("/oauth/{}/authorize", provider)),
                &options,
                &credentials_or_user(user_id, provider),
            )
            .await
    }

    /// Completes a link by forwarding the authorization code from the provider redirect.
    pub async fn connect(
        &self,
        user_id: &str,
        provider: Provider,
        code: &str,
        redirect_uri: &str,
    ) -> ClientResult<OAuthConnection> {
        let options = RequestOptions::new().body(json!({
            "code": code,
            "redirectUri": redirect_uri,
        }));

        self.client
            .request_json(
                &Endpoint::post(connection_path(user_id, provider)),
                &options,
                &credentials_or_user(user_id, provider),
            )
            .await
    }

    /// Lists a user's connections.
    pub async fn connections(&self, user_id: &str) -> ClientResult<Vec<OAuthConnection>> {
        let policy =
            ErrorPolicy::new().rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)));

        self.client
            .request_json(
                &Endpoint::get(format!("/users/{}/connections", segment(user_id))),
                &RequestOptions::new(),
                &policy,
            )
            .await
    }

    /// Returns a user's connection to `provider`.
    ///
    /// Fails with [`DomainError::OAuthConnectionNotFound`] if the user exists
    /// but never linked the provider, and [`DomainError::UserNotFound`] if
    /// the user does not exist.
    pub async fn connection(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> ClientResult<OAuthConnection> {
        self.client
            .request_json(
                &Endpoint::get(connection_path(user_id, provider)),
                &RequestOptions::new(),
                &connection_or_user(user_id, provider),
            )
            .await
    }

    /// Removes a user's connection to `provider`.
    pub async fn disconnect(&self, user_id: &str, provider: Provider) -> ClientResult<()> {
        self.client
            .request_void(
                &Endpoint::delete(connection_path(user_id, provider)),
                &RequestOptions::new(),
                &connection_or_user(user_id, provider),
            )
            .await
    }
}

fn credentials_endpoint(provider: Provider, delete: bool) -> Endpoint {
    let path = format!("/oauth/{}/credentials", provider);
    if delete {
        Endpoint::delete(path)
    } else {
        Endpoint::put(path)
    }
}

fn connection_path(user_id: &str, provider: Provider) -> String {
    format!("/users/{}/connections/{}", segment(user_id), provider)
}

fn credentials_or_user<T>(user_id: &str, provider: Provider) -> ErrorPolicy<T> {
    ErrorPolicy::new()
        .rule(
            ErrorRule::status(404)
                .containing(CREDENTIALS_NOT_SET)
                .throws(DomainError::provider_credentials_not_set(provider)),
        )
        .rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)))
}

fn connection_or_user<T>(user_id: &str, provider: Provider) -> ErrorPolicy<T> {
    ErrorPolicy::new()
        .rule(
            ErrorRule::status(404)
                .containing(CONNECTION_NOT_FOUND)
                .throws(DomainError::oauth_connection_not_found(user_id, provider)),
        )
        .rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)))
}
