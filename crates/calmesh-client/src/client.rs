//! The request orchestrator.
//!
//! [`CalmeshClient::request`] is the single path every resource operation
//! takes: send the request, resolve failures through the call's
//! [`ErrorPolicy`], and validate successful bodies against the call's
//! [`Schema`].

use calmesh_core::{Json, NoBody, Schema};
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug_span};

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::policy::ErrorPolicy;
use crate::request::{Endpoint, RequestOptions};
use crate::services::{
    CalendarService, OAuthService, OrganizationsService, SchedulingService, UsersService,
};
use crate::transport::Transport;

/// Client for the calmesh calendar API.
///
/// Cheap to clone and safe to share between tasks: the only shared state is
/// the base URL and token captured at construction and the HTTP connection
/// pool.
#[derive(Debug, Clone)]
pub struct CalmeshClient {
    transport: Transport,
}

impl CalmeshClient {
    /// Creates a client.
    ///
    /// A missing or oddly-shaped token is logged as a warning and does not
    /// fail construction.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = Transport::new(&config)?;
        Ok(Self { transport })
    }

    /// Creates a client configured from `CALMESH_API_TOKEN` and `CALMESH_BASE_URL`.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Performs one API call.
    ///
    /// On a non-2xx response the policy decides between a domain error, a
    /// substitute value, or the raw fault. Validation failures bypass the
    /// policy.
    pub async fn request<S: Schema>(
        &self,
        endpoint: &Endpoint,
        options: &RequestOptions,
        policy: &ErrorPolicy<S::Output>,
        schema: &S,
    ) -> ClientResult<S::Output> {
        let span = debug_span!("calmesh_request", method = %endpoint.method(), path = endpoint.path());

        async {
            let response = match self.transport.send(endpoint, options, S::READS_BODY).await {
                Ok(response) => response,
                Err(err) => return policy.apply(err),
            };

            let body = response.body.unwrap_or_default();
            Ok(schema.validate(body)?)
        }
        .instrument(span)
        .await
    }

    /// Performs a call whose response body is validated as `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        options: &RequestOptions,
        policy: &ErrorPolicy<T>,
    ) -> ClientResult<T> {
        self.request(endpoint, options, policy, &Json::<T>::new())
            .await
    }

    /// Performs a call that returns no body.
    pub async fn request_void(
        &self,
        endpoint: &Endpoint,
        options: &RequestOptions,
        policy: &ErrorPolicy<()>,
    ) -> ClientResult<()> {
        self.request(endpoint, options, policy, &NoBody).await
    }

    /// Organization management.
    pub fn organizations(&self) -> OrganizationsService<'_> {
        OrganizationsService::new(self)
    }

    /// User management.
    pub fn users(&self) -> UsersService<'_> {
        UsersService::new(self)
    }

    /// Provider credentials and user OAuth connections.
    pub fn oauth(&self) -> OAuthService<'_> {
        OAuthService::new(self)
    }

    /// Calendars, events and free/busy.
    pub fn calendar(&self) -> CalendarService<'_> {
        CalendarService::new(self)
    }

    /// Availability, slot search and bookings.
    pub fn scheduling(&self) -> SchedulingService<'_> {
        SchedulingService::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::policy::ErrorRule;
    use calmesh_core::{DomainError, Organization};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CalmeshClient {
        CalmeshClient::new(ClientConfig::new("cm_test_token").with_base_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn success_is_validated_into_typed_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/organizations/acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "slug": "acme",
                "name": "Acme",
                "createdAt": "2024-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let org: Organization = client_for(&server)
            .request_json(
                &Endpoint::get("/organizations/acme"),
                &RequestOptions::new(),
                &ErrorPolicy::none(),
            )
            .await
            .unwrap();

        assert_eq!(org.name, "Acme");
        assert_eq!(org.created_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn policy_can_substitute_a_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/organizations/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let policy = ErrorPolicy::new().rule(ErrorRule::status(404).returns(None));
        let org: Option<Organization> = client_for(&server)
            .request_json(&Endpoint::get("/organizations/ghost"), &RequestOptions::new(), &policy)
            .await
            .unwrap();
        assert!(org.is_none());
    }

    #[tokio::test]
    async fn policy_can_throw_domain_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/organizations/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let policy = ErrorPolicy::new().rule(
            ErrorRule::status(404).throws(DomainError::organization_not_found("ghost")),
        );
        let err = client_for(&server)
            .request_void(&Endpoint::delete("/organizations/ghost"), &RequestOptions::new(), &policy)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "organization 'ghost' not found");
    }

    #[tokio::test]
    async fn validation_failure_is_not_remapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/organizations/acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"slug": "acme"})))
            .mount(&server)
            .await;

        let policy = ErrorPolicy::new()
            .rule(ErrorRule::status(200).returns(None))
            .rule(ErrorRule::status(404).returns(None));
        let err = client_for(&server)
            .request_json::<Option<Organization>>(
                &Endpoint::get("/organizations/acme"),
                &RequestOptions::new(),
                &policy,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn void_request_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/oauth/google/credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        client_for(&server)
            .request_void(
                &Endpoint::put("/oauth/google/credentials"),
                &RequestOptions::new().body(json!({"clientId": "id"})),
                &ErrorPolicy::none(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(8)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client
                    .request_json::<Vec<Organization>>(
                        &Endpoint::get("/organizations"),
                        &RequestOptions::new(),
                        &ErrorPolicy::none(),
                    )
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_empty());
        }
    }
}
