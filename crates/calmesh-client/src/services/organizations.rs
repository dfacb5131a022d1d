//! Organization endpoints.

use calmesh_core::{DomainError, Organization};
use serde_json::json;

use crate::client::CalmeshClient;
use crate::error::ClientResult;
use crate::policy::{ErrorPolicy, ErrorRule};
use crate::request::{Endpoint, RequestOptions, segment};

/// Operations on `/v1/organizations`.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationsService<'a> {
    client: &'a CalmeshClient,
}

impl<'a> OrganizationsService<'a> {
    pub(crate) fn new(client: &'a CalmeshClient) -> Self {
        Self { client }
    }

    /// Creates an organization.
    ///
    /// Fails with [`DomainError::OrganizationAlreadyExists`] if the slug is taken.
    pub async fn create(&self, slug: &str, name: &str) -> ClientResult<Organization> {
        let options = RequestOptions::new().body(json!({ "slug": slug, "name": name }));
        let policy = ErrorPolicy::new()
            .rule(ErrorRule::status(409).throws(DomainError::organization_already_exists(slug)));

        self.client
            .request_json(&Endpoint::post("/organizations"), &options, &policy)
            .await
    }

    /// Looks up an organization; `None` if it does not exist.
    pub async fn get(&self, slug: &str) -> ClientResult<Option<Organization>> {
        let policy = ErrorPolicy::new().rule(ErrorRule::status(404).returns(None));

        self.client
            .request_json(
                &Endpoint::get(format!("/organizations/{}", segment(slug))),
                &RequestOptions::new(),
                &policy,
            )
            .await
    }

    /// Lists all organizations visible to the token.
    pub async fn list(&self) -> ClientResult<Vec<Organization>> {
        self.client
            .request_json(
                &Endpoint::get("/organizations"),
                &RequestOptions::new(),
                &ErrorPolicy::none(),
            )
            .await
    }

    /// Renames an organization.
    pub async fn update(&self, slug: &str, name: &str) -> ClientResult<Organization> {
        let options = RequestOptions::new().body(json!({ "name": name }));

        self.client
            .request_json(
                &Endpoint::put(format!("/organizations/{}", segment(slug))),
                &options,
                &not_found(slug),
            )
            .await
    }

    /// Deletes an organization.
    pub async fn delete(&self, slug: &str) -> ClientResult<()> {
        self.client
            .request_void(
                &Endpoint::delete(format!("/organizations/{}", segment(slug))),
                &RequestOptions::new(),
                &not_found(slug),
            )
            .await
    }
}

fn not_found<T>(slug: &str) -> ErrorPolicy<T> {
    ErrorPolicy::new().rule(ErrorRule::status(404).throws(DomainError::organization_not_found(slug)))
}
