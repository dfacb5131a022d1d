//! User endpoints.

use calmesh_core::{DomainError, NewUser, User};

use crate::client::CalmeshClient;
use crate::error::ClientResult;
use crate::policy::{ErrorPolicy, ErrorRule};
use crate::query::QueryParams;
use crate::request::{Endpoint, RequestOptions, segment};

/// Operations on `/v1/users`.
#[derive(Debug, Clone, Copy)]
pub struct UsersService<'a> {
    client: &'a CalmeshClient,
}

impl<'a> UsersService<'a> {
    pub(crate) fn new(client: &'a CalmeshClient) -> Self {
        Self { client }
    }

    /// Creates a user.
    ///
    /// Fails with [`DomainError::UserAlreadyExists`] on an identifier clash
    /// and [`DomainError::OrganizationNotFound`] if the named organization
    /// does not exist.
    pub async fn create(&self, user: &NewUser) -> ClientResult<User> {
        let options = RequestOptions::new().json(user)?;
        let mut policy =
            ErrorPolicy::new().rule(ErrorRule::status(409).throws(DomainError::user_already_exists(&user.id)));
        if let Some(ref organization) = user.organization {
            policy = policy.rule(
                ErrorRule::status(404)
                    .containing("Organization")
                    .throws(DomainError::organization_not_found(organization)),
            );
        }

        self.client
            .request_json(&Endpoint::post("/users"), &options, &policy)
            .await
    }

    /// Looks up a user; `None` if it does not exist.
    pub async fn get(&self, user_id: &str) -> ClientResult<Option<User>> {
        let policy = ErrorPolicy::new().rule(ErrorRule::status(404).returns(None));

        self.client
            .request_json(
                &Endpoint::get(format!("/users/{}", segment(user_id))),
                &RequestOptions::new(),
                &policy,
            )
            .await
    }

    /// Lists users, optionally restricted to one organization.
    pub async fn list(&self, organization: Option<&str>) -> ClientResult<Vec<User>> {
        let options =
            RequestOptions::new().query(QueryParams::new().param("organization", organization));
        let mut policy = ErrorPolicy::new();
        if let Some(slug) = organization {
            policy = policy
                .rule(ErrorRule::status(404).throws(DomainError::organization_not_found(slug)));
        }

        self.client
            .request_json(&Endpoint::get("/users"), &options, &policy)
            .await
    }

    /// Deletes a user and all of their OAuth connections.
    pub async fn delete(&self, user_id: &str) -> ClientResult<()> {
        let policy =
            ErrorPolicy::new().rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)));

        self.client
            .request_void(
                &Endpoint::delete(format!("/users/{}", segment(user_id))),
                &RequestOptions::new(),
                &policy,
            )
            .await
    }
}
