//! Calendars, events and free/busy, aggregated across a user's linked providers.

use calmesh_core::{Calendar, CalendarEvent, DomainError, FreeBusy, NewEvent, Provider};
use chrono::{DateTime, Utc};

use crate::client::CalmeshClient;
use crate::error::ClientResult;
use crate::policy::{ErrorPolicy, ErrorRule};
use crate::query::QueryParams;
use crate::request::{Endpoint, RequestOptions, segment};

const EVENT_NOT_FOUND: &str = "Event not found";

/// Filter for [`CalendarService::events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub min_date: DateTime<Utc>,
    pub max_date: DateTime<Utc>,
    /// Providers to read from; empty means every linked provider.
    pub providers: Vec<Provider>,
    /// IANA zone the server should expand all-day events in.
    pub time_zone: Option<String>,
}

impl EventQuery {
    pub fn new(min_date: DateTime<Utc>, max_date: DateTime<Utc>) -> Self {
        Self {
            min_date,
            max_date,
            providers: Vec::new(),
            time_zone: None,
        }
    }

    /// Builder method to restrict the query to a provider.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Builder method to set the time zone.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .param("minDate", self.min_date)
            .param("maxDate", self.max_date)
            .list("provider", &self.providers)
            .param("timeZone", self.time_zone.as_deref())
    }
}

/// Calendar operations for one user at a time.
#[derive(Debug, Clone, Copy)]
pub struct CalendarService<'a> {
    client: &'a CalmeshClient,
}

impl<'a> CalendarService<'a> {
    pub(crate) fn new(client: &'a CalmeshClient) -> Self {
        Self { client }
    }

    /// Lists the user's calendars, optionally restricted to some providers.
    pub async fn calendars(
        &self,
        user_id: &str,
        providers: &[Provider],
    ) -> ClientResult<Vec<Calendar>> {
        let options = RequestOptions::new().query(QueryParams::new().list("provider", providers));

        self.client
            .request_json(
                &Endpoint::get(user_path(user_id, "calendars")),
                &options,
                &user_not_found(user_id),
            )
            .await
    }

    /// Lists events in a date range.
    pub async fn events(
        &self,
        user_id: &str,
        query: &EventQuery,
    ) -> ClientResult<Vec<CalendarEvent>> {
        let options = RequestOptions::new().query(query.to_params());

        self.client
            .request_json(
                &Endpoint::get(user_path(user_id, "events")),
                &options,
                &user_not_found(user_id),
            )
            .await
    }

    /// Returns one event.
    pub async fn event(&self, user_id: &str, event_id: &str) -> ClientResult<CalendarEvent> {
        self.client
            .request_json(
                &Endpoint::get(event_path(user_id, event_id)),
                &RequestOptions::new(),
                &event_or_user(user_id, event_id),
            )
            .await
    }

    /// Creates an event in one of the user's calendars.
    pub async fn create_event(
        &self,
        user_id: &str,
        event: &NewEvent,
    ) -> ClientResult<CalendarEvent> {
        let options = RequestOptions::new().json(event)?;

        self.client
            .request_json(
                &Endpoint::post(user_path(user_id, "events")),
                &options,
                &user_not_found(user_id),
            )
            .await
    }

    /// Replaces an existing event.
    pub async fn update_event(
        &self,
        user_id: &str,
        event_id: &str,
        event: &NewEvent,
    ) -> ClientResult<CalendarEvent> {
        let options = RequestOptions::new().json(event)?;

        self.client
            .request_json(
                &Endpoint::put(event_path(user_id, event_id)),
                &options,
                &event_or_user(user_id, event_id),
            )
            .await
    }

    /// Deletes an event.
    pub async fn delete_event(&self, user_id: &str, event_id: &str) -> ClientResult<()> {
        self.client
            .request_void(
                &Endpoint::delete(event_path(user_id, event_id)),
                &RequestOptions::new(),
                &event_or_user(user_id, event_id),
            )
            .await
    }

    /// Returns the busy intervals between `min_date` and `max_date`.
    pub async fn free_busy(
        &self,
        user_id: &str,
        min_date: DateTime<Utc>,
        max_date: DateTime<Utc>,
        providers: &[Provider],
    ) -> ClientResult<FreeBusy> {
        let options = RequestOptions::new().query(
            QueryParams::new()
                .param("minDate", min_date)
                .param("maxDate", max_date)
                .list("provider", providers),
        );

        self.client
            .request_json(
                &Endpoint::get(user_path(user_id, "free-busy")),
                &options,
                &user_not_found(user_id),
            )
            .await
    }
}

fn user_path(user_id: &str, resource: &str) -> String {
    format!("/users/{}/{}", segment(user_id), resource)
}

fn event_path(user_id: &str, event_id: &str) -> String {
    format!("/users/{}/events/{}", segment(user_id), segment(event_id))
}

fn user_not_found<T>(user_id: &str) -> ErrorPolicy<T> {
    ErrorPolicy::new().rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)))
}

fn event_or_user<T>(user_id: &str, event_id: &str) -> ErrorPolicy<T> {
    ErrorPolicy::new()
        .rule(
            ErrorRule::status(404)
                .containing(EVENT_NOT_FOUND)
                .throws(DomainError::event_not_found(event_id)),
        )
        .rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)))
}
