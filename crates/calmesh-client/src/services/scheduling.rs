//! Working hours, slot search and bookings.

use calmesh_core::{
    Availability, Booking, DomainError, NewBooking, SchedulingSlot, format_local_date,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::client::CalmeshClient;
use crate::error::ClientResult;
use crate::policy::{ErrorPolicy, ErrorRule};
use crate::query::QueryParams;
use crate::request::{Endpoint, RequestOptions, segment};

/// Search for common free time across users.
///
/// `from` and `to` are sent as calendar dates in `time_zone`, so an instant
/// late on the 1st in UTC may become the 2nd in an eastern zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub user_ids: Vec<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub duration_minutes: u32,
    pub time_zone: Tz,
}

impl SlotQuery {
    pub fn new(
        user_ids: impl IntoIterator<Item = impl Into<String>>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        duration_minutes: u32,
        time_zone: Tz,
    ) -> Self {
        Self {
            user_ids: user_ids.into_iter().map(Into::into).collect(),
            from,
            to,
            duration_minutes,
            time_zone,
        }
    }

    fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .list("userId", &self.user_ids)
            .param("startDate", format_local_date(&self.from, &self.time_zone))
            .param("endDate", format_local_date(&self.to, &self.time_zone))
            .param("duration", self.duration_minutes)
            .param("timeZone", self.time_zone.name())
    }
}

/// Scheduling operations.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingService<'a> {
    client: &'a CalmeshClient,
}

impl<'a> SchedulingService<'a> {
    pub(crate) fn new(client: &'a CalmeshClient) -> Self {
        Self { client }
    }

    /// Returns a user's weekly working hours.
    pub async fn availability(&self, user_id: &str) -> ClientResult<Availability> {
        self.client
            .request_json(
                &Endpoint::get(availability_path(user_id)),
                &RequestOptions::new(),
                &user_not_found(user_id),
            )
            .await
    }

    /// Replaces a user's weekly working hours.
    pub async fn set_availability(
        &self,
        user_id: &str,
        availability: &Availability,
    ) -> ClientResult<Availability> {
        let options = RequestOptions::new().json(availability)?;

        self.client
            .request_json(
                &Endpoint::put(availability_path(user_id)),
                &options,
                &user_not_found(user_id),
            )
            .await
    }

    /// Finds slots where every user in the query is free.
    pub async fn slots(&self, query: &SlotQuery) -> ClientResult<Vec<SchedulingSlot>> {
        let options = RequestOptions::new().query(query.to_params());

        self.client
            .request_json(
                &Endpoint::get("/scheduling/slots"),
                &options,
                &ErrorPolicy::none(),
            )
            .await
    }

    /// Books a meeting, creating an event in each participant's calendar.
    ///
    /// Fails with [`DomainError::UserNotFound`] when the server's message
    /// names one of the participants. A 404 naming none of them is returned
    /// as the raw [`TransportFault`](crate::TransportFault).
    pub async fn book(&self, booking: &NewBooking) -> ClientResult<Booking> {
        let options = RequestOptions::new().json(booking)?;

        self.client
            .request_json(
                &Endpoint::post("/scheduling/bookings"),
                &options,
                &participant_not_found(&booking.user_ids),
            )
            .await
    }
}

/// One text-filtered 404 rule per participant.
///
/// Longer identifiers go first so `usr_10` is not reported as `usr_1`.
fn participant_not_found<T>(user_ids: &[String]) -> ErrorPolicy<T> {
    let mut ids: Vec<&String> = user_ids.iter().collect();
    ids.sort_by_key(|id| std::cmp::Reverse(id.len()));

    ids.into_iter().fold(ErrorPolicy::new(), |policy, id| {
        policy.rule(
            ErrorRule::status(404)
                .containing(id.as_str())
                .throws(DomainError::user_not_found(id)),
        )
    })
}

fn availability_path(user_id: &str) -> String {
    format!("/users/{}/availability", segment(user_id))
}

fn user_not_found<T>(user_id: &str) -> ErrorPolicy<T> {
    ErrorPolicy::new().rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::client_for;
    use calmesh_core::{DayOfWeek, TimeOfDay, WorkingHours};
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn slot_dates_follow_query_time_zone() {
        let query = SlotQuery::new(
            ["usr_1", "usr_2"],
            Utc.with_ymd_and_hms(2024, 3, 1, 22, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap(),
            30,
            chrono_tz::Asia::Tokyo,
        );

        insta::assert_snapshot!(
            query.to_params().to_query_string(),
            @"userId=usr_1&userId=usr_2&startDate=2024-03-02&endDate=2024-03-07&duration=30&timeZone=Asia%2FTokyo"
        );
    }

    #[test]
    fn same_instant_in_western_zone() {
        let query = SlotQuery::new(
            ["usr_1"],
            Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 2, 3, 0, 0).unwrap(),
            45,
            chrono_tz::America::Los_Angeles,
        );
        let params = query.to_params();
        let pairs = params.pairs();

        assert!(pairs.contains(&("startDate", "2024-02-29")));
        assert!(pairs.contains(&("endDate", "2024-03-01")));
    }

    #[tokio::test]
    async fn availability_decodes_working_hours() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/usr_1/availability"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timeZone": "Europe/Berlin",
                "workingHours": [{"day": "monday", "start": "09:00", "end": "17:30"}]
            })))
            .mount(&server)
            .await;

        let availability = client_for(&server)
            .scheduling()
            .availability("usr_1")
            .await
            .unwrap();
        let monday = &availability.working_hours[0];
        assert_eq!(monday.day, DayOfWeek::Monday);
        assert_eq!(monday.start.minutes(), 540);
        assert_eq!(monday.duration_minutes(), 510);
    }

    #[tokio::test]
    async fn malformed_time_of_day_is_a_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/usr_1/availability"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timeZone": "UTC",
                "workingHours": [{"day": "friday", "start": "9:5", "end": "17:00"}]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .scheduling()
            .availability("usr_1")
            .await
            .unwrap_err();
        let validation = match err {
            crate::ClientError::Validation(validation) => validation,
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(validation.path(), "workingHours[0].start");
    }

    #[tokio::test]
    async fn set_availability_encodes_hh_mm() {
        let server = MockServer::start().await;
        let body = json!({
            "timeZone": "UTC",
            "workingHours": [{"day": "tuesday", "start": "08:05", "end": "12:00"}]
        });
        Mock::given(method("PUT"))
            .and(path("/v1/users/usr_1/availability"))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let availability = Availability {
            time_zone: "UTC".to_string(),
            working_hours: vec![WorkingHours {
                day: DayOfWeek::Tuesday,
                start: TimeOfDay::from_hm(8, 5).unwrap(),
                end: TimeOfDay::from_hm(12, 0).unwrap(),
            }],
        };
        let saved = client_for(&server)
            .scheduling()
            .set_availability("usr_1", &availability)
            .await
            .unwrap();
        assert_eq!(saved, availability);
    }

    #[tokio::test]
    async fn slots_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/scheduling/slots"))
            .and(query_param("startDate", "2024-03-04"))
            .and(query_param("timeZone", "UTC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"start": "2024-03-04T10:00:00Z", "end": "2024-03-04T10:30:00Z", "userIds": ["usr_1"]}
            ])))
            .mount(&server)
            .await;

        let query = SlotQuery::new(
            ["usr_1"],
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
            30,
            chrono_tz::UTC,
        );
        let slots = client_for(&server).scheduling().slots(&query).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end - slots[0].start, chrono::Duration::minutes(30));
    }

    fn booking(user_ids: &[&str]) -> NewBooking {
        NewBooking {
            user_ids: user_ids.iter().map(|id| id.to_string()).collect(),
            start: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap(),
            title: "Sync".to_string(),
            description: None,
        }
    }

    async fn book_against_404(user_ids: &[&str], message: &str) -> crate::ClientError {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scheduling/bookings"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": message })))
            .mount(&server)
            .await;

        client_for(&server)
            .scheduling()
            .book(&booking(user_ids))
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn book_names_the_missing_participant() {
        let err = book_against_404(&["usr_1", "usr_2"], "User usr_2 not found").await;
        assert_eq!(err.as_domain(), Some(&DomainError::user_not_found("usr_2")));
    }

    #[tokio::test]
    async fn book_prefers_longest_matching_id() {
        let err = book_against_404(&["usr_1", "usr_10"], "User usr_10 not found").await;
        assert_eq!(err.as_domain(), Some(&DomainError::user_not_found("usr_10")));
    }

    #[tokio::test]
    async fn book_404_without_participant_is_raw_fault() {
        let err = book_against_404(&["usr_1", "usr_2"], "Not Found").await;
        assert!(err.as_domain().is_none());
        assert_eq!(err.status_code(), Some(404));
    }
}
