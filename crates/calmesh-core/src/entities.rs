//! Entity value types returned by the calendar API.
//!
//! These are the declared response shapes. They deserialize from the API's
//! camelCase JSON and are validated through [`crate::schema`]. Request
//! payloads live next to the entity they create.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::time::TimeOfDay;

/// A calendar provider a user can link through OAuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Calendar.
    Google,
    /// Microsoft Outlook / Exchange Online.
    Microsoft,
}

impl Provider {
    /// All supported providers.
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Microsoft];

    /// Returns the wire name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// An organization grouping users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// URL-safe unique identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time, if the organization was ever updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user whose calendars are aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Caller-assigned unique identifier.
    pub id: String,
    /// Slug of the owning organization.
    #[serde(default)]
    pub organization: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Caller-assigned unique identifier.
    pub id: String,
    /// Slug of the owning organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NewUser {
    /// Creates a payload with only the identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            organization: None,
            email: None,
            name: None,
        }
    }

    /// Builder method to set the owning organization.
    pub fn with_organization(mut self, slug: impl Into<String>) -> Self {
        self.organization = Some(slug.into());
        self
    }

    /// Builder method to set the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A user's OAuth link to a calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConnection {
    pub user_id: String,
    pub provider: Provider,
    /// Account email on the provider side.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// URL the end user must visit to grant calendar access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationUrl {
    pub url: String,
}

/// A calendar exposed by a linked provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub provider: Provider,
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Start or end of an event: an instant, or a date for all-day events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    /// A specific instant.
    DateTime(DateTime<Utc>),
    /// An all-day date.
    Date(NaiveDate),
}

impl EventTime {
    /// Returns true if this is an all-day date.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// The response status of an attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendeeStatus {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
}

/// An attendee of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendee {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: AttendeeStatus,
    #[serde(default)]
    pub organizer: bool,
}

/// A calendar event from any linked provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub calendar_id: String,
    pub provider: Provider,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub status: EventStatus,
    #[serde(default)]
    pub attendees: Vec<EventAttendee>,
    /// Link to the event in the provider's web UI.
    #[serde(default)]
    pub html_link: Option<String>,
}

/// Payload for creating or replacing an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub calendar_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    /// Attendee emails.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
}

impl NewEvent {
    /// Creates an event payload with the required fields.
    pub fn new(
        calendar_id: impl Into<String>,
        title: impl Into<String>,
        start: EventTime,
        end: EventTime,
    ) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            title: title.into(),
            description: None,
            location: None,
            start,
            end,
            attendees: Vec::new(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to add an attendee email.
    pub fn with_attendee(mut self, email: impl Into<String>) -> Self {
        self.attendees.push(email.into());
        self
    }
}

/// A busy period in a user's aggregated calendars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub provider: Option<Provider>,
}

/// Free/busy information for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusy {
    pub user_id: String,
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
}

/// Day of the week used by working hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Returns the wire name of the day.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

/// Bookable hours on one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl WorkingHours {
    /// Returns the length of the window in minutes, or zero if `end` is not after `start`.
    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }
}

/// A user's weekly availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// IANA time zone the working hours are expressed in.
    pub time_zone: String,
    #[serde(default)]
    pub working_hours: Vec<WorkingHours>,
}

/// A time range in which all requested users are free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// Payload for booking a meeting across users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user_ids: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user_ids: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    /// Events created in each participant's calendar.
    #[serde(default)]
    pub event_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_wire_names() {
        for provider in Provider::ALL {
            let encoded = serde_json::to_value(provider).unwrap();
            assert_eq!(encoded, json!(provider.as_str()));
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert!("yahoo".parse::<Provider>().is_err());
    }

    #[test]
    fn event_time_union() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": "evt_1",
            "calendarId": "primary",
            "provider": "google",
            "title": "Offsite",
            "start": "2024-03-15",
            "end": "2024-03-16",
            "status": "confirmed",
            "attendees": [
                {"email": "a@example.com", "status": "needsAction"},
                {"email": "b@example.com", "status": "accepted", "organizer": true}
            ]
        }))
        .unwrap();

        assert!(event.start.is_all_day());
        assert_eq!(event.attendees[0].status, AttendeeStatus::NeedsAction);
        assert!(event.attendees[1].organizer);

        let timed: EventTime = serde_json::from_value(json!("2024-03-15T10:00:00Z")).unwrap();
        assert!(!timed.is_all_day());
    }

    #[test]
    fn new_user_skips_unset_fields() {
        let payload = NewUser::new("usr_1").with_organization("acme");
        insta::assert_json_snapshot!(payload, @r#"
        {
          "id": "usr_1",
          "organization": "acme"
        }
        "#);
    }

    #[test]
    fn working_hours_encode_canonical_times() {
        let hours: WorkingHours = serde_json::from_value(json!({
            "day": "monday",
            "start": "9:00",
            "end": "17:30"
        }))
        .unwrap();
        assert_eq!(hours.duration_minutes(), 510);
        assert_eq!(
            serde_json::to_value(&hours).unwrap(),
            json!({"day": "monday", "start": "09:00", "end": "17:30"})
        );
    }
}
