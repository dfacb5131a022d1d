//! Core types for the calmesh calendar API SDK.
//!
//! - [`schema`] - validation of raw JSON responses into typed values
//! - [`entities`] - the declared response shapes and request payloads
//! - [`time`] - `HH:mm` time of day and zone-explicit date encoding
//! - [`error`] - the domain error taxonomy surfaced to SDK consumers
//! - [`tracing`] - optional subscriber setup for applications

pub mod entities;
pub mod error;
pub mod schema;
pub mod time;
pub mod tracing;

pub use entities::{
    AttendeeStatus, AuthorizationUrl, Availability, Booking, BusyInterval, Calendar,
    CalendarEvent, DayOfWeek, EventAttendee, EventStatus, EventTime, FreeBusy, NewBooking,
    NewEvent, NewUser, OAuthConnection, Organization, Provider, SchedulingSlot, User,
    WorkingHours,
};
pub use error::DomainError;
pub use schema::{Json, NoBody, Schema, ValidationError, validate};
pub use time::{TimeOfDay, TimeOfDayError, format_local_date, local_date, to_iso8601};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
