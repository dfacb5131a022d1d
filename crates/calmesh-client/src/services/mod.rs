//! Resource services.
//!
//! Each service is a borrowed view over [`CalmeshClient`](crate::CalmeshClient).
//! Operations only build an endpoint, request options and an error policy,
//! then delegate to [`CalmeshClient::request`](crate::CalmeshClient::request).

mod calendar;
mod oauth;
mod organizations;
mod scheduling;
mod users;

pub use calendar::{CalendarService, EventQuery};
pub use oauth::OAuthService;
pub use organizations::OrganizationsService;
pub use scheduling::{SchedulingService, SlotQuery};
pub use users::UsersService;
