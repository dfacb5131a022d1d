//! HTTP client for the calmesh calendar API.
//!
//! - [`CalmeshClient`] - The request orchestrator and entry point to the services
//! - [`ClientConfig`] - Base URL, token and HTTP options
//! - [`ErrorPolicy`] - Ordered rules that turn HTTP failures into domain outcomes
//! - [`QueryParams`] - Ordered query strings with repeated keys
//! - [`services`] - Organizations, users, OAuth, calendar and scheduling
//!
//! # Request flow
//!
//! ```text
//!  service call
//!       │ Endpoint + RequestOptions + ErrorPolicy
//!       ▼
//! ┌──────────────┐   non-2xx   ┌──────────────┐
//! │  Transport   │────────────▶│ ErrorPolicy  │──▶ DomainError / value / TransportFault
//! └──────┬───────┘             └──────────────┘
//!        │ 2xx
//!        ▼
//! ┌──────────────┐
//! │    Schema    │──▶ typed value / ValidationError
//! └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calmesh_client::CalmeshClient;
//! use calmesh_core::Provider;
//!
//! let client = CalmeshClient::from_env()?;
//! match client.oauth().connection("usr_42", Provider::Google).await {
//!     Ok(connection) => println!("linked as {:?}", connection.email),
//!     Err(err) if err.as_domain().is_some_and(|e| e.is_not_found()) => println!("not linked"),
//!     Err(err) => return Err(err.into()),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod policy;
pub mod query;
pub mod request;
pub mod services;
pub mod transport;

// Re-export main types at crate root
pub use client::CalmeshClient;
pub use config::{
    BASE_URL_ENV_VAR, ClientConfig, TOKEN_ENV_VAR, TOKEN_PREFIXES, TokenCheck, ValueSource,
};
pub use error::{ClientError, ClientResult, TransportFault};
pub use policy::{ErrorPolicy, ErrorRule, RuleMatcher, RuleOutcome};
pub use query::{QueryParams, QueryScalar, QueryValue, ToQueryValue};
pub use request::{Endpoint, Method, RequestOptions, segment};
pub use services::{
    CalendarService, EventQuery, OAuthService, OrganizationsService, SchedulingService,
    SlotQuery, UsersService,
};
pub use transport::{RawResponse, Transport};

pub use calmesh_core::{DomainError, ValidationError};
