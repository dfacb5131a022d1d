//! Response schema validation.
//!
//! A [`Schema`] turns a raw JSON value into a typed value or a
//! [`ValidationError`]. Shapes are declared as serde types: optional fields
//! are `Option`, unions are untagged enums, string-literal enums use
//! `rename_all`, dates are `chrono` types and `HH:mm` strings are
//! [`TimeOfDay`](crate::time::TimeOfDay). [`Json`] validates against such a
//! type; [`NoBody`] declares that no response body is expected at all.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// The response body did not match the declared shape.
///
/// This signals a contract mismatch between client and server and is never
/// remapped by error policies.
#[derive(Debug, Error)]
#[error("response does not match {expected} at `{path}`: {message}")]
pub struct ValidationError {
    expected: &'static str,
    path: String,
    message: String,
}

impl ValidationError {
    /// Creates a validation error for the given target type, JSON path and reason.
    pub fn new(expected: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expected,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the name of the type the value was validated against.
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// Returns the JSON path of the offending value (`.` for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the reason the value was rejected.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A declared response shape.
pub trait Schema {
    /// The typed value produced by a successful validation.
    type Output;

    /// Whether a response body must be read for this schema.
    const READS_BODY: bool = true;

    /// Validates `raw` and converts it into [`Self::Output`].
    fn validate(&self, raw: Value) -> Result<Self::Output, ValidationError>;
}

/// Schema backed by a serde type.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    /// Creates the schema for `T`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> Schema for Json<T> {
    type Output = T;

    fn validate(&self, raw: Value) -> Result<T, ValidationError> {
        validate(raw)
    }
}

/// Schema for operations that return no body.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBody;

impl Schema for NoBody {
    type Output = ();

    const READS_BODY: bool = false;

    fn validate(&self, _raw: Value) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Validates a JSON value against the shape of `T`.
pub fn validate<T: DeserializeOwned>(raw: Value) -> Result<T, ValidationError> {
    serde_path_to_error::deserialize(raw).map_err(|err| {
        let path = err.path().to_string();
        ValidationError::new(std::any::type_name::<T>(), path, err.into_inner().to_string())
    })
}
