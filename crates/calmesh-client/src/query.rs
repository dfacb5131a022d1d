//! Query-string parameters.
//!
//! [`QueryParams`] keeps entries in insertion order and distinguishes an
//! absent value (omitted from the URL) from an empty string (sent as
//! `key=`). Lists expand to one `key=value` pair per element.

use calmesh_core::{DayOfWeek, Provider, to_iso8601};
use chrono::{DateTime, NaiveDate, Utc};
use url::Url;

/// The value of one query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Not sent at all.
    Absent,
    /// Sent once, even when empty.
    Scalar(String),
    /// Sent once per present, non-empty element, in order.
    List(Vec<Option<String>>),
}

/// Conversion of a Rust value into a [`QueryValue`].
pub trait ToQueryValue {
    fn to_query_value(&self) -> QueryValue;
}

/// Types that render as a single query scalar.
pub trait QueryScalar {
    fn to_query_string(&self) -> String;
}

macro_rules! display_query_scalar {
    ($($ty:ty),*) => {
        $(
            impl QueryScalar for $ty {
                fn to_query_string(&self) -> String {
                    self.to_string()
                }
            }

            impl ToQueryValue for $ty {
                fn to_query_value(&self) -> QueryValue {
                    QueryValue::Scalar(self.to_query_string())
                }
            }
        )*
    };
}

display_query_scalar!(str, String, bool, u8, u16, u32, u64, usize, i32, i64);

impl QueryScalar for DateTime<Utc> {
    fn to_query_string(&self) -> String {
        to_iso8601(self)
    }
}

impl QueryScalar for NaiveDate {
    fn to_query_string(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

impl QueryScalar for Provider {
    fn to_query_string(&self) -> String {
        self.as_str().to_string()
    }
}

impl QueryScalar for DayOfWeek {
    fn to_query_string(&self) -> String {
        self.as_str().to_string()
    }
}

macro_rules! scalar_query_value {
    ($($ty:ty),*) => {
        $(
            impl ToQueryValue for $ty {
                fn to_query_value(&self) -> QueryValue {
                    QueryValue::Scalar(self.to_query_string())
                }
            }
        )*
    };
}

scalar_query_value!(DateTime<Utc>, NaiveDate, Provider, DayOfWeek);

impl<T: QueryScalar + ?Sized> QueryScalar for &T {
    fn to_query_string(&self) -> String {
        (**self).to_query_string()
    }
}

impl<T: ToQueryValue + ?Sized> ToQueryValue for &T {
    fn to_query_value(&self) -> QueryValue {
        (**self).to_query_value()
    }
}

impl<T: QueryScalar> ToQueryValue for Option<T> {
    fn to_query_value(&self) -> QueryValue {
        match self {
            Some(value) => QueryValue::Scalar(value.to_query_string()),
            None => QueryValue::Absent,
        }
    }
}

impl<T: QueryScalar> ToQueryValue for [T] {
    fn to_query_value(&self) -> QueryValue {
        QueryValue::List(self.iter().map(|v| Some(v.to_query_string())).collect())
    }
}

impl<T: QueryScalar> ToQueryValue for Vec<T> {
    fn to_query_value(&self) -> QueryValue {
        self.as_slice().to_query_value()
    }
}

/// Ordered query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToQueryValue) -> Self {
        self.push(key, value.to_query_value());
        self
    }

    /// Adds a parameter from a slice, one pair per element.
    pub fn list<T: QueryScalar>(mut self, key: impl Into<String>, values: &[T]) -> Self {
        self.push(key, values.to_query_value());
        self
    }

    /// Adds a list parameter whose elements may be missing; missing elements are skipped.
    pub fn optional_list<T: QueryScalar>(
        mut self,
        key: impl Into<String>,
        values: &[Option<T>],
    ) -> Self {
        let items = values
            .iter()
            .map(|v| v.as_ref().map(QueryScalar::to_query_string))
            .collect();
        self.push(key, QueryValue::List(items));
        self
    }

    /// Appends a raw entry.
    pub fn push(&mut self, key: impl Into<String>, value: QueryValue) {
        self.entries.push((key.into(), value));
    }

    /// Returns true if no pair would be emitted.
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Returns the `(key, value)` pairs that end up in the URL, in order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            match value {
                QueryValue::Absent => {}
                QueryValue::Scalar(v) => pairs.push((key.as_str(), v.as_str())),
                QueryValue::List(items) => pairs.extend(
                    items
                        .iter()
                        .flatten()
                        .filter(|v| !v.is_empty())
                        .map(|v| (key.as_str(), v.as_str())),
                ),
            }
        }
        pairs
    }

    /// Appends the pairs to `url`'s query string.
    pub fn apply_to(&self, url: &mut Url) {
        if self.is_empty() {
            return;
        }
        let mut serializer = url.query_pairs_mut();
        for (key, value) in self.pairs() {
            serializer.append_pair(key, value);
        }
    }

    /// Renders the form-encoded query string without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_range_with_repeated_providers() {
        let min = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let max = Utc.with_ymd_and_hms(2024, 1, 8, 12, 30, 0).unwrap();
        let time_zone: Option<&str> = None;

        let query = QueryParams::new()
            .param("minDate", min)
            .param("maxDate", max)
            .list("provider", &[Provider::Google, Provider::Microsoft])
            .param("timeZone", time_zone);

        assert_eq!(
            query.pairs(),
            vec![
                ("minDate", "2024-01-01T00:00:00.000Z"),
                ("maxDate", "2024-01-08T12:30:00.000Z"),
                ("provider", "google"),
                ("provider", "microsoft"),
            ]
        );

        insta::assert_snapshot!(
            query.to_query_string(),
            @"minDate=2024-01-01T00%3A00%3A00.000Z&maxDate=2024-01-08T12%3A30%3A00.000Z&provider=google&provider=microsoft"
        );
        assert!(!query.to_query_string().contains("timeZone"));
    }

    #[test]
    fn empty_string_scalar_is_sent() {
        let query = QueryParams::new().param("search", "").param("limit", 10u32);
        assert_eq!(query.to_query_string(), "search=&limit=10");
    }

    #[test]
    fn list_skips_missing_and_empty_elements() {
        let values = [Some("a".to_string()), None, Some(String::new()), Some("b".to_string())];
        let query = QueryParams::new().optional_list("include", &values);
        assert_eq!(query.to_query_string(), "include=a&include=b");
    }

    #[test]
    fn empty_list_and_absent_emit_nothing() {
        let empty: Vec<Provider> = Vec::new();
        let query = QueryParams::new()
            .param("provider", empty)
            .param("page", None::<u32>);
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn apply_to_url_preserves_order() {
        let mut url = Url::parse("https://api.test/v1/users/u1/events").unwrap();
        QueryParams::new()
            .param("b", "2")
            .param("a", "1")
            .apply_to(&mut url);
        assert_eq!(url.as_str(), "https://api.test/v1/users/u1/events?b=2&a=1");

        let mut untouched = Url::parse("https://api.test/v1/users").unwrap();
        QueryParams::new().apply_to(&mut untouched);
        assert_eq!(untouched.as_str(), "https://api.test/v1/users");
    }

    #[test]
    fn dates_and_days() {
        let query = QueryParams::new()
            .param("startDate", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .param("day", DayOfWeek::Wednesday)
            .param("allDay", true);
        assert_eq!(
            query.to_query_string(),
            "startDate=2024-03-05&day=wednesday&allDay=true"
        );
    }
}
