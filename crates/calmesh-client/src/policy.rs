//! Declarative mapping of HTTP failures onto domain outcomes.
//!
//! An [`ErrorPolicy`] is an ordered list of [`ErrorRule`]s. Each rule matches
//! a status code and, optionally, fragments of the status text; the first
//! rule that matches decides the outcome. Rules sharing a status code must
//! therefore be listed most-specific first:
//!
//! ```ignore
//! let policy = ErrorPolicy::new()
//!     .rule(ErrorRule::status(404)
//!         .containing("OAuth connection not found")
//!         .throws(DomainError::oauth_connection_not_found(user_id, provider)))
//!     .rule(ErrorRule::status(404).throws(DomainError::user_not_found(user_id)));
//! ```

use std::fmt;
use std::sync::Arc;

use calmesh_core::DomainError;

use crate::error::{ClientError, ClientResult, TransportFault};

type Fallback<T> = Arc<dyn Fn(&TransportFault) -> T + Send + Sync>;

/// What a matching rule does.
pub enum RuleOutcome<T> {
    /// Fail the call with this domain error.
    Throw(DomainError),
    /// Succeed with the value produced from the fault.
    Return(Fallback<T>),
}

impl<T> Clone for RuleOutcome<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Throw(err) => Self::Throw(err.clone()),
            Self::Return(f) => Self::Return(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for RuleOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Throw(err) => f.debug_tuple("Throw").field(err).finish(),
            Self::Return(_) => f.write_str("Return(..)"),
        }
    }
}

/// Match criteria of a rule, before its outcome is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatcher {
    status_code: u16,
    text_filter: Option<Vec<String>>,
}

impl RuleMatcher {
    /// Only match when the status text contains `fragment` (case-sensitive).
    pub fn containing(self, fragment: impl Into<String>) -> Self {
        self.containing_any([fragment])
    }

    /// Only match when the status text contains at least one of `fragments`.
    ///
    /// Repeated calls widen the filter.
    pub fn containing_any<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_filter
            .get_or_insert_with(Vec::new)
            .extend(fragments.into_iter().map(Into::into));
        self
    }

    /// Completes the rule: a match fails the call with `error`.
    pub fn throws<T>(self, error: DomainError) -> ErrorRule<T> {
        ErrorRule {
            matcher: self,
            outcome: RuleOutcome::Throw(error),
        }
    }

    /// Completes the rule: a match succeeds with `value`.
    pub fn returns<T>(self, value: T) -> ErrorRule<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.returns_with(move |_| value.clone())
    }

    /// Completes the rule: a match succeeds with the value computed from the fault.
    pub fn returns_with<T, F>(self, f: F) -> ErrorRule<T>
    where
        F: Fn(&TransportFault) -> T + Send + Sync + 'static,
    {
        ErrorRule {
            matcher: self,
            outcome: RuleOutcome::Return(Arc::new(f)),
        }
    }

    fn matches(&self, fault: &TransportFault) -> bool {
        if self.status_code != fault.status_code() {
            return false;
        }
        match self.text_filter {
            None => true,
            Some(ref fragments) => fragments
                .iter()
                .any(|fragment| fault.status_text().contains(fragment.as_str())),
        }
    }
}

/// One entry of an [`ErrorPolicy`].
pub struct ErrorRule<T> {
    matcher: RuleMatcher,
    outcome: RuleOutcome<T>,
}

impl ErrorRule<()> {
    /// Starts a rule matching `status_code`.
    ///
    /// Defined on `ErrorRule<()>` only so it can be called without naming
    /// `T`; the finished rule's type comes from `throws`/`returns`.
    pub fn status(status_code: u16) -> RuleMatcher {
        RuleMatcher {
            status_code,
            text_filter: None,
        }
    }
}

impl<T> ErrorRule<T> {
    /// Returns the status code this rule matches.
    pub fn status_code(&self) -> u16 {
        self.matcher.status_code
    }

    /// Returns the text fragments this rule requires, if any.
    pub fn text_filter(&self) -> Option<&[String]> {
        self.matcher.text_filter.as_deref()
    }

    /// Returns the rule's outcome.
    pub fn outcome(&self) -> &RuleOutcome<T> {
        &self.outcome
    }

    /// Returns true if the rule applies to `fault`.
    pub fn matches(&self, fault: &TransportFault) -> bool {
        self.matcher.matches(fault)
    }

    fn resolve(&self, fault: &TransportFault) -> ClientResult<T> {
        match self.outcome {
            RuleOutcome::Throw(ref err) => Err(ClientError::Domain(err.clone())),
            RuleOutcome::Return(ref f) => Ok(f(fault)),
        }
    }
}

impl<T> Clone for ErrorRule<T> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            outcome: self.outcome.clone(),
        }
    }
}

impl<T> fmt::Debug for ErrorRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRule")
            .field("status_code", &self.matcher.status_code)
            .field("text_filter", &self.matcher.text_filter)
            .field("outcome", &self.outcome)
            .finish()
    }
}

/// Ordered error rules for one call site.
pub struct ErrorPolicy<T> {
    rules: Vec<ErrorRule<T>>,
}

impl<T> ErrorPolicy<T> {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// A policy that maps nothing: every fault is returned unchanged.
    pub fn none() -> Self {
        Self::new()
    }

    /// Appends a rule. Earlier rules take precedence.
    pub fn rule(mut self, rule: ErrorRule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[ErrorRule<T>] {
        &self.rules
    }

    /// Resolves a failed call.
    ///
    /// Errors other than [`ClientError::Transport`] are returned unchanged.
    /// A transport fault is resolved by the first matching rule; if none
    /// matches, the fault itself is returned.
    pub fn apply(&self, error: ClientError) -> ClientResult<T> {
        let ClientError::Transport(ref fault) = error else {
            return Err(error);
        };

        match self.rules.iter().find(|rule| rule.matches(fault)) {
            Some(rule) => rule.resolve(fault),
            None => Err(error),
        }
    }
}

impl<T> Default for ErrorPolicy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ErrorPolicy<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<T> fmt::Debug for ErrorPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.rules).finish()
    }
}
