//! # REASON MODEL
//!
//! Two-branch outcome used by every expected failure path of the runtime:
//! a value, or a [`Reason`] explaining why there is none. Rust's `Result`
//! already guarantees exactly one branch is populated, so [`Maybe`] is an alias.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of an operation whose failure callers are expected to branch on.
pub type Maybe<T> = Result<T, Reason>;

/// Type tag of a [`Reason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonKind {
    NotFound,
    UnsupportedOperation,
    Aggregate,
    InvalidArgument,
    Failure,
}

/// Structured explanation of an unsatisfied outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{text}")]
pub struct Reason {
    pub kind: ReasonKind,
    pub text: String,
    #[serde(default)]
    pub reasons: Vec<Reason>,
}

impl Reason {
    pub fn new(kind: ReasonKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            reasons: Vec::new(),
        }
    }

    pub fn not_found(text: impl Into<String>) -> Self {
        Self::new(ReasonKind::NotFound, text)
    }

    pub fn unsupported_operation(text: impl Into<String>) -> Self {
        Self::new(ReasonKind::UnsupportedOperation, text)
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self::new(ReasonKind::Failure, text)
    }

    /// Wraps `reasons` (kept in the given order) under one summary.
    pub fn aggregate(text: impl Into<String>, reasons: Vec<Reason>) -> Self {
        Self {
            kind: ReasonKind::Aggregate,
            text: text.into(),
            reasons,
        }
    }

    pub fn with_reason(mut self, reason: Reason) -> Self {
        self.reasons.push(reason);
        self
    }

    pub fn is(&self, kind: ReasonKind) -> bool {
        self.kind == kind
    }

    /// Text of this reason followed by the texts of all nested reasons.
    pub fn full_text(&self) -> String {
        if self.reasons.is_empty() {
            return self.text.clone();
        }

        let nested: Vec<String> = self.reasons.iter().map(Reason::full_text).collect();
        format!("{} [{}]", self.text, nested.join("; "))
    }
}

/// `Ok(value)` if present, otherwise a `NotFound` reason built from `msg`.
pub fn value_or_not_found<T>(value: Option<T>, msg: impl FnOnce() -> String) -> Maybe<T> {
    value.ok_or_else(|| Reason::not_found(msg()))
}

/// Like [`value_or_not_found`], but an empty string counts as absent.
pub fn non_empty_or_not_found(value: Option<&str>, msg: impl FnOnce() -> String) -> Maybe<String> {
    value_or_not_found(
        value.filter(|v| !v.is_empty()).map(str::to_string),
        msg,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_keeps_order() {
        let reason = Reason::aggregate(
            "all failed",
            vec![Reason::not_found("a"), Reason::not_found("b")],
        );
        assert!(reason.is(ReasonKind::Aggregate));
        let texts: Vec<&str> = reason.reasons.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_full_text_includes_nested_reasons() {
        let reason = Reason::aggregate("outer", vec![Reason::not_found("inner")])
            .with_reason(Reason::failure("second").with_reason(Reason::not_found("deep")));
        assert_eq!(reason.full_text(), "outer [inner; second [deep]]");
        assert_eq!(reason.to_string(), "outer");
    }

    #[test]
    fn test_non_empty_or_not_found() {
        assert_eq!(non_empty_or_not_found(Some("x"), || "m".into()), Ok("x".to_string()));

        let empty = non_empty_or_not_found(Some(""), || "empty".into()).unwrap_err();
        assert!(empty.is(ReasonKind::NotFound));
        assert_eq!(empty.text, "empty");

        assert!(non_empty_or_not_found(None, || "absent".into()).is_err());
    }

    #[test]
    fn test_reason_serializes_with_nested_reasons() {
        let reason = Reason::aggregate("outer", vec![Reason::not_found("inner")]);
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["kind"], "Aggregate");
        assert_eq!(json["reasons"][0]["text"], "inner");

        let back: Reason = serde_json::from_value(json).unwrap();
        assert_eq!(back, reason);
    }
}
