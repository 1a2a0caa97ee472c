use serde::Serialize;
use serde_json::Value;

use crate::ErrorKind;

/// A composable expectation about a value
///
/// Matchers over [`Value`] plug into [`SameBeanAs::with`][crate::SameBeanAs::with]
/// to check a single field of a larger value.
pub trait Matcher<T: ?Sized> {
    /// What a matching value looks like, e.g. `"kiwi"`
    fn description(&self) -> String;

    /// Compare `actual` against the expectation
    ///
    /// `Err` is reserved for a broken setup (an unknown field path, unreadable
    /// files); a value that does not match is a [`Verdict::Mismatch`].
    fn check(&self, actual: &T) -> crate::Result<Verdict>;
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for &M {
    fn description(&self) -> String {
        (**self).description()
    }

    fn check(&self, actual: &T) -> crate::Result<Verdict> {
        (**self).check(actual)
    }
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for Box<M> {
    fn description(&self) -> String {
        (**self).description()
    }

    fn check(&self, actual: &T) -> crate::Result<Verdict> {
        (**self).check(actual)
    }
}

/// Outcome of [`Matcher::check`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch(MismatchReport),
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Why a value did not match
///
/// `expected` / `actual` hold full renderings of both sides when there is
/// something worth diffing, `expected_name` / `actual_name` where they came
/// from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MismatchReport {
    pub kind: ErrorKind,
    pub description: String,
    pub mismatch_description: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub expected_name: Option<String>,
    pub actual_name: Option<String>,
}

impl MismatchReport {
    pub fn new(description: impl Into<String>, mismatch_description: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Mismatch,
            description: description.into(),
            mismatch_description: mismatch_description.into(),
            expected: None,
            actual: None,
            expected_name: None,
            actual_name: None,
        }
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Label the sides of the comparison, e.g. with file names
    pub fn with_names(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected_name = Some(expected.into());
        self.actual_name = Some(actual.into());
        self
    }
}

/// Compact rendering used in descriptions, e.g. `"kiwi"` or `{"a":1}`
pub fn describe_value(value: &Value) -> String {
    value.to_string()
}

/// Matches a value equal to `expected`, compared as trees
pub fn equal_to<E: Serialize>(expected: E) -> EqualTo {
    let expected = crate::tree::Rules::new()
        .build(&expected)
        .map(crate::tree::Tree::into_value);
    EqualTo { expected }
}

/// See [`equal_to`]
#[derive(Clone, Debug)]
pub struct EqualTo {
    expected: crate::Result<Value>,
}

impl Matcher<Value> for EqualTo {
    fn description(&self) -> String {
        match &self.expected {
            Ok(expected) => describe_value(expected),
            Err(err) => format!("<{err}>"),
        }
    }

    fn check(&self, actual: &Value) -> crate::Result<Verdict> {
        let expected = self.expected.as_ref().map_err(Clone::clone)?;
        if expected == actual {
            Ok(Verdict::Match)
        } else {
            Ok(Verdict::Mismatch(MismatchReport::new(
                Matcher::<Value>::description(self),
                format!("was {}", describe_value(actual)),
            )))
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StrOp {
    StartsWith,
    EndsWith,
    Contains,
}

/// Matches text that starts with `prefix`
pub fn starts_with(prefix: impl Into<String>) -> StrMatcher {
    StrMatcher {
        op: StrOp::StartsWith,
        expected: prefix.into(),
    }
}

/// Matches text that ends with `suffix`
pub fn ends_with(suffix: impl Into<String>) -> StrMatcher {
    StrMatcher {
        op: StrOp::EndsWith,
        expected: suffix.into(),
    }
}

/// Matches text containing `needle`
pub fn contains_str(needle: impl Into<String>) -> StrMatcher {
    StrMatcher {
        op: StrOp::Contains,
        expected: needle.into(),
    }
}

/// See [`starts_with`], [`ends_with`], [`contains_str`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrMatcher {
    op: StrOp,
    expected: String,
}

impl StrMatcher {
    fn accepts(&self, actual: &str) -> bool {
        match self.op {
            StrOp::StartsWith => actual.starts_with(&self.expected),
            StrOp::EndsWith => actual.ends_with(&self.expected),
            StrOp::Contains => actual.contains(&self.expected),
        }
    }

    fn verdict(&self, accepted: bool, actual: &Value) -> Verdict {
        if accepted {
            Verdict::Match
        } else {
            Verdict::Mismatch(MismatchReport::new(
                Matcher::<str>::description(self),
                format!("was {}", describe_value(actual)),
            ))
        }
    }
}

impl Matcher<str> for StrMatcher {
    fn description(&self) -> String {
        let op = match self.op {
            StrOp::StartsWith => "starting with",
            StrOp::EndsWith => "ending with",
            StrOp::Contains => "containing",
        };
        format!(
            "a string {op} {}",
            describe_value(&Value::String(self.expected.clone()))
        )
    }

    fn check(&self, actual: &str) -> crate::Result<Verdict> {
        let accepted = self.accepts(actual);
        Ok(self.verdict(accepted, &Value::String(actual.to_owned())))
    }
}

impl Matcher<String> for StrMatcher {
    fn description(&self) -> String {
        Matcher::<str>::description(self)
    }

    fn check(&self, actual: &String) -> crate::Result<Verdict> {
        Matcher::<str>::check(self, actual.as_str())
    }
}

impl Matcher<Value> for StrMatcher {
    fn description(&self) -> String {
        Matcher::<str>::description(self)
    }

    fn check(&self, actual: &Value) -> crate::Result<Verdict> {
        let accepted = match actual {
            Value::String(actual) => self.accepts(actual),
            _ => false,
        };
        Ok(self.verdict(accepted, actual))
    }
}

/// Matches anything whose [`Display`][std::fmt::Display] output matches `matcher`
///
/// ```rust
/// use approvalbox::{assert_err, ends_with, has_message};
///
/// let err = assert_err(has_message(ends_with("found in string")), || "x".parse::<u8>());
/// ```
pub fn has_message<M>(matcher: M) -> HasMessage<M> {
    HasMessage { matcher }
}

/// See [`has_message`]
#[derive(Clone, Debug)]
pub struct HasMessage<M> {
    matcher: M,
}

impl<E: std::fmt::Display + ?Sized, M: Matcher<str>> Matcher<E> for HasMessage<M> {
    fn description(&self) -> String {
        format!("a message {}", self.matcher.description())
    }

    fn check(&self, actual: &E) -> crate::Result<Verdict> {
        let message = actual.to_string();
        match self.matcher.check(message.as_str())? {
            Verdict::Match => Ok(Verdict::Match),
            Verdict::Mismatch(report) => Ok(Verdict::Mismatch(MismatchReport::new(
                Matcher::<E>::description(self),
                format!("message {}", report.mismatch_description),
            ))),
        }
    }
}

/// Build a matcher from a description and a check
///
/// The check returns the mismatch description on failure.
///
/// ```rust
/// use approvalbox::{matcher_fn, Matcher};
/// use serde_json::Value;
///
/// let positive = matcher_fn("a positive number", |v: &Value| match v.as_i64() {
///     Some(n) if 0 < n => Ok(()),
///     _ => Err(format!("was {v}")),
/// });
/// assert!(positive.check(&Value::from(3)).unwrap().is_match());
/// ```
pub fn matcher_fn<F>(description: impl Into<String>, check: F) -> FnMatcher<F> {
    FnMatcher {
        description: description.into(),
        check,
    }
}

/// See [`matcher_fn`]
#[derive(Clone)]
pub struct FnMatcher<F> {
    description: String,
    check: F,
}

impl<T: ?Sized, F: Fn(&T) -> Result<(), String>> Matcher<T> for FnMatcher<F> {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn check(&self, actual: &T) -> crate::Result<Verdict> {
        match (self.check)(actual) {
            Ok(()) => Ok(Verdict::Match),
            Err(mismatch) => Ok(Verdict::Mismatch(MismatchReport::new(
                self.description.clone(),
                mismatch,
            ))),
        }
    }
}

impl<F> std::fmt::Debug for FnMatcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMatcher")
            .field("description", &self.description)
            .finish()
    }
}
