#[cfg(feature = "color")]
use anstream::stderr;
#[cfg(not(feature = "color"))]
use std::io::stderr;

use crate::Action;
use crate::Error;
use crate::ErrorKind;
use crate::Matcher;
use crate::MismatchReport;
use crate::Verdict;

const NO_PANIC: &str = "Expected panic but no panic occurred!";
const NO_ERROR: &str = "Expected error but the operation succeeded!";

/// Check a value against a [`Matcher`], panicking on failure
///
/// ```rust
/// use approvalbox::{assert_that, ends_with};
///
/// assert_that("Hello, world", ends_with("world"));
/// ```
#[track_caller]
pub fn assert_that<T: ?Sized, M: Matcher<T>>(actual: &T, matcher: M) {
    Assert::new().that(actual, matcher);
}

/// [`assert_that`], prefixing the failure with `reason`
#[track_caller]
pub fn assert_that_with_reason<T: ?Sized, M: Matcher<T>>(reason: &str, actual: &T, matcher: M) {
    Assert::new().that_with_reason(reason, actual, matcher);
}

/// [`assert_that`], returning the failure instead of panicking
pub fn try_assert_that<T: ?Sized, M: Matcher<T>>(actual: &T, matcher: M) -> crate::Result<()> {
    Assert::new().try_that(actual, matcher)
}

/// Run `f`, expecting it to panic with a message accepted by `matcher`
///
/// Returns the panic message.  Panics carrying something other than a message
/// were not raised through `panic!("...")` and are resumed untouched.
///
/// ```rust
/// use approvalbox::{assert_panics, starts_with};
///
/// let message = assert_panics(starts_with("index out of bounds"), || {
///     let items: Vec<u8> = Vec::new();
///     let _ = items[1];
/// });
/// assert!(message.contains("len is 0"));
/// ```
#[track_caller]
pub fn assert_panics<M: Matcher<str>>(matcher: M, f: impl FnOnce()) -> String {
    match try_assert_panics(matcher, f) {
        Ok(message) => message,
        Err(err) => err.panic(),
    }
}

/// [`assert_panics`], returning the failure instead of panicking
pub fn try_assert_panics<M: Matcher<str>>(matcher: M, f: impl FnOnce()) -> crate::Result<String> {
    let payload = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(()) => return Err(Error::new(ErrorKind::Mismatch, NO_PANIC)),
        Err(payload) => payload,
    };
    let message = match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_owned(),
            Err(payload) => std::panic::resume_unwind(payload),
        },
    };
    Assert::new().try_that(message.as_str(), matcher)?;
    Ok(message)
}

/// Run `f`, expecting an `Err` accepted by `matcher`
///
/// Returns the error.
#[track_caller]
pub fn assert_err<T, E, M: Matcher<E>>(matcher: M, f: impl FnOnce() -> Result<T, E>) -> E {
    let err = match f() {
        Ok(_) => Error::new(ErrorKind::Mismatch, NO_ERROR).panic(),
        Err(err) => err,
    };
    if let Err(failure) = Assert::new().try_that(&err, matcher) {
        failure.panic();
    }
    err
}

/// Matcher assertions with configurable reporting
///
/// # Examples
///
/// ```rust
/// use approvalbox::{report::Palette, same_bean_as, Assert};
///
/// let assert = Assert::new().palette(Palette::never());
/// let err = assert
///     .try_that(&vec![1, 2], same_bean_as(vec![1, 3]))
///     .unwrap_err();
/// assert!(err.to_string().starts_with("Expected: [\n  1,\n  3\n]\n     but: differs at $[1]"));
/// ```
#[derive(Clone, Debug)]
pub struct Assert {
    action: Action,
    palette: crate::report::Palette,
}

/// # Assertions
impl Assert {
    pub fn new() -> Self {
        Default::default()
    }

    /// Check `actual`, panicking on failure
    #[track_caller]
    pub fn that<T: ?Sized, M: Matcher<T>>(&self, actual: &T, matcher: M) {
        if let Err(err) = self.try_that(actual, matcher) {
            err.panic();
        }
    }

    /// Check `actual`, prefixing a failure with `reason`
    #[track_caller]
    pub fn that_with_reason<T: ?Sized, M: Matcher<T>>(&self, reason: &str, actual: &T, matcher: M) {
        if let Err(err) = self.check(Some(reason), actual, &matcher) {
            err.panic();
        }
    }

    /// Check `actual`, returning the failure
    pub fn try_that<T: ?Sized, M: Matcher<T>>(&self, actual: &T, matcher: M) -> crate::Result<()> {
        self.check(None, actual, &matcher)
    }

    /// Evaluate `matcher` and turn a mismatch into an [`Error`]
    ///
    /// Configuration and I/O errors from the matcher are passed through as is.
    pub fn check<T: ?Sized, M: Matcher<T> + ?Sized>(
        &self,
        reason: Option<&str>,
        actual: &T,
        matcher: &M,
    ) -> crate::Result<()> {
        if self.action == Action::Skip {
            return Ok(());
        }
        let report = match matcher.check(actual)? {
            Verdict::Match => return Ok(()),
            Verdict::Mismatch(report) => report,
        };
        let err = self.failure(reason, report)?;
        if self.action == Action::Ignore {
            use std::io::Write;

            let _ = writeln!(
                stderr(),
                "{}: {}",
                self.palette.notice("Ignoring failure"),
                err
            );
            return Ok(());
        }
        Err(err)
    }

    fn failure(&self, reason: Option<&str>, report: MismatchReport) -> crate::Result<Error> {
        let message = self
            .render(reason, &report)
            .map_err(|e| Error::new(ErrorKind::Io, e))?;
        let mut err = Error::new(report.kind, message);
        if let (Some(expected), Some(actual)) = (report.expected, report.actual) {
            err = err.with_comparison(expected, actual);
        }
        Ok(err)
    }

    fn render(
        &self,
        reason: Option<&str>,
        report: &MismatchReport,
    ) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut buffer = String::new();
        if let Some(reason) = reason {
            writeln!(buffer, "{reason}")?;
        }
        write!(
            buffer,
            "Expected: {}\n     but: {}",
            report.description, report.mismatch_description
        )?;
        if let (Some(expected), Some(actual)) = (&report.expected, &report.actual) {
            let sides = crate::report::Sides {
                expected: report.expected_name.as_deref(),
                actual: report.actual_name.as_deref(),
            };
            crate::report::write_diff(&mut buffer, expected, actual, sides, self.palette)?;
        }
        Ok(buffer)
    }
}

/// # Customize Behavior
impl Assert {
    /// Override the color palette
    pub fn palette(mut self, palette: crate::report::Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Read the failure action from an environment variable
    ///
    /// Only [`Action::Skip`] and [`Action::Ignore`] change how a mismatch is
    /// reported; approval matchers carry their own action.
    pub fn action_env(mut self, var_name: &str) -> Self {
        let action = Action::with_env_var(var_name);
        self.action = action.unwrap_or(self.action);
        self
    }

    /// Override the failure action
    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }
}

impl Default for Assert {
    fn default() -> Self {
        Self {
            action: Default::default(),
            palette: crate::report::Palette::color(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ends_with;
    use crate::equal_to;
    use crate::report::Palette;

    #[test]
    fn failure_uses_expected_but_layout() {
        let err = Assert::new()
            .palette(Palette::never())
            .try_that(&serde_json::json!("banana"), equal_to("kiwi"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mismatch);
        assert_eq!(err.message(), "Expected: \"kiwi\"\n     but: was \"banana\"");
        assert_eq!(err.expected(), None);
    }

    #[test]
    fn reason_comes_first() {
        let err = Assert::new()
            .palette(Palette::never())
            .check(Some("fruit"), "banana", &ends_with("kiwi"))
            .unwrap_err();
        assert_eq!(
            err.message(),
            "fruit\nExpected: a string ending with \"kiwi\"\n     but: was \"banana\""
        );
    }

    #[test]
    fn comparison_is_carried_and_diffed() {
        let report = MismatchReport::new("same as 'a-approved.txt'", "differs")
            .with_comparison("apple\n", "banana\n");
        let err = Assert::new()
            .palette(Palette::never())
            .failure(None, report)
            .unwrap();
        assert_eq!(err.expected(), Some("apple\n"));
        assert_eq!(err.actual(), Some("banana\n"));
        assert!(err.message().contains("--- Expected"), "{}", err.message());
    }

    #[test]
    fn named_sides_head_the_diff() {
        let report = MismatchReport::new("same as 'a-approved.txt'", "differs")
            .with_comparison("apple\n", "banana\n")
            .with_names("a-approved.txt", "a-not-approved.txt");
        let err = Assert::new()
            .palette(Palette::never())
            .failure(None, report)
            .unwrap();
        let message = err.message();
        assert!(message.contains("\n--- a-approved.txt (expected)\n"), "{message}");
        assert!(message.contains("\n+++ a-not-approved.txt (actual)\n"), "{message}");
    }

    #[test]
    fn skip_and_ignore_pass() {
        let matcher = equal_to(1);
        let actual = serde_json::json!(2);
        assert!(Assert::new().action(Action::Skip).try_that(&actual, &matcher).is_ok());
        assert!(Assert::new()
            .action(Action::Ignore)
            .palette(Palette::never())
            .try_that(&actual, &matcher)
            .is_ok());
        assert!(Assert::new().try_that(&actual, &matcher).is_err());
    }

    #[test]
    fn panics_are_matched() {
        let message = assert_panics(ends_with("boom"), || panic!("big boom"));
        assert_eq!(message, "big boom");

        let message = assert_panics(ends_with("7"), || panic!("code {}", 7));
        assert_eq!(message, "code 7");
    }

    #[test]
    fn missing_panic_is_a_failure() {
        let err = try_assert_panics(ends_with("boom"), || {}).unwrap_err();
        assert_eq!(err.message(), NO_PANIC);
    }

    #[test]
    fn non_message_panic_is_resumed() {
        let outer = std::panic::catch_unwind(|| {
            let _ = try_assert_panics(ends_with("boom"), || std::panic::panic_any(42_u32));
        });
        let payload = outer.unwrap_err();
        assert_eq!(payload.downcast_ref::<u32>(), Some(&42));
    }

    #[test]
    fn errors_are_matched() {
        let err = assert_err(crate::has_message(ends_with("found in string")), || {
            "x".parse::<u8>()
        });
        assert_eq!(err.to_string(), "invalid digit found in string");
    }

    #[test]
    #[should_panic(expected = "Expected error but the operation succeeded!")]
    fn ok_is_a_failure() {
        assert_err(crate::has_message(ends_with("x")), || "1".parse::<u8>());
    }
}
