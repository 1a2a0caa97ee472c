use serde::Serialize;
use serde_json::Value;

use crate::matcher::describe_value;
use crate::tree::first_difference;
use crate::tree::is_scalar;
use crate::tree::remove_path;
use crate::tree::to_pretty;
use crate::tree::type_name_of;
use crate::tree::Rules;
use crate::Matcher;
use crate::MismatchReport;
use crate::Verdict;

/// Deep comparison against an expected value
///
/// Both sides are serialized into trees and compared field by field.
/// Scalars (strings, numbers, booleans, unit enum variants) compare by value.
///
/// ```rust
/// use approvalbox::{assert_that, equal_to, same_bean_as};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32, label: String }
///
/// let expected = Point { x: 1, y: 2, label: "a".into() };
/// let actual = Point { x: 1, y: 3, label: "a".into() };
/// assert_that(&actual, same_bean_as(&expected).ignoring("y").with("label", equal_to("a")));
/// ```
pub fn same_bean_as<E: Serialize>(expected: E) -> SameBeanAs<E> {
    SameBeanAs {
        expected,
        rules: Rules::new(),
        overrides: Vec::new(),
    }
}

/// See [`same_bean_as`]
pub struct SameBeanAs<E> {
    expected: E,
    rules: Rules,
    overrides: Vec<(String, Box<dyn Matcher<Value>>)>,
}

/// # Customize Behavior
impl<E> SameBeanAs<E> {
    /// Skip the field at a dotted path, e.g. `"beanField.subBeanField"`
    pub fn ignoring(mut self, field_path: impl Into<String>) -> Self {
        self.rules.ignore_path(field_path);
        self
    }

    /// Skip every field of the named type (its serde name)
    pub fn ignoring_type(mut self, type_name: impl Into<String>) -> Self {
        self.rules.ignore_type(type_name);
        self
    }

    /// Skip every field of type `T`
    pub fn ignoring_type_of<T: ?Sized>(self) -> Self {
        self.ignoring_type(type_name_of::<T>())
    }

    /// Check the field at a dotted path with `matcher` instead of the expected value
    pub fn with(mut self, field_path: impl Into<String>, matcher: impl Matcher<Value> + 'static) -> Self {
        self.overrides.push((field_path.into(), Box::new(matcher)));
        self
    }

    /// Tolerate instances of the named type that (indirectly) contain themselves
    pub fn circular_reference(mut self, type_name: impl Into<String>) -> Self {
        self.rules.circular_type(type_name);
        self
    }

    /// See [`SameBeanAs::circular_reference`]
    pub fn circular_reference_of<T: ?Sized>(self) -> Self {
        self.circular_reference(type_name_of::<T>())
    }

    fn overrides_description(&self) -> String {
        let mut description = String::new();
        for (path, matcher) in &self.overrides {
            description.push_str("\nand ");
            description.push_str(path);
            description.push(' ');
            description.push_str(&Matcher::<Value>::description(matcher));
        }
        description
    }
}

impl<E: Serialize, A: Serialize + ?Sized> Matcher<A> for SameBeanAs<E> {
    fn description(&self) -> String {
        let expected = match self.rules.build(&self.expected) {
            Ok(tree) => tree.to_pretty(),
            Err(err) => format!("<{err}>"),
        };
        format!("{expected}{}", self.overrides_description())
    }

    fn check(&self, actual: &A) -> crate::Result<Verdict> {
        let expected = self.rules.build(&self.expected)?;
        let actual = self.rules.build(actual)?;

        let overridden = self.overrides.iter().map(|(path, _)| path.as_str());
        self.rules.validate(&[&actual, &expected], overridden)?;

        let mut expected = expected.into_value();
        let mut actual = actual.into_value();

        let mut mismatches = Vec::new();
        for (path, matcher) in &self.overrides {
            remove_path(&mut expected, path);
            let field = remove_path(&mut actual, path).unwrap_or(Value::Null);
            if let Verdict::Mismatch(report) = matcher.check(&field)? {
                crate::debug!("{} failed {}", path, report.description);
                let mut line = if field.is_null() {
                    format!("{path} was null")
                } else {
                    format!("{path} {}", report.mismatch_description)
                };
                if !is_scalar(&field) {
                    line.push('\n');
                    line.push_str(&to_pretty(&field));
                }
                mismatches.push(line);
            }
        }

        let difference = first_difference(&expected, &actual);
        if difference.is_none() && mismatches.is_empty() {
            return Ok(Verdict::Match);
        }

        if is_scalar(&expected) && is_scalar(&actual) && self.overrides.is_empty() {
            return Ok(Verdict::Mismatch(MismatchReport::new(
                describe_value(&expected),
                format!("was {}", describe_value(&actual)),
            )));
        }

        let expected_rendered = to_pretty(&expected);
        let description = format!("{expected_rendered}{}", self.overrides_description());
        let report = match difference {
            Some(path) => {
                mismatches.insert(0, format!("differs at {path}"));
                MismatchReport::new(description, mismatches.join("\n"))
                    .with_comparison(expected_rendered, to_pretty(&actual))
            }
            None => MismatchReport::new(description, mismatches.join("\n")),
        };
        Ok(Verdict::Mismatch(report))
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for SameBeanAs<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let paths: Vec<_> = self.overrides.iter().map(|(path, _)| path).collect();
        f.debug_struct("SameBeanAs")
            .field("expected", &self.expected)
            .field("rules", &self.rules)
            .field("overrides", &paths)
            .finish()
    }
}
