//! Comparing values against approved files
//!
//! On the first run there is nothing to compare against: the actual value is
//! written to a `-not-approved` file and the assertion fails.  Once a developer
//! has reviewed that file and renamed it to `-approved`, later runs compare
//! against it, rewriting the `-not-approved` file whenever they differ.

use std::path::PathBuf;

#[cfg(feature = "color")]
use anstream::stderr;
#[cfg(not(feature = "color"))]
use std::io::stderr;

use serde::Serialize;
use serde_json::Value;

use crate::store::ApprovalFiles;
use crate::store::FileKind;
use crate::store::SEPARATOR;
use crate::tree::first_difference;
use crate::tree::remove_path;
use crate::tree::type_name_of;
use crate::tree::Rules;
use crate::utils::text_eq;
use crate::Action;
use crate::Error;
use crate::ErrorKind;
use crate::Matcher;
use crate::MismatchReport;
use crate::TestIdentity;
use crate::Verdict;

const JSON_EXTENSION: &str = ".json";
const CONTENT_EXTENSION: &str = ".txt";

/// Compare the JSON rendering of a value against its approved file
///
/// ```rust,no_run
/// use approvalbox::{assert_that, same_json_as_approved, test_identity};
///
/// #[derive(serde::Serialize)]
/// struct Order { id: u32, items: Vec<String> }
///
/// #[test]
/// fn renders_order() {
///     let order = Order { id: 7, items: vec!["apple".into()] };
///     assert_that(&order, same_json_as_approved().identity(test_identity!()));
/// }
/// ```
pub fn same_json_as_approved() -> SameJsonAsApproved {
    Approval::new(Json {
        rules: Rules::new(),
    })
}

/// Compare text against its approved file, as is
pub fn same_content_as_approved() -> SameContentAsApproved {
    Approval::new(Content {
        extension: CONTENT_EXTENSION.to_owned(),
    })
}

/// See [`same_json_as_approved`]
pub type SameJsonAsApproved = Approval<Json>;

/// See [`same_content_as_approved`]
pub type SameContentAsApproved = Approval<Content>;

/// Approved file comparison, see [`same_json_as_approved`] and [`same_content_as_approved`]
#[derive(Clone, Debug)]
pub struct Approval<F> {
    format: F,
    identity: Option<TestIdentity>,
    path: Option<PathBuf>,
    file_name: Option<String>,
    unique_id: Option<String>,
    comment: Option<String>,
    action: Action,
    action_var: Option<String>,
}

/// Rendering of [`SameJsonAsApproved`]
#[derive(Clone, Debug)]
pub struct Json {
    rules: Rules,
}

/// Rendering of [`SameContentAsApproved`]
#[derive(Clone, Debug)]
pub struct Content {
    extension: String,
}

impl<F> Approval<F> {
    fn new(format: F) -> Self {
        Self {
            format,
            identity: None,
            path: None,
            file_name: None,
            unique_id: None,
            comment: None,
            action: Action::default(),
            action_var: None,
        }
        .action_env(crate::DEFAULT_ACTION_ENV)
    }
}

/// # Customize Behavior
impl<F> Approval<F> {
    /// The test this assertion belongs to, see [`test_identity!`][crate::test_identity]
    ///
    /// Without it, the test is looked up from the running thread.
    pub fn identity(mut self, identity: TestIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Directory holding the approved files
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Base name of the approved files, instead of the test function's name
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Suffix the base name, e.g. with a case index in parameterized tests
    ///
    /// See [`TestIdentity::unique_index`].
    pub fn with_unique_id(mut self, id: impl std::fmt::Display) -> Self {
        self.unique_id = Some(id.to_string());
        self
    }

    /// Header comment for written files, instead of the test path
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Read the action from an environment variable
    pub fn action_env(mut self, var_name: &str) -> Self {
        let action = Action::with_env_var(var_name);
        self.action = action.unwrap_or(self.action);
        self.action_var = Some(var_name.to_owned());
        self
    }

    /// Override the action
    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self.action_var = None;
        self
    }

    fn files(&self, extension: &str) -> crate::Result<(ApprovalFiles, Option<String>)> {
        let identity = match &self.identity {
            Some(identity) => Some(identity.clone()),
            None => TestIdentity::from_current_thread(),
        };
        let directory = match (&self.path, &identity) {
            (Some(path), _) => path.clone(),
            (None, Some(identity)) => identity.directory(),
            (None, None) => return Err(unknown_test()),
        };
        let mut name = match (&self.file_name, &identity) {
            (Some(name), _) => name.clone(),
            (None, Some(identity)) => identity.file_name().to_owned(),
            (None, None) => return Err(unknown_test()),
        };
        if let Some(id) = &self.unique_id {
            name.push_str(SEPARATOR);
            name.push_str(id);
        }
        let header = self
            .comment
            .clone()
            .or_else(|| identity.as_ref().map(TestIdentity::test_path));
        Ok((ApprovalFiles::new(directory.join(name), extension), header))
    }

    /// Run the approval state machine over a rendered value
    ///
    /// `differs` compares the approved file's content with `actual`, returning
    /// what differs or `None` when they agree.
    fn approve(
        &self,
        extension: &str,
        actual: &str,
        differs: &dyn Fn(&str) -> Option<String>,
    ) -> crate::Result<Verdict> {
        if self.action == Action::Skip {
            return Ok(Verdict::Match);
        }

        let (files, header) = self.files(extension)?;
        let approved_name = files.file_name(FileKind::Approved);
        let description = format!("same as '{approved_name}'");

        if self.action == Action::Overwrite {
            files.write(FileKind::Approved, actual, header.as_deref())?;
            if files.remove(FileKind::NotApproved)? {
                crate::debug!("Removed stale {}", files.file_name(FileKind::NotApproved));
            }
            self.notify("Overwrote", &approved_name);
            return Ok(Verdict::Match);
        }

        if !files.exists(FileKind::Approved) {
            let not_approved_name = files.write(FileKind::NotApproved, actual, header.as_deref())?;
            let report = MismatchReport::new(
                description,
                format!(
                    "Not approved file created: '{not_approved_name}'; \
                     please verify its contents and rename it to '{approved_name}'."
                ),
            )
            .with_kind(ErrorKind::ApprovalMissing);
            return Ok(self.fail(report));
        }

        let approved = files.read(FileKind::Approved)?;
        let Some(difference) = differs(&approved) else {
            crate::debug!("{} is approved", approved_name);
            return Ok(Verdict::Match);
        };

        let not_approved_name = files.write(FileKind::NotApproved, actual, header.as_deref())?;
        let report = MismatchReport::new(
            description,
            format!("{difference}; not approved file written: '{not_approved_name}'"),
        )
        .with_kind(ErrorKind::ApprovalMismatch)
        .with_comparison(approved, actual)
        .with_names(approved_name, not_approved_name);
        Ok(self.fail(report))
    }

    fn fail(&self, mut report: MismatchReport) -> Verdict {
        if self.action == Action::Ignore {
            self.notify("Ignoring failure", &report.mismatch_description);
            return Verdict::Match;
        }
        if let Some(action_var) = self.action_var.as_deref() {
            report
                .mismatch_description
                .push_str(&format!("\nUpdate with {action_var}=overwrite"));
        }
        Verdict::Mismatch(report)
    }

    fn notify(&self, label: &str, message: &str) {
        use std::io::Write;

        let palette = crate::report::Palette::color();
        let _ = writeln!(stderr(), "{}: {}", palette.notice(label), message);
    }
}

fn unknown_test() -> Error {
    Error::configuration(
        "unable to determine the running test; \
         pass `test_identity!()` to `identity` or set both `with_path` and `with_file_name`",
    )
}

/// # JSON Rendering
impl Approval<Json> {
    /// Leave out the field at a dotted path, e.g. `"order.createdAt"`
    pub fn ignoring(mut self, field_path: impl Into<String>) -> Self {
        self.format.rules.ignore_path(field_path);
        self
    }

    /// Leave out every field of the named type (its serde name)
    pub fn ignoring_type(mut self, type_name: impl Into<String>) -> Self {
        self.format.rules.ignore_type(type_name);
        self
    }

    /// Leave out every field of type `T`
    pub fn ignoring_type_of<T: ?Sized>(self) -> Self {
        self.ignoring_type(type_name_of::<T>())
    }

    /// Render repeated visits of the named type as `{"$ref": ...}`
    pub fn circular_reference(mut self, type_name: impl Into<String>) -> Self {
        self.format.rules.circular_type(type_name);
        self
    }

    /// See [`Approval::circular_reference`]
    pub fn circular_reference_of<T: ?Sized>(self) -> Self {
        self.circular_reference(type_name_of::<T>())
    }

    /// JSON an approved file should contain for `value`
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> crate::Result<String> {
        Ok(self.format.rules.build(value)?.to_pretty())
    }

    fn differs(&self, approved: &str, actual: &Value) -> Option<String> {
        match serde_json::from_str::<Value>(approved) {
            Ok(mut approved) => {
                for path in self.format.rules.ignored_paths() {
                    remove_path(&mut approved, path);
                }
                first_difference(&approved, actual).map(|path| format!("differs at {path}"))
            }
            Err(_err) => {
                crate::debug!("Comparing as text, approved file is not JSON: {}", _err);
                let actual = crate::tree::to_pretty(actual);
                (!text_eq(approved, &actual)).then(|| "differs".to_owned())
            }
        }
    }
}

impl<T: Serialize + ?Sized> Matcher<T> for Approval<Json> {
    fn description(&self) -> String {
        "same JSON as approved".to_owned()
    }

    fn check(&self, actual: &T) -> crate::Result<Verdict> {
        if self.action == Action::Skip {
            return Ok(Verdict::Match);
        }
        let tree = self.format.rules.build(actual)?;
        self.format.rules.validate(&[&tree], None)?;
        let rendered = tree.to_pretty();
        let actual = tree.value();
        self.approve(JSON_EXTENSION, &rendered, &|approved| {
            self.differs(approved, actual)
        })
    }
}

/// # Content Rendering
impl Approval<Content> {
    /// File extension including the leading `.`, `.txt` by default
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.format.extension = extension.into();
        self
    }
}

impl<T: AsRef<str> + ?Sized> Matcher<T> for Approval<Content> {
    fn description(&self) -> String {
        "same content as approved".to_owned()
    }

    fn check(&self, actual: &T) -> crate::Result<Verdict> {
        let actual = actual.as_ref();
        self.approve(&self.format.extension, actual, &|approved| {
            (!text_eq(approved, actual)).then(|| "differs".to_owned())
        })
    }
}
