#[cfg(feature = "color")]
use anstream::panic;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of an [`Error`]
///
/// Approval and match failures are test failures; the remaining kinds point at
/// a broken test setup and are kept apart so they are not mistaken for one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No approved file exists yet, a not-approved file was written
    ApprovalMissing,
    /// The approved file differs from the actual value
    ApprovalMismatch,
    /// A matcher rejected the actual value
    Mismatch,
    /// A field path or type in the matcher configuration does not resolve
    Configuration,
    /// A requested file does not exist
    NotFound,
    /// Reading or writing a file failed
    Io,
    /// The value could not be turned into a tree
    Serialize,
}

impl ErrorKind {
    /// Whether this is a failed expectation rather than a broken setup
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::ApprovalMissing | Self::ApprovalMismatch | Self::Mismatch
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ApprovalMissing => "approval missing",
            Self::ApprovalMismatch => "approval mismatch",
            Self::Mismatch => "mismatch",
            Self::Configuration => "configuration error",
            Self::NotFound => "not found",
            Self::Io => "I/O error",
            Self::Serialize => "serialization error",
        };
        name.fmt(f)
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    inner: String,
    expected: Option<String>,
    actual: Option<String>,
    backtrace: Option<Backtrace>,
}

impl Error {
    pub fn new(kind: ErrorKind, inner: impl std::fmt::Display) -> Self {
        Self::with_string(kind, inner.to_string())
    }

    pub(crate) fn configuration(inner: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Configuration, inner)
    }

    pub(crate) fn io(path: &std::path::Path, action: &str, err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Self::new(kind, format_args!("Failed to {action} {}: {err}", path.display()))
    }

    fn with_string(kind: ErrorKind, inner: String) -> Self {
        Self {
            kind,
            inner,
            expected: None,
            actual: None,
            backtrace: Backtrace::new(),
        }
    }

    /// Attach the textual forms that were compared
    pub fn with_comparison(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.inner
    }

    /// Textual form of the expected value, when the failure compared two renderings
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// Textual form of the actual value, when the failure compared two renderings
    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    #[track_caller]
    pub(crate) fn panic(self) -> ! {
        if self.kind.is_failure() {
            panic!("{self}")
        } else {
            panic!("{}: {self}", self.kind)
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.inner == other.inner
    }
}

impl Eq for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)?;
        if let Some(backtrace) = self.backtrace.as_ref() {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(f, "Backtrace:")?;
            write!(f, "{backtrace}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl serde::ser::Error for Error {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::new(ErrorKind::Serialize, msg)
    }
}

#[cfg(feature = "debug")]
#[derive(Debug, Clone)]
struct Backtrace(backtrace::Backtrace);

#[cfg(feature = "debug")]
impl Backtrace {
    fn new() -> Option<Self> {
        Some(Self(backtrace::Backtrace::new()))
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Display for Backtrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `backtrace::Backtrace` uses `Debug` instead of `Display`
        write!(f, "{:?}", self.0)
    }
}

#[cfg(not(feature = "debug"))]
#[derive(Debug, Copy, Clone)]
struct Backtrace;

#[cfg(not(feature = "debug"))]
impl Backtrace {
    fn new() -> Option<Self> {
        None
    }
}

#[cfg(not(feature = "debug"))]
impl std::fmt::Display for Backtrace {
    fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Ok(())
    }
}
