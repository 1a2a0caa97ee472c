use std::path::Path;
use std::path::PathBuf;

const APPROVED_DIR: &str = "approved";

/// The test an assertion runs in
///
/// Approved file names and locations are derived from it.  Build one with
/// [`test_identity!`][crate::test_identity] or let the matchers find it with
/// [`TestIdentity::from_current_thread`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestIdentity {
    module_path: String,
    function_name: String,
    source_file: Option<PathBuf>,
}

impl TestIdentity {
    /// `module_path` is relative to the crate root, e.g. `store::test`
    pub fn new(module_path: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            function_name: function_name.into(),
            source_file: None,
        }
    }

    pub fn with_source_file(mut self, source_file: impl Into<PathBuf>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Identify the running test from the harness' thread name
    ///
    /// libtest names each test thread after the test's path, e.g.
    /// `store::test::writes_header`.  Returns `None` when not running inside such
    /// a thread, for example on the main thread with `--test-threads=1`.
    ///
    /// Thread names that are not a path of identifiers, like
    /// `tokio-runtime-worker`, are rejected.  A top-level integration test's
    /// thread carries a bare identifier, so a thread the code under test
    /// spawns with a name like `worker` is taken for a test of that name; pass
    /// [`test_identity!`][crate::test_identity] from such threads.
    pub fn from_current_thread() -> Option<Self> {
        let current = std::thread::current();
        let name = current.name()?;
        Self::from_test_path(name)
    }

    /// Parse a libtest test path like `module::tests::name`
    pub fn from_test_path(test_path: &str) -> Option<Self> {
        if test_path.is_empty() || test_path == "main" {
            return None;
        }
        if !test_path.split("::").all(is_identifier) {
            return None;
        }
        let identity = match test_path.rsplit_once("::") {
            Some((module_path, function_name)) => Self::new(module_path, function_name),
            None => Self::new("", test_path),
        };
        Some(identity)
    }

    /// Extract `N` from a parameterized display name shaped like `[N] ...`
    pub fn unique_index(display_name: &str) -> Option<&str> {
        let rest = display_name.strip_prefix('[')?;
        let end = rest.find(']')?;
        let index = &rest[..end];
        if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
            Some(index)
        } else {
            None
        }
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    /// Full test path, `module::function`
    pub fn test_path(&self) -> String {
        if self.module_path.is_empty() {
            self.function_name.clone()
        } else {
            format!("{}::{}", self.module_path, self.function_name)
        }
    }

    /// Default file base name
    pub fn file_name(&self) -> &str {
        &self.function_name
    }

    /// Default directory for approved files
    ///
    /// The module path maps onto nested directories below `approved/`, next to
    /// the source file when it is known, otherwise in the package's `tests/`.
    pub fn directory(&self) -> PathBuf {
        let mut dir = match self.source_file.as_deref().and_then(Path::parent) {
            Some(parent) => parent.to_owned(),
            None => match std::env::var_os("CARGO_MANIFEST_DIR") {
                Some(manifest_dir) => PathBuf::from(manifest_dir).join("tests"),
                None => PathBuf::from("tests"),
            },
        };
        dir.push(APPROVED_DIR);
        dir.extend(self.module_path.split("::").filter(|s| !s.is_empty()));
        dir
    }
}

impl std::fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.test_path().fmt(f)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}
