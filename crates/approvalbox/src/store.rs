use std::path::Path;
use std::path::PathBuf;

use crate::Error;

pub const SEPARATOR: &str = "-";
const APPROVED_NAME_PART: &str = "approved";
const NOT_APPROVED_NAME_PART: &str = "not-approved";
const HEADER_START: &str = "/*";
const HEADER_END: &str = "*/\n";

/// Which file of an [`ApprovalFiles`] pair
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// Reviewed reference, checked into source control
    Approved,
    /// Latest actual output, waiting for review
    NotApproved,
}

impl FileKind {
    fn name_part(self) -> &'static str {
        match self {
            Self::Approved => APPROVED_NAME_PART,
            Self::NotApproved => NOT_APPROVED_NAME_PART,
        }
    }
}

/// The approved / not-approved files for one logical test
///
/// Files are named `<base>-approved<extension>` and
/// `<base>-not-approved<extension>`.  There is no locking: tests running in
/// parallel must use distinct base names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalFiles {
    base: PathBuf,
    extension: String,
}

impl ApprovalFiles {
    /// `extension` includes the leading `.`, e.g. `.json`
    pub fn new(base: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extension: extension.into(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn path(&self, kind: FileKind) -> PathBuf {
        let mut name = self.base.as_os_str().to_owned();
        name.push(SEPARATOR);
        name.push(kind.name_part());
        name.push(&self.extension);
        PathBuf::from(name)
    }

    pub fn file_name(&self, kind: FileKind) -> String {
        let path = self.path(kind);
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    pub fn exists(&self, kind: FileKind) -> bool {
        self.path(kind).is_file()
    }

    /// Replace the file with `content`, preceded by a `/*header*/` line
    ///
    /// Returns the written file's name.
    pub fn write(
        &self,
        kind: FileKind,
        content: &str,
        header: Option<&str>,
    ) -> crate::Result<String> {
        let path = self.path(kind);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::io(parent, "create directory", e))?;
                grant_owner(parent, 0o700)?;
            }
        }

        let mut buffer = String::with_capacity(content.len() + 64);
        if let Some(header) = header {
            buffer.push_str(HEADER_START);
            buffer.push_str(header);
            buffer.push_str(HEADER_END);
        }
        buffer.push_str(content);
        std::fs::write(&path, buffer).map_err(|e| Error::io(&path, "write", e))?;
        grant_owner(&path, 0o600)?;

        crate::debug!("Wrote {}", path.display());
        Ok(self.file_name(kind))
    }

    /// Read the file, without its leading comment block
    pub fn read(&self, kind: FileKind) -> crate::Result<String> {
        let path = self.path(kind);
        let raw = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, "read", e))?;
        let raw = crate::utils::normalize_lines(&raw);
        Ok(strip_header(&raw).to_owned())
    }

    /// Delete the file, if present
    pub fn remove(&self, kind: FileKind) -> crate::Result<bool> {
        let path = self.path(kind);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(&path, "remove", e)),
        }
    }
}

fn strip_header(content: &str) -> &str {
    if content.starts_with(HEADER_START) {
        if let Some(index) = content.find(HEADER_END) {
            return &content[index + HEADER_END.len()..];
        }
    }
    content
}

#[cfg(unix)]
fn grant_owner(path: &Path, mode: u32) -> crate::Result<()> {
    use std::os::unix::fs::PermissionsExt as _;

    let metadata = std::fs::metadata(path).map_err(|e| Error::io(path, "inspect", e))?;
    let mut permissions = metadata.permissions();
    let current = permissions.mode();
    if current & mode != mode {
        permissions.set_mode(current | mode);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| Error::io(path, "set permissions on", e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn grant_owner(path: &Path, _mode: u32) -> crate::Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::io(path, "inspect", e))?;
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| Error::io(path, "set permissions on", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ErrorKind;

    fn files(dir: &tempfile::TempDir) -> ApprovalFiles {
        ApprovalFiles::new(dir.path().join("nested/dir/render"), ".json")
    }

    #[test]
    fn names_follow_convention() {
        let files = ApprovalFiles::new("tests/approved/render", ".json");
        assert_eq!(
            files.path(FileKind::Approved),
            PathBuf::from("tests/approved/render-approved.json")
        );
        assert_eq!(
            files.path(FileKind::NotApproved),
            PathBuf::from("tests/approved/render-not-approved.json")
        );
        assert_eq!(files.file_name(FileKind::NotApproved), "render-not-approved.json");
    }

    #[test]
    fn write_creates_parents_and_returns_name() {
        let dir = tempfile::tempdir().unwrap();
        let files = files(&dir);
        let name = files
            .write(FileKind::NotApproved, "{}", Some("render::test"))
            .unwrap();
        assert_eq!(name, "render-not-approved.json");
        let raw = std::fs::read_to_string(files.path(FileKind::NotApproved)).unwrap();
        assert_eq!(raw, "/*render::test*/\n{}");
    }

    #[test]
    fn read_strips_header() {
        let dir = tempfile::tempdir().unwrap();
        let files = files(&dir);
        files
            .write(FileKind::Approved, "line1\nline2", Some("header"))
            .unwrap();
        assert_eq!(files.read(FileKind::Approved).unwrap(), "line1\nline2");
    }

    #[test]
    fn read_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let files = files(&dir);
        files.write(FileKind::Approved, "/* not closed", None).unwrap();
        assert_eq!(files.read(FileKind::Approved).unwrap(), "/* not closed");
    }

    #[test]
    fn read_normalizes_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let files = files(&dir);
        files
            .write(FileKind::Approved, "a\r\nb\r\n", Some("header"))
            .unwrap();
        assert_eq!(files.read(FileKind::Approved).unwrap(), "a\nb\n");
    }

    #[test]
    fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let files = files(&dir);
        files
            .write(FileKind::NotApproved, "a much longer first version", None)
            .unwrap();
        files.write(FileKind::NotApproved, "short", None).unwrap();
        assert_eq!(files.read(FileKind::NotApproved).unwrap(), "short");
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = files(&dir).read(FileKind::Approved).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let files = files(&dir);
        files.write(FileKind::NotApproved, "x", None).unwrap();
        assert!(files.exists(FileKind::NotApproved));
        assert!(files.remove(FileKind::NotApproved).unwrap());
        assert!(!files.remove(FileKind::NotApproved).unwrap());
        assert!(!files.exists(FileKind::NotApproved));
    }
}
