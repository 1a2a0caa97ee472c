pub const DEFAULT_ACTION_ENV: &str = "APPROVALS";

/// What to do with an approval, see [`SameJsonAsApproved::action`][crate::SameJsonAsApproved::action]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Action {
    /// Do not compare
    Skip,
    /// Report failures on stderr without failing
    Ignore,
    /// Fail on a missing or differing approved file
    #[default]
    Verify,
    /// Write the actual value as the approved file
    Overwrite,
}

impl Action {
    pub fn with_env_var(var: impl AsRef<std::ffi::OsStr>) -> Option<Self> {
        let var = var.as_ref();
        let value = std::env::var_os(var)?;
        Self::with_env_value(value)
    }

    pub fn with_env_value(value: impl AsRef<std::ffi::OsStr>) -> Option<Self> {
        let value = value.as_ref();
        match value.to_str()? {
            "skip" => Some(Action::Skip),
            "ignore" => Some(Action::Ignore),
            "verify" => Some(Action::Verify),
            "overwrite" => Some(Action::Overwrite),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_known_values() {
        assert_eq!(Action::with_env_value("overwrite"), Some(Action::Overwrite));
        assert_eq!(Action::with_env_value("skip"), Some(Action::Skip));
        assert_eq!(Action::with_env_value("Overwrite"), None);
        assert_eq!(Action::with_env_value(""), None);
    }

    #[test]
    fn unset_variable() {
        assert_eq!(
            Action::with_env_var("APPROVALBOX_TEST_SURELY_UNSET_VARIABLE"),
            None
        );
    }

    #[test]
    fn verify_by_default() {
        assert_eq!(Action::default(), Action::Verify);
    }
}
