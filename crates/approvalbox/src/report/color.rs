/// Styles for failure reports
///
/// The expected side of a diff is green and the actual side red, with the
/// changed parts of a line underlined.
#[derive(Copy, Clone, Debug, Default)]
pub struct Palette {
    pub(crate) expected: anstyle::Style,
    pub(crate) expected_change: anstyle::Style,
    pub(crate) actual: anstyle::Style,
    pub(crate) actual_change: anstyle::Style,
    pub(crate) context: anstyle::Style,
    pub(crate) notice: anstyle::Style,
}

impl Palette {
    /// Colored when built with `color-auto` and stderr supports it
    pub fn color() -> Self {
        if cfg!(feature = "color-auto") && stderr_is_colored() {
            Self::always()
        } else {
            Self::never()
        }
    }

    pub fn always() -> Self {
        if !cfg!(feature = "color") {
            return Self::never();
        }
        let expected = anstyle::AnsiColor::Green.on_default();
        let actual = anstyle::AnsiColor::Red.on_default();
        Self {
            expected,
            expected_change: expected | anstyle::Effects::UNDERLINE,
            actual,
            actual_change: actual | anstyle::Effects::UNDERLINE,
            context: anstyle::Effects::DIMMED.into(),
            notice: anstyle::AnsiColor::Yellow.on_default(),
        }
    }

    pub fn never() -> Self {
        Self::default()
    }

    /// Approved or expected content
    pub fn expected<D: std::fmt::Display>(self, item: D) -> Styled<D> {
        Styled::new(item, self.expected)
    }

    /// Content under test
    pub fn actual<D: std::fmt::Display>(self, item: D) -> Styled<D> {
        Styled::new(item, self.actual)
    }

    /// Unchanged lines and line numbers
    pub fn context<D: std::fmt::Display>(self, item: D) -> Styled<D> {
        Styled::new(item, self.context)
    }

    /// Labels of messages that do not fail the test
    pub fn notice<D: std::fmt::Display>(self, item: D) -> Styled<D> {
        Styled::new(item, self.notice)
    }
}

fn stderr_is_colored() -> bool {
    #[cfg(feature = "color")]
    {
        anstream::AutoStream::choice(&std::io::stderr()) != anstream::ColorChoice::Never
    }
    #[cfg(not(feature = "color"))]
    {
        false
    }
}

/// A value rendered within a style's escape codes
#[derive(Debug)]
pub struct Styled<D> {
    display: D,
    style: anstyle::Style,
}

impl<D: std::fmt::Display> Styled<D> {
    pub(crate) fn new(display: D, style: anstyle::Style) -> Self {
        Self { display, style }
    }
}

impl<D: std::fmt::Display> std::fmt::Display for Styled<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.style.render())?;
        self.display.fmt(f)?;
        write!(f, "{}", self.style.render_reset())
    }
}
