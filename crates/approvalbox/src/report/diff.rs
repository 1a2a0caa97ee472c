use std::fmt::Write;

use crate::report::Palette;
#[cfg(feature = "diff")]
use crate::report::Styled;

/// Names of the two sides of a comparison, e.g. the approved and the not
/// approved file
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sides<'a> {
    pub expected: Option<&'a str>,
    pub actual: Option<&'a str>,
}

impl<'a> Sides<'a> {
    pub fn named(expected: &'a str, actual: &'a str) -> Self {
        Self {
            expected: Some(expected),
            actual: Some(actual),
        }
    }

    fn expected_label(&self) -> String {
        label(self.expected, "expected", "Expected")
    }

    fn actual_label(&self) -> String {
        label(self.actual, "actual", "Actual")
    }
}

fn label(name: Option<&str>, side: &str, unnamed: &str) -> String {
    match name {
        Some(name) => format!("{name} ({side})"),
        None => unnamed.to_owned(),
    }
}

/// Append the difference between two renderings to a failure message
///
/// With the `diff` feature this is a numbered line diff, otherwise both sides
/// are printed in full.
pub fn write_diff(
    writer: &mut dyn Write,
    expected: &str,
    actual: &str,
    sides: Sides<'_>,
    palette: Palette,
) -> std::fmt::Result {
    writeln!(writer)?;
    #[cfg(feature = "diff")]
    {
        writeln!(writer, "{}", palette.expected(format_args!("--- {}", sides.expected_label())))?;
        writeln!(writer, "{}", palette.actual(format_args!("+++ {}", sides.actual_label())))?;
        write_lines(writer, expected, actual, palette)
    }
    #[cfg(not(feature = "diff"))]
    {
        writeln!(writer, "{}:", palette.expected(sides.expected_label()))?;
        writeln!(writer, "{}", palette.expected(expected))?;
        writeln!(writer, "{}:", palette.actual(sides.actual_label()))?;
        writeln!(writer, "{}", palette.actual(actual))
    }
}

#[cfg(feature = "diff")]
fn write_lines(
    writer: &mut dyn Write,
    expected: &str,
    actual: &str,
    palette: Palette,
) -> std::fmt::Result {
    let lines = similar::TextDiff::configure()
        .algorithm(similar::Algorithm::Patience)
        .timeout(std::time::Duration::from_millis(500))
        .newline_terminated(false)
        .diff_lines(expected, actual);

    for op in lines.ops() {
        for line in lines.iter_inline_changes(op) {
            let (sign, style, change_style) = match line.tag() {
                similar::ChangeTag::Delete => ('-', palette.expected, palette.expected_change),
                similar::ChangeTag::Insert => ('+', palette.actual, palette.actual_change),
                similar::ChangeTag::Equal => ('|', palette.context, palette.context),
            };
            write_line_number(writer, line.old_index(), palette)?;
            write_line_number(writer, line.new_index(), palette)?;
            write!(writer, "{} ", Styled::new(sign, style))?;
            for &(changed, text) in line.values() {
                let style = if changed { change_style } else { style };
                write!(writer, "{}", Styled::new(text, style))?;
            }
            if line.missing_newline() {
                // Marks a last line without its newline
                writeln!(writer, "{}", Styled::new('∅', change_style))?;
            }
        }
    }
    Ok(())
}

#[cfg(feature = "diff")]
fn write_line_number(
    writer: &mut dyn Write,
    index: Option<usize>,
    palette: Palette,
) -> std::fmt::Result {
    match index {
        Some(index) => write!(writer, "{:>4} ", palette.context(index + 1)),
        None => writer.write_str("     "),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn diff(expected: &str, actual: &str, sides: Sides<'_>) -> String {
        let mut rendered = String::new();
        write_diff(&mut rendered, expected, actual, sides, Palette::never()).unwrap();
        rendered
    }

    #[cfg(feature = "diff")]
    #[test]
    fn equal_files_number_every_line() {
        let rendered = diff(
            "{\n  \"a\": 1\n}\n",
            "{\n  \"a\": 1\n}\n",
            Sides::named("render-approved.json", "render-not-approved.json"),
        );
        assert_eq!(
            rendered,
            "
--- render-approved.json (expected)
+++ render-not-approved.json (actual)
   1    1 | {
   2    2 |   \"a\": 1
   3    3 | }
"
        );
    }

    #[cfg(feature = "diff")]
    #[test]
    fn changed_field_shows_both_lines() {
        let rendered = diff(
            "{\n  \"name\": \"apple\"\n}\n",
            "{\n  \"name\": \"banana\"\n}\n",
            Sides::default(),
        );
        assert_eq!(
            rendered,
            "
--- Expected
+++ Actual
   1    1 | {
   2      -   \"name\": \"apple\"
        2 +   \"name\": \"banana\"
   3    3 | }
"
        );
    }

    #[cfg(feature = "diff")]
    #[test]
    fn missing_line() {
        let rendered = diff("Hello\nWorld\n", "Hello\n", Sides::named("A", "B"));
        assert_eq!(
            rendered,
            "
--- A (expected)
+++ B (actual)
   1    1 | Hello
   2      - World
"
        );
    }

    #[cfg(feature = "diff")]
    #[test]
    fn missing_final_newline_is_marked() {
        let rendered = diff("Hello\nWorld\n", "Hello\nWorld", Sides::named("A", "B"));
        assert_eq!(
            rendered,
            "
--- A (expected)
+++ B (actual)
   1    1 | Hello
   2      - World
        2 + World∅
"
        );
    }

    #[cfg(not(feature = "diff"))]
    #[test]
    fn both_sides_without_diff() {
        assert_eq!(diff("a", "b", Sides::default()), "\nExpected:\na\nActual:\nb\n");
        assert_eq!(
            diff("a", "b", Sides::named("A", "B")),
            "\nA (expected):\na\nB (actual):\nb\n"
        );
    }
}
