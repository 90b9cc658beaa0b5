//! Input normalization helpers shared across the pipeline.

use std::sync::LazyLock;

use regex::Regex;

const TAB_WIDTH: usize = 4;

static WHITESPACE_ONLY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+$").expect("whitespace line pattern"));

static LEADING_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\t|[ ]{1,4})").expect("indent pattern"));

/// Expand tabs to spaces at a stop width of four, tracking the running
/// column so expansion stays correct after arbitrary leading text.
pub(crate) fn detab(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut col = 0usize;
    for ch in text.chars() {
        match ch {
            '\n' => {
                out.push('\n');
                col = 0;
            }
            '\t' => {
                let pad = TAB_WIDTH - col % TAB_WIDTH;
                out.extend(std::iter::repeat_n(' ', pad));
                col += pad;
            }
            c => {
                out.push(c);
                col += 1;
            }
        }
    }
    out
}

/// Reduce lines holding only spaces and tabs to truly empty lines, so block
/// rules can match blank-line runs with a plain `\n+`.
pub(crate) fn blank_out_whitespace_lines(text: &str) -> String {
    WHITESPACE_ONLY_LINE.replace_all(text, "").into_owned()
}

/// Remove one level of leading indentation (a tab or up to four spaces)
/// from every line.
pub(crate) fn outdent(text: &str) -> String {
    LEADING_INDENT.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detab_aligns_to_columns() {
        assert_eq!(detab("\tx"), "    x");
        assert_eq!(detab("ab\tx"), "ab  x");
        assert_eq!(detab("abcd\tx"), "abcd    x");
        assert_eq!(detab("a\tb\tc"), "a   b   c");
    }

    #[test]
    fn test_detab_resets_per_line() {
        assert_eq!(detab("ab\n\tx"), "ab\n    x");
    }

    #[test]
    fn test_blank_out_whitespace_lines() {
        assert_eq!(blank_out_whitespace_lines("a\n \t \nb"), "a\n\nb");
    }

    #[test]
    fn test_outdent_strips_one_level() {
        assert_eq!(outdent("    a\n        b"), "a\n    b");
        assert_eq!(outdent("\ta"), "a");
        assert_eq!(outdent("  a"), "a");
    }
}
