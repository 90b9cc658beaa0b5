//! Backtick code spans.

use crate::pipeline::escape::encode_code;

/// Convert backtick-delimited spans to `<code>` elements. The opening
/// and closing delimiter must be runs of the same length, which is what
/// lets a span contain shorter backtick runs verbatim.
pub(crate) fn do_code_spans(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(open) = next_run(text, pos) {
        let (start, len) = open;
        // A backslash right before the run keeps it literal.
        if start > 0 && bytes[start - 1] == b'\\' {
            out.push_str(&text[pos..start + len]);
            pos = start + len;
            continue;
        }
        match find_closer(text, start + len, len) {
            Some(close) => {
                let content = text[start + len..close].trim_matches([' ', '\t']);
                out.push_str(&text[pos..start]);
                out.push_str("<code>");
                out.push_str(&encode_code(content));
                out.push_str("</code>");
                pos = close + len;
            }
            None => {
                out.push_str(&text[pos..start + len]);
                pos = start + len;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Next maximal backtick run at or after `from`.
fn next_run(text: &str, from: usize) -> Option<(usize, usize)> {
    let rel = text[from..].find('`')?;
    let start = from + rel;
    let len = text[start..].bytes().take_while(|b| *b == b'`').count();
    Some((start, len))
}

/// First run of exactly `len` backticks after `from` with at least one
/// character of content before it.
fn find_closer(text: &str, from: usize, len: usize) -> Option<usize> {
    let mut at = from;
    while let Some((start, run)) = next_run(text, at) {
        if run == len && start > from {
            return Some(start);
        }
        at = start + run;
    }
    None
}
