//! Emphasis: `**strong**`, `__strong__`, `*em*` and `_em_`.

/// Strong runs first so `**` pairs are consumed before the single-marker
/// pass sees them. A delimiter only opens on a non-space character and
/// only closes after one, so multiplication signs written with spaces
/// survive untouched.
pub(crate) fn do_italics_and_bold(text: &str) -> String {
    let text = replace_spans(text, &["**", "__"], "strong", true);
    replace_spans(&text, &["*", "_"], "em", false)
}

fn replace_spans(text: &str, delims: &[&str], tag: &str, marker_tail: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some((start, delim)) = next_delim(text, pos, delims) {
        let body = start + delim.len();
        let opens = text[body..].chars().next().is_some_and(|c| !c.is_whitespace());
        let close = if opens { find_close(text, body, delim, marker_tail) } else { None };
        match close {
            Some(close) => {
                out.push_str(&text[pos..start]);
                out.push_str(&format!("<{tag}>{}</{tag}>", &text[body..close]));
                pos = close + delim.len();
            }
            None => {
                let step = text[start..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&text[pos..start + step]);
                pos = start + step;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Earliest occurrence of any delimiter at or after `from`.
fn next_delim<'d>(text: &str, from: usize, delims: &'d [&str]) -> Option<(usize, &'d str)> {
    delims
        .iter()
        .filter_map(|d| text[from..].find(d).map(|i| (from + i, *d)))
        .min_by_key(|(i, _)| *i)
}

/// Closing delimiter position: the shortest span ending on a non-space
/// character. With `marker_tail` set, extra marker characters may sit
/// between that character and the closer, which is how `***x***` nests
/// instead of truncating.
fn find_close(text: &str, body: usize, delim: &str, marker_tail: bool) -> Option<usize> {
    for (i, ch) in text[body..].char_indices() {
        if ch.is_whitespace() {
            continue;
        }
        let after = body + i + ch.len_utf8();
        if marker_tail {
            let run = text[after..]
                .bytes()
                .take_while(|b| *b == b'*' || *b == b'_')
                .count();
            for tail in (0..=run).rev() {
                if text[after + tail..].starts_with(delim) {
                    return Some(after + tail);
                }
            }
        } else if text[after..].starts_with(delim) {
            return Some(after);
        }
    }
    None
}
