//! Span-level transforms, applied to header text, list items and
//! paragraph bodies.

pub(crate) mod autolinks;
pub(crate) mod code_spans;
pub(crate) mod emphasis;
pub(crate) mod links;

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Context;
use super::escape::{self, TAG_ESCAPES, escape_chars};

// A complete inline tag (or comment), attributes included.
static TAG_OR_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<[a-z/!$](?:"[^"]*"|'[^']*'|[^'">])*>|<!(?:--.*?--\s*)+>"#)
        .expect("inline tag pattern")
});

static CODE_TAG_JOIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)</?code>").expect("code tag join pattern"));

static BACKSLASH_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\\").expect("backslash pair pattern"));

static BACKSLASH_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\([`*_{}\[\]()>#+\-.!])").expect("backslash escape pattern")
});

static HARD_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ]{2,}\n").expect("hard break pattern"));

/// Run every span-level rule over one chunk of text, in order. Code spans
/// go first so nothing rewrites their contents; emphasis goes last so it
/// cannot see characters that became part of tags or entities.
pub(crate) fn run_span_gamut(ctx: &Context, text: &str) -> String {
    let text = code_spans::do_code_spans(text);
    let text = escape_inside_tags(&text);
    let text = encode_backslash_escapes(&text);
    let text = links::do_images(ctx, &text);
    let text = links::do_anchors(ctx, &text);
    let text = autolinks::do_auto_links(&text);
    let text = escape::encode_amps_and_angles(&text);
    let text = emphasis::do_italics_and_bold(&text);
    HARD_BREAK.replace_all(&text, " <br />\n").into_owned()
}

/// Hide markup-significant characters inside raw inline tags so later
/// span rules leave tag attributes alone. Adjacent `<code>` boundaries
/// with text on both sides collapse back to a literal backtick first.
fn escape_inside_tags(text: &str) -> String {
    TAG_OR_COMMENT
        .replace_all(text, |caps: &Captures| {
            let tag = collapse_code_tags(&caps[0]);
            escape_chars(&tag, &TAG_ESCAPES)
        })
        .into_owned()
}

fn collapse_code_tags(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut pos = 0;
    while let Some(caps) = CODE_TAG_JOIN.captures_at(tag, pos) {
        let m = super::whole(&caps);
        // Only between two characters on the same line.
        let followed = tag[m.end()..].chars().next().is_some_and(|c| c != '\n');
        if !followed {
            let step = caps[1].len();
            out.push_str(&tag[pos..m.start() + step]);
            pos = m.start() + step;
            continue;
        }
        out.push_str(&tag[pos..m.start()]);
        out.push_str(&caps[1]);
        out.push('`');
        pos = m.end();
    }
    out.push_str(&tag[pos..]);
    out
}

/// Turn backslash escapes into character tokens so the escaped character
/// survives every later rule untouched.
fn encode_backslash_escapes(text: &str) -> String {
    let text = BACKSLASH_PAIR.replace_all(text, "~E92E");
    BACKSLASH_ESCAPE
        .replace_all(&text, |caps: &Captures| {
            let ch = caps[1].chars().next().expect("one captured character");
            format!("~E{}E", ch as u32)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gamut(text: &str) -> String {
        let ctx = Context::new(8);
        run_span_gamut(&ctx, text)
    }

    #[test]
    fn test_underscores_in_tag_attributes_survive() {
        let out = gamut("<a href=\"/my_page\">x</a>");
        assert!(out.contains("~E95E"), "got {out:?}");
        assert_eq!(escape::unescape_special_chars(&out), "<a href=\"/my_page\">x</a>");
    }

    #[test]
    fn test_escaped_star_is_not_emphasis() {
        let out = gamut(r"\*literal\*");
        assert_eq!(escape::unescape_special_chars(&out), "*literal*");
    }

    #[test]
    fn test_double_backslash_collapses() {
        let out = gamut(r"a \\ b");
        assert_eq!(escape::unescape_special_chars(&out), r"a \ b");
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(gamut("one  \ntwo"), "one <br />\ntwo");
    }
}
