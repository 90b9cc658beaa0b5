//! Block quotes.

use std::sync::LazyLock;

use regex::Regex;

use crate::ConvertError;
use crate::pipeline::{Context, html_blocks};

use super::run_block_gamut;

static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)((^[ \t]*>[ \t]?.+\n(?:.+\n)*\n*)+)").expect("blockquote pattern")
});

static QUOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("quote marker pattern"));

static BLANK_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+$").expect("blank tail pattern"));

static LINE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^").expect("line start pattern"));

static PRE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s*<pre>[^\r]+?</pre>)").expect("pre span pattern"));

static PRE_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ ]{2}").expect("pre indent pattern"));

/// Convert `>` quoted regions. The quoted text runs through the full
/// block gamut again, then gets indented two spaces, except inside
/// `<pre>` blocks where the indent would change the rendered output.
pub(crate) fn do_blockquotes(ctx: &mut Context, text: &str) -> Result<String, ConvertError> {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(m) = BLOCKQUOTE.find_at(text, pos) {
        let inner = QUOTE_MARKER.replace_all(m.as_str(), "");
        let inner = BLANK_TAIL.replace_all(&inner, "");
        let inner = run_block_gamut(ctx, &inner)?;
        let inner = LINE_START.replace_all(&inner, "  ");
        let inner = PRE_SPAN
            .replace_all(&inner, |caps: &regex::Captures| {
                PRE_INDENT.replace_all(&caps[1], "").into_owned()
            })
            .into_owned();

        out.push_str(&text[pos..m.start()]);
        let hashed = html_blocks::hash_block(ctx, &format!("<blockquote>\n{inner}\n</blockquote>"));
        out.push_str(&hashed);
        pos = m.end();
    }
    out.push_str(&text[pos..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quote(text: &str) -> (Context, String) {
        let mut ctx = Context::new(8);
        let out = do_blockquotes(&mut ctx, text).expect("within depth limit");
        (ctx, out)
    }

    #[test]
    fn test_simple_quote() {
        let (ctx, out) = quote("\n\n> quoted\n\n");
        let key = ctx.html_blocks.len() - 1;
        assert_eq!(ctx.html_blocks[key], "<blockquote>\n  <p>quoted</p>\n</blockquote>");
        assert_eq!(out, format!("\n\n\n\n~K{key}K\n\n"));
    }

    #[test]
    fn test_lazy_continuation_lines_belong_to_quote() {
        let (ctx, _) = quote("\n\n> first\nsecond\n\n");
        let quoted = ctx.html_blocks.last().expect("one block");
        // Both lines sit inside the quote, re-indented two spaces.
        assert_eq!(quoted, "<blockquote>\n  <p>first\n  second</p>\n</blockquote>");
    }

    #[test]
    fn test_pre_inside_quote_is_not_indented() {
        let (ctx, _) = quote("\n\n> text\n>\n>     code line\n\n");
        let quoted = ctx.html_blocks.last().expect("outer block");
        assert!(
            quoted.contains("<pre><code>code line\n</code></pre>"),
            "got {quoted:?}"
        );
    }
}
