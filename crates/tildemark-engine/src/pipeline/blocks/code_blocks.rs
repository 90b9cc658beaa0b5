//! Indented code blocks.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::escape::encode_code;
use crate::pipeline::preprocess::{detab, outdent};
use crate::pipeline::{Context, html_blocks, whole};

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\n\n|\A)((?:(?:[ ]{4}|\t).*\n+)+)").expect("code block pattern")
});

// The chunk that ends a code block: optional blank lines, then a line
// indented less than four spaces.
static NEXT_CHUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\n*[ ]{0,3}[^ \t\n]").expect("next chunk pattern"));

/// Convert runs of four-space (or tab) indented lines to `<pre><code>`
/// blocks. The indent is stripped, the contents entity-encoded, and the
/// result hashed.
pub(crate) fn do_code_blocks(ctx: &mut Context, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(caps) = CODE_BLOCK.captures_at(text, pos) {
        let m = whole(&caps);
        let block = caps.get(1).map(|g| (g.as_str(), g.end())).unwrap_or(("", m.end()));
        let (block, block_end) = block;

        // Only a run followed by a dedented chunk (or the end of the
        // text) closes here; otherwise keep looking.
        if !text[block_end..].is_empty() && !NEXT_CHUNK.is_match(&text[block_end..]) {
            out.push_str(&text[pos..m.start() + 1]);
            pos = m.start() + 1;
            continue;
        }

        let code = detab(&encode_code(&outdent(block)));
        let code = code.trim_matches('\n');

        out.push_str(&text[pos..m.start()]);
        let hashed = html_blocks::hash_block(ctx, &format!("<pre><code>{code}\n</code></pre>"));
        out.push_str(&hashed);
        pos = block_end;
    }
    out.push_str(&text[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(text: &str) -> (Context, String) {
        let mut ctx = Context::new(8);
        let out = do_code_blocks(&mut ctx, text);
        (ctx, out)
    }

    #[test]
    fn test_indented_block_is_hashed() {
        let (ctx, out) = code("\n\n    let x = 1;\n\nafter\n");
        assert_eq!(ctx.html_blocks, vec!["<pre><code>let x = 1;\n</code></pre>"]);
        assert_eq!(out, "\n\n~K0K\n\nafter\n");
    }

    #[test]
    fn test_contents_are_entity_encoded() {
        let (ctx, _) = code("\n\n    a < b && c\n\n");
        assert_eq!(ctx.html_blocks, vec!["<pre><code>a &lt; b &amp;&amp; c\n</code></pre>"]);
    }

    #[test]
    fn test_blank_lines_inside_block_are_kept() {
        let (ctx, _) = code("\n\n    one\n\n    two\n\n");
        assert_eq!(ctx.html_blocks, vec!["<pre><code>one\n\ntwo\n</code></pre>"]);
    }

    #[test]
    fn test_three_space_indent_is_not_code() {
        let (ctx, out) = code("\n\n   nope\n\n");
        assert!(ctx.html_blocks.is_empty());
        assert_eq!(out, "\n\n   nope\n\n");
    }
}
