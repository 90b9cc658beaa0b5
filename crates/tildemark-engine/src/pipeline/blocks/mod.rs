//! Block-level transforms: headers, rules, lists, code blocks, block
//! quotes and paragraph wrapping, applied in a fixed order.

pub(crate) mod blockquotes;
pub(crate) mod code_blocks;
pub(crate) mod headers;
pub(crate) mod lists;
pub(crate) mod paragraphs;

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use super::{Context, html_blocks};
use crate::ConvertError;

static HR_STARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ ]{0,2}([ ]?\*[ ]?){3,}[ \t]*$").expect("star rule pattern")
});
static HR_DASHES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ ]{0,2}([ ]?-[ ]?){3,}[ \t]*$").expect("dash rule pattern")
});
static HR_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ ]{0,2}([ ]?_[ ]?){3,}[ \t]*$").expect("underscore rule pattern")
});

/// Run every block-level rule over `text`. Recurses through lists and
/// block quotes, so depth is tracked on the context.
pub(crate) fn run_block_gamut(ctx: &mut Context, text: &str) -> Result<String, ConvertError> {
    ctx.enter_block()?;

    let text = headers::do_headers(ctx, &text);

    // All three rule forms share one hashed block.
    let hr = html_blocks::hash_block(ctx, "<hr />");
    let text = HR_STARS.replace_all(&text, NoExpand(&hr));
    let text = HR_DASHES.replace_all(&text, NoExpand(&hr));
    let text = HR_UNDERSCORES.replace_all(&text, NoExpand(&hr));

    let text = lists::do_lists(ctx, &text)?;
    let text = code_blocks::do_code_blocks(ctx, &text);
    let text = blockquotes::do_blockquotes(ctx, &text)?;

    // Hash HTML produced by the rules above so the paragraph pass skips it.
    let text = html_blocks::hash_html_blocks(ctx, &text);
    let text = paragraphs::form_paragraphs(ctx, &text);

    ctx.leave_block();
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gamut(text: &str) -> String {
        let mut ctx = Context::new(8);
        run_block_gamut(&mut ctx, text).expect("within depth limit")
    }

    #[test]
    fn test_horizontal_rule_forms() {
        for src in ["* * *", "***", "---", "___", "- - -"] {
            assert_eq!(gamut(&format!("\n\n{src}\n\n")), "<hr />", "source {src:?}");
        }
    }

    #[test]
    fn test_rules_share_one_block_entry() {
        let mut ctx = Context::new(8);
        let out = run_block_gamut(&mut ctx, "\n\n---\n\n***\n\n").expect("within depth limit");
        assert_eq!(out, "<hr />\n\n<hr />");
        assert_eq!(ctx.html_blocks.iter().filter(|b| *b == "<hr />").count(), 1);
    }
}
