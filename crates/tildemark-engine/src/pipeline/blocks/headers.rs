//! Setext and atx style headers.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::{Context, html_blocks, inline};

static SETEXT_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(.+)[ \t]*\n=+[ \t]*\n+").expect("setext h1 pattern"));
static SETEXT_H2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(.+)[ \t]*\n-+[ \t]*\n+").expect("setext h2 pattern"));
static ATX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]*(.+?)[ \t]*#*\n+").expect("atx pattern"));

pub(crate) fn do_headers(ctx: &mut Context, text: &str) -> String {
    let text = SETEXT_H1
        .replace_all(text, |caps: &Captures| header(ctx, 1, &caps[1]))
        .into_owned();
    let text = SETEXT_H2
        .replace_all(&text, |caps: &Captures| header(ctx, 2, &caps[1]))
        .into_owned();
    ATX.replace_all(&text, |caps: &Captures| header(ctx, caps[1].len(), &caps[2]))
        .into_owned()
}

fn header(ctx: &mut Context, level: usize, text: &str) -> String {
    let body = inline::run_span_gamut(ctx, text);
    html_blocks::hash_block(ctx, &format!("<h{level}>{body}</h{level}>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(text: &str) -> (Context, String) {
        let mut ctx = Context::new(8);
        let out = do_headers(&mut ctx, text);
        (ctx, out)
    }

    #[test]
    fn test_atx_levels() {
        let (ctx, _) = headers("# One\n\n### Three\n\n");
        assert_eq!(ctx.html_blocks, vec!["<h1>One</h1>", "<h3>Three</h3>"]);
    }

    #[test]
    fn test_atx_trailing_hashes_are_dropped() {
        let (ctx, _) = headers("## Two ##\n\n");
        assert_eq!(ctx.html_blocks, vec!["<h2>Two</h2>"]);
    }

    #[test]
    fn test_setext_headers() {
        let (ctx, _) = headers("Top\n===\n\nSub\n---\n\n");
        assert_eq!(ctx.html_blocks, vec!["<h1>Top</h1>", "<h2>Sub</h2>"]);
    }

    #[test]
    fn test_header_text_runs_span_rules() {
        let (ctx, _) = headers("# a *b*\n\n");
        assert_eq!(ctx.html_blocks, vec!["<h1>a <em>b</em></h1>"]);
    }
}
