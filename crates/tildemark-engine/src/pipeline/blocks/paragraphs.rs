//! Paragraph wrapping and final block token expansion.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::{Context, inline};

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank run pattern"));

static BLOCK_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~K(\d+)K").expect("block token pattern"));

static LEADING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[ \t]*").expect("leading space pattern"));

/// Wrap remaining text chunks in `<p>` tags and substitute hashed blocks
/// back in. Tokens are expanded repeatedly, since a stored block may
/// itself contain tokens for blocks hashed while it was built.
pub(crate) fn form_paragraphs(ctx: &Context, text: &str) -> String {
    let text = text.trim_matches('\n');

    let mut grafs: Vec<String> = Vec::new();
    for graf in BLANK_RUN.split(text) {
        if BLOCK_TOKEN.is_match(graf) {
            grafs.push(graf.to_string());
        } else if graf.contains(|c: char| !c.is_whitespace()) {
            let body = inline::run_span_gamut(ctx, graf);
            let body = LEADING_SPACE.replace(&body, "<p>");
            grafs.push(format!("{body}</p>"));
        }
    }

    for graf in &mut grafs {
        while let Some(caps) = BLOCK_TOKEN.captures(graf) {
            let span = caps.get(0).expect("group 0 exists on every match").range();
            let Ok(index) = caps[1].parse::<usize>() else {
                break;
            };
            let Some(block) = ctx.html_blocks.get(index) else {
                break;
            };
            graf.replace_range(span, block);
        }
    }

    grafs.join("\n\n")
}
