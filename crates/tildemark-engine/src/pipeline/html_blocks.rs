//! Hashing of raw HTML blocks.
//!
//! Structural HTML in the source (and HTML generated by earlier block
//! rules) is replaced by opaque `~K<index>K` tokens backed by an ordered
//! side-table, so no later rule can reprocess it as markup. Matching runs
//! in passes of decreasing specificity over a copy of the text with doubled
//! newlines, which lets every "followed by a blank line" check become a
//! plain newline test.

use std::sync::LazyLock;

use regex::Regex;

use super::{Context, whole};

// Tag allow-lists for the two block passes; the liberal pass deliberately
// leaves out ins and del, which may legitimately appear span-level.
const BLOCK_TAGS_A: &str =
    "p|div|h[1-6]|blockquote|pre|table|dl|ol|ul|script|noscript|form|fieldset|iframe|math|ins|del";
const BLOCK_TAGS_B: &str =
    "p|div|h[1-6]|blockquote|pre|table|dl|ol|ul|script|noscript|form|fieldset|iframe|math";

static OPEN_TAG_A: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^<({BLOCK_TAGS_A})\b")).expect("nested block open pattern")
});

static OPEN_TAG_B: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^<({BLOCK_TAGS_B})\b")).expect("liberal block open pattern")
});

// Standalone horizontal-rule element preceded by a newline.
static HR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n[ ]{0,3}<hr\b[^<>]*?/?>[ \t]*)").expect("hr tag pattern"));

// A run of HTML comments on its own line.
static COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\n\n[ ]{0,3}<!(?:--[^\r]*?--\s*)+>[ \t]*)").expect("comment pattern")
});

// PHP and ASP style processor instructions.
static PROC_INST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\n([ ]{0,3}(?:<\?[^\r]*?\?>|<%[^\r]*?%>)[ \t]*)").expect("proc inst pattern")
});

/// Store an already-rendered block and return its placeholder token,
/// padded with blank lines on both sides.
pub(crate) fn hash_block(ctx: &mut Context, text: &str) -> String {
    let trimmed = text.trim_matches('\n');
    ctx.html_blocks.push(trimmed.to_string());
    format!("\n\n~K{}K\n\n", ctx.html_blocks.len() - 1)
}

/// Store a block matched in doubled-newline text. Internal doubled lines
/// are collapsed and outer blank lines trimmed before storage.
fn hash_element(ctx: &mut Context, block: &str) -> String {
    let block = block.replace("\n\n", "\n");
    let block = block.strip_prefix('\n').unwrap_or(&block);
    let block = block.trim_end_matches('\n');
    ctx.html_blocks.push(block.to_string());
    format!("\n\n~K{}K\n\n", ctx.html_blocks.len() - 1)
}

/// Replace raw block-level HTML with placeholder tokens.
pub(crate) fn hash_html_blocks(ctx: &mut Context, text: &str) -> String {
    let text = text.replace('\n', "\n\n");
    let text = hash_nested_blocks(ctx, &text);
    let text = hash_liberal_blocks(ctx, &text);
    let text = hash_standalone(ctx, &text, &HR_TAG);
    let text = hash_standalone(ctx, &text, &COMMENT);
    let text = hash_standalone(ctx, &text, &PROC_INST);
    text.replace("\n\n", "\n")
}

/// First pass: same-tag nested blocks whose outer closing tag sits at the
/// left margin. This must run before the liberal pass, which would stop at
/// the first (indented, inner) closing tag.
fn hash_nested_blocks(ctx: &mut Context, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(caps) = OPEN_TAG_A.captures_at(text, pos) {
        let open = whole(&caps);
        let close = format!("\n</{}>", &caps[1]);
        let mut found = None;
        let mut search = open.end();
        while let Some(rel) = text[search..].find(&close) {
            let at = search + rel;
            let mut end = at + close.len();
            end += text[end..].bytes().take_while(|b| *b == b' ' || *b == b'\t').count();
            if text[end..].starts_with('\n') {
                found = Some(end);
                break;
            }
            search = at + 1;
        }
        match found {
            Some(end) => {
                out.push_str(&text[pos..open.start()]);
                let marker = hash_element(ctx, &text[open.start()..end]);
                out.push_str(&marker);
                pos = end;
            }
            None => {
                out.push_str(&text[pos..open.start() + 1]);
                pos = open.start() + 1;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Second pass: liberal match from an opening tag at the left margin to
/// the last matching closing tag on the first line that ends with one.
fn hash_liberal_blocks(ctx: &mut Context, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(caps) = OPEN_TAG_B.captures_at(text, pos) {
        let open = whole(&caps);
        let close = format!("</{}>", &caps[1]);
        match find_closing_line(text, open.end(), &close) {
            Some(end) => {
                out.push_str(&text[pos..open.start()]);
                let marker = hash_element(ctx, &text[open.start()..end]);
                out.push_str(&marker);
                pos = end;
            }
            None => {
                out.push_str(&text[pos..open.start() + 1]);
                pos = open.start() + 1;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Scan line by line for the last `close` occurrence on a line followed
/// only by spaces and tabs; the block runs through that line's newline.
fn find_closing_line(text: &str, from: usize, close: &str) -> Option<usize> {
    let mut line_start = from;
    loop {
        let line_end = line_start + text[line_start..].find('\n')?;
        let line = &text[line_start..line_end];
        let mut best = None;
        let mut at = 0;
        while let Some(rel) = line[at..].find(close) {
            let hit = at + rel;
            let tail = &line[hit + close.len()..];
            if tail.bytes().all(|b| b == b' ' || b == b'\t') {
                best = Some(hit);
            }
            at = hit + 1;
        }
        if best.is_some() {
            return Some(line_end + 1);
        }
        line_start = line_end + 1;
    }
}

/// Hash standalone single-element matches (rules, comments, processor
/// instructions). Group 1 is stored; the whole match is replaced, and the
/// match must be followed by a blank line (a doubled newline here).
fn hash_standalone(ctx: &mut Context, text: &str, re: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(caps) = re.captures_at(text, pos) {
        let m = whole(&caps);
        if !text[m.end()..].starts_with("\n\n") {
            out.push_str(&text[pos..m.start() + 1]);
            pos = m.start() + 1;
            continue;
        }
        out.push_str(&text[pos..m.start()]);
        let marker = hash_element(ctx, &caps[1]);
        out.push_str(&marker);
        pos = m.end();
    }
    out.push_str(&text[pos..]);
    out
}
