//! Ordered and unordered lists.
//!
//! A `~0` sentinel is appended before matching so every list and list item
//! has a terminator to scan for, then stripped again on the way out. List
//! items recurse into the block gamut (loose items) or the list pass
//! itself (tight items with nested lists), so this is where conversion
//! depth is spent.

use std::sync::LazyLock;

use regex::Regex;

use crate::ConvertError;
use crate::pipeline::preprocess::outdent;
use crate::pipeline::{Context, inline, whole};

use super::run_block_gamut;

static LIST_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ ]{0,3}([*+-]|\d+\.)[ \t]+").expect("list start pattern"));

static ITEM_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)([*+-]|\d+\.)[ \t]+").expect("item prefix pattern")
});

static MARKER_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A([*+-]|\d+\.)[ \t]+").expect("marker pattern"));

static DOUBLE_BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank run pattern"));

static TRAILING_BLANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}\z").expect("trailing blank pattern"));

/// Convert list regions of `text` to `<ul>`/`<ol>` markup.
pub(crate) fn do_lists(ctx: &mut Context, text: &str) -> Result<String, ConvertError> {
    let text = format!("{text}~0");
    let nested = ctx.list_level > 0;

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(caps) = LIST_START.captures_at(&text, pos) {
        let start = whole(&caps).start();
        if !nested && !has_blank_runup(&text, start) {
            out.push_str(&text[pos..start + 1]);
            pos = start + 1;
            continue;
        }
        let list_end = find_list_end(&text, whole(&caps).end());
        let list = DOUBLE_BLANK.replace_all(&text[start..list_end], "\n\n\n");
        let items = process_list_items(ctx, &list)?;
        let tag = if caps[1].starts_with(['*', '+', '-']) { "ul" } else { "ol" };

        out.push_str(&text[pos..start]);
        if nested {
            out.push_str(&format!("<{tag}>{}</{tag}>\n", items.trim_end()));
        } else {
            out.push_str(&format!("<{tag}>\n{items}</{tag}>\n"));
        }
        pos = list_end;
    }
    out.push_str(&text[pos..]);

    Ok(out.replacen("~0", "", 1))
}

/// A top-level list must sit at the very start of the text or after a
/// blank line.
fn has_blank_runup(text: &str, start: usize) -> bool {
    start == 0
        || (start == 1 && text.starts_with('\n'))
        || text[..start].ends_with("\n\n")
}

/// Find the end of the list that starts at `body_start` (just past the
/// first marker): either the sentinel, or a blank-line run followed by
/// non-whitespace that is not another list marker. The run is part of
/// the list.
fn find_list_end(text: &str, body_start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = match text[body_start..].chars().next() {
        Some(c) => body_start + c.len_utf8(),
        None => text.len(),
    };
    // Byte comparisons only: `i` may sit inside a multibyte character.
    while i < text.len() {
        if bytes[i] == b'~' && bytes.get(i + 1) == Some(&b'0') {
            return i + 2;
        }
        if bytes[i] == b'\n' && bytes.get(i + 1) == Some(&b'\n') {
            let mut j = i;
            while j < text.len() && bytes[j] == b'\n' {
                j += 1;
            }
            if j < text.len()
                && !bytes[j].is_ascii_whitespace()
                && !MARKER_AT.is_match(&text[j..])
            {
                return j;
            }
            i = j;
        } else {
            i += 1;
        }
    }
    text.len()
}

/// Render each item of a single list to `<li>` elements.
fn process_list_items(ctx: &mut Context, list: &str) -> Result<String, ConvertError> {
    ctx.list_level += 1;
    let trimmed = TRAILING_BLANKS.replace(list, "\n");
    let list = format!("{trimmed}~0");

    let mut out = String::with_capacity(list.len());
    let mut pos = 0;
    while let Some(caps) = ITEM_PREFIX.captures_at(&list, pos) {
        let prefix = whole(&caps);
        // A surviving newline before the item line means a blank line
        // separated it from the previous item.
        let leading_line = prefix.start() > pos && list.as_bytes()[prefix.start() - 1] == b'\n';
        let emit_to = if leading_line { prefix.start() - 1 } else { prefix.start() };
        out.push_str(&list[pos..emit_to]);

        let indent = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let Some(body_end) = find_item_end(&list, prefix.end(), indent) else {
            out.push_str(&list[emit_to..prefix.end()]);
            pos = prefix.end();
            continue;
        };
        let item = &list[prefix.end()..body_end];

        let rendered = if leading_line || item.contains("\n\n") {
            run_block_gamut(ctx, &outdent(item))?
        } else {
            // Tight item: recurse for nested lists only, then span rules.
            let sub = do_lists(ctx, &outdent(item))?;
            let sub = sub.strip_suffix('\n').unwrap_or(&sub);
            inline::run_span_gamut(ctx, sub)
        };
        out.push_str("<li>");
        out.push_str(&rendered);
        out.push_str("</li>\n");
        pos = body_end;
    }
    out.push_str(&list[pos..]);

    ctx.list_level -= 1;
    Ok(out.replace("~0", ""))
}

/// An item's body runs through one or two trailing newlines, at a point
/// where skipping any further newlines lands on the sentinel or on the
/// next marker at the same indent.
fn find_item_end(list: &str, body_start: usize, indent: &str) -> Option<usize> {
    let bytes = list.as_bytes();
    let mut i = body_start;
    // At least one body character before the trailing newlines.
    i += list[i..].chars().next().map(char::len_utf8)?;
    while i < list.len() {
        if bytes[i] != b'\n' {
            i += 1;
            continue;
        }
        let mut j = i;
        while j < list.len() && bytes[j] == b'\n' {
            j += 1;
        }
        let follows_item = list[j..].starts_with("~0")
            || (list[j..].starts_with(indent) && MARKER_AT.is_match(&list[j + indent.len()..]));
        if follows_item {
            return Some(i + (j - i).min(2));
        }
        i = j;
    }
    None
}
