//! The conversion pipeline.
//!
//! Stages run in a fixed order over one mutable working string. Characters
//! that collide with the pipeline's own markers are hidden behind sentinels
//! up front (`~` as `~T`, `$` as `~D`) and restored at the very end, so the
//! markers `~K<n>K` (hashed HTML blocks), `~E<code>E` (escaped characters)
//! and `~0` (end-of-input sentinel) can never be forged by input text.

pub(crate) mod blocks;
pub(crate) mod escape;
pub(crate) mod html_blocks;
pub(crate) mod inline;
pub(crate) mod link_refs;
pub(crate) mod preprocess;

use std::collections::HashMap;

use regex::{Captures, Match};

use crate::ConvertError;

/// Per-invocation working state.
///
/// One `Context` lives for exactly one conversion; nothing is shared across
/// calls, which is what makes concurrent conversions safe.
pub(crate) struct Context {
    /// Ordered side-table of already-rendered HTML fragments, addressed by
    /// `~K<index>K` tokens in the working text.
    pub(crate) html_blocks: Vec<String>,
    /// Reference-style link definitions, keyed by lower-cased id.
    pub(crate) urls: HashMap<String, String>,
    pub(crate) titles: HashMap<String, String>,
    /// Non-zero while processing list items; switches the list matcher to
    /// its nested variant.
    pub(crate) list_level: u32,
    depth: usize,
    max_depth: usize,
}

impl Context {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            html_blocks: Vec::new(),
            urls: HashMap::new(),
            titles: HashMap::new(),
            list_level: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Enter one block-gamut level, failing closed on runaway nesting.
    pub(crate) fn enter_block(&mut self) -> Result<(), ConvertError> {
        if self.depth >= self.max_depth {
            return Err(ConvertError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_block(&mut self) {
        self.depth -= 1;
    }
}

/// Group 0 of a capture set. Always present for a successful match.
pub(crate) fn whole<'t>(caps: &Captures<'t>) -> Match<'t> {
    caps.get(0).expect("group 0 exists on every match")
}

/// Run the whole pipeline over one document.
pub(crate) fn make_html(ctx: &mut Context, text: &str) -> Result<String, ConvertError> {
    // Hide the two characters used internally as markers.
    let text = text.replace('~', "~T").replace('$', "~D");

    // Normalize line endings and pad with blank lines so rules matching at
    // start-of-line need no special casing for the first and last line.
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = format!("\n\n{text}\n\n");

    let text = preprocess::detab(&text);
    let text = preprocess::blank_out_whitespace_lines(&text);

    // Raw HTML blocks become opaque tokens before any markup rule runs.
    let text = html_blocks::hash_html_blocks(ctx, &text);
    let text = link_refs::strip_link_definitions(ctx, &text);

    let text = blocks::run_block_gamut(ctx, &text)?;

    let text = escape::unescape_special_chars(&text);
    Ok(text.replace("~D", "$").replace("~T", "~"))
}
