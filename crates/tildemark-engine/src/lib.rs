//! A converter from a constrained Markdown dialect to HTML.
//!
//! The conversion is a staged string-rewriting pipeline rather than an AST
//! parse: block-level rules (headers, rules, lists, code blocks, quotes) and
//! span-level rules (code spans, links, emphasis) are applied in a fixed
//! order, with already-rendered HTML hidden behind placeholder tokens so
//! later stages cannot reinterpret it as markup source.
//!
//! ```
//! let html = tildemark_engine::to_html("# Hello").unwrap();
//! assert_eq!(html, "<h1>Hello</h1>");
//! ```

mod pipeline;

use pipeline::Context;

/// Default bound on nested block constructs (lists inside quotes inside
/// lists, ...) before conversion fails instead of recursing further.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Conversion failure.
///
/// Malformed markup never fails; it degrades to literal text. The only error
/// condition is input whose nesting exceeds the configured depth limit.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("markup nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// A reusable markup converter.
///
/// The converter holds options only; every call to [`Converter::convert`]
/// gets its own working tables, so a single `Converter` may be shared
/// between threads.
#[derive(Debug, Clone)]
pub struct Converter {
    max_depth: usize,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// A converter that allows at most `max_depth` nested block levels.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Convert markup text to an HTML fragment.
    ///
    /// Converting the same input twice yields byte-identical output.
    pub fn convert(&self, text: &str) -> Result<String, ConvertError> {
        let mut ctx = Context::new(self.max_depth);
        pipeline::make_html(&mut ctx, text)
    }
}

/// Convert markup text to HTML with default options.
pub fn to_html(text: &str) -> Result<String, ConvertError> {
    Converter::new().convert(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(to_html("").unwrap(), "");
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(to_html("hello world").unwrap(), "<p>hello world</p>");
    }

    #[test]
    fn test_same_input_gives_same_output() {
        let input = "# Title\n\nSome *emphasis* and a <foo@example.com> link.";
        assert_eq!(to_html(input).unwrap(), to_html(input).unwrap());
    }

    #[test]
    fn test_depth_limit_fails_closed() {
        let deep = format!("{} x", ">".repeat(40));
        let result = Converter::with_max_depth(10).convert(&deep);
        assert_eq!(result, Err(ConvertError::NestingTooDeep { limit: 10 }));
    }
}
