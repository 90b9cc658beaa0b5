//! Character escaping via `~E<code>E` placeholder tokens.
//!
//! Markup-significant characters are hidden behind tokens while later rule
//! passes run, then restored verbatim at the very end of the pipeline.

use std::sync::LazyLock;

use regex::Regex;

/// Characters that lose their markup meaning inside code runs.
pub(crate) const CODE_ESCAPES: &[char] = &['*', '_', '{', '}', '[', ']', '\\'];

/// Characters escaped inside raw `<...>` tags so emphasis and code rules
/// cannot fire on tag attributes.
pub(crate) const TAG_ESCAPES: &[char] = &['\\', '`', '*', '_'];

/// Characters escaped inside generated urls and titles.
pub(crate) const URL_ESCAPES: &[char] = &['*', '_'];

static ESCAPE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~E(\d+)E").expect("escape token pattern"));

static ENTITY_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A#?[xX]?(?:[0-9a-fA-F]+|\w+);").expect("entity pattern"));

/// Replace every character in `set` with its `~E<code>E` token.
pub(crate) fn escape_chars(text: &str, set: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if set.contains(&ch) {
            out.push_str(&format!("~E{}E", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Swap every `~E<code>E` token back to its literal character.
pub(crate) fn unescape_special_chars(text: &str) -> String {
    ESCAPE_TOKEN
        .replace_all(text, |caps: &regex::Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Encode the contents of a code run: HTML-significant characters become
/// entities and markup-significant ones become escape tokens, so code can
/// never be reinterpreted as markup.
pub(crate) fn encode_code(text: &str) -> String {
    let text = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    escape_chars(&text, CODE_ESCAPES)
}

/// Encode bare `&` and `<`: an ampersand not starting a recognized entity
/// becomes `&amp;`, an angle bracket not opening a tag-like span becomes
/// `&lt;`.
pub(crate) fn encode_amps_and_angles(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, ch) in text.char_indices() {
        match ch {
            '&' if !ENTITY_TAIL.is_match(&text[i + 1..]) => out.push_str("&amp;"),
            '<' if !tag_follows(&text[i + 1..]) => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn tag_follows(rest: &str) -> bool {
    matches!(
        rest.chars().next(),
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '?' | '$' | '!')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_and_unescape_round_trip() {
        let escaped = escape_chars("a*b_c", &['*', '_']);
        assert_eq!(escaped, "a~E42Eb~E95Ec");
        assert_eq!(unescape_special_chars(&escaped), "a*b_c");
    }

    #[test]
    fn test_encode_code_escapes_html_and_markup() {
        assert_eq!(encode_code("<&>"), "&lt;&amp;&gt;");
        assert_eq!(encode_code("a*b"), "a~E42Eb");
    }

    #[test]
    fn test_bare_ampersand_is_encoded() {
        assert_eq!(encode_amps_and_angles("fish & chips"), "fish &amp; chips");
    }

    #[test]
    fn test_entities_are_left_alone() {
        assert_eq!(encode_amps_and_angles("&amp; &#38; &#x26;"), "&amp; &#38; &#x26;");
    }

    #[test]
    fn test_bare_angle_is_encoded_but_tags_are_not() {
        assert_eq!(encode_amps_and_angles("1 < 2"), "1 &lt; 2");
        assert_eq!(encode_amps_and_angles("<em>x</em>"), "<em>x</em>");
    }
}
