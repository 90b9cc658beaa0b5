//! Link reference definitions.
//!
//! `[id]: url "optional title"` lines are removed from the text and stored
//! on the [`Context`] for later lookup by reference-style links and images.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Context;
use super::escape::encode_amps_and_angles;

static LINK_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ ]{0,3}\[(.+)\]:", // id
        r"[ \t]*\n?[ \t]*",
        r"<?(\S+?)>?", // url, optionally angle-wrapped
        r"[ \t]*\n?[ \t]*",
        r#"(?:(\n*)["(](.+?)[")][ \t]*)?"#, // optional title
        r"(?:\n+|\z)",
    ))
    .expect("link definition pattern")
});

/// Strip definitions from `text`, recording each id's url and title.
/// Ids are case-insensitive.
pub(crate) fn strip_link_definitions(ctx: &mut Context, text: &str) -> String {
    LINK_DEF
        .replace_all(text, |caps: &Captures| {
            let id = caps[1].to_lowercase();
            ctx.urls.insert(id.clone(), encode_amps_and_angles(&caps[2]));
            if let Some(blank) = caps.get(3) {
                if !blank.as_str().is_empty() {
                    // The title candidate is separated from the url by a
                    // blank line, so it belongs to the following text.
                    return format!("{}{}", blank.as_str(), &caps[4]);
                }
            }
            if let Some(title) = caps.get(4) {
                ctx.titles.insert(id, title.as_str().replace('"', "&quot;"));
            }
            String::new()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_is_stripped_and_stored() {
        let mut ctx = Context::new(8);
        let out = strip_link_definitions(&mut ctx, "[Foo]: http://example.com \"Title\"\n");
        assert_eq!(out, "");
        assert_eq!(ctx.urls["foo"], "http://example.com");
        assert_eq!(ctx.titles["foo"], "Title");
    }

    #[test]
    fn test_angle_wrapped_url() {
        let mut ctx = Context::new(8);
        strip_link_definitions(&mut ctx, "[a]: <http://example.com/>\n");
        assert_eq!(ctx.urls["a"], "http://example.com/");
    }

    #[test]
    fn test_title_after_blank_line_is_put_back() {
        let mut ctx = Context::new(8);
        let out = strip_link_definitions(&mut ctx, "[a]: /url\n\n\"not a title\"\n");
        assert_eq!(ctx.urls["a"], "/url");
        assert!(ctx.titles.is_empty());
        assert_eq!(out, "\nnot a title");
    }

    #[test]
    fn test_quotes_in_title_become_entities() {
        let mut ctx = Context::new(8);
        strip_link_definitions(&mut ctx, "[a]: /url (say \"hi\")\n");
        assert_eq!(ctx.titles["a"], "say &quot;hi&quot;");
    }
}
