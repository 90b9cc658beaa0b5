//! Inline, reference and shortcut links, and images.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::Context;
use crate::pipeline::escape::{URL_ESCAPES, escape_chars};

static IMAGE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[(.*?)\][ ]?(?:\n[ ]*)?\[(.*?)\]").expect("reference image pattern")
});

static IMAGE_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[(.*?)\]\s?\([ \t]*<?(\S+?)>?[ \t]*(?:(?:"(.*?)"|'(.*?)')[ \t]*)?\)"#)
        .expect("inline image pattern")
});

// Link text may contain one level of balanced brackets.
static ANCHOR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[((?:\[[^\]]*\]|[^\[\]])*)\][ ]?(?:\n[ ]*)?\[(.*?)\]")
        .expect("reference anchor pattern")
});

static ANCHOR_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[((?:\[[^\]]*\]|[^\[\]])*)\]\([ \t]*<?(.*?)>?[ \t]*(?:(?:"(.*?)"|'(.*?)')[ \t]*)?\)"#)
        .expect("inline anchor pattern")
});

static ANCHOR_SHORTCUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("shortcut anchor pattern"));

static EMPTY_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\(\s*\)$").expect("empty parens pattern"));

/// Reference ids derive from the link text with line breaks rejoined.
fn id_from_text(text: &str) -> String {
    static BREAK: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ ]?\n").expect("line break pattern"));
    BREAK.replace_all(&text.to_lowercase(), " ").into_owned()
}

fn title_of<'a>(caps: &'a Captures, double: usize, single: usize) -> Option<&'a str> {
    caps.get(double).or_else(|| caps.get(single)).map(|m| m.as_str())
}

pub(crate) fn do_images(ctx: &Context, text: &str) -> String {
    let text = IMAGE_REF
        .replace_all(text, |caps: &Captures| {
            write_image(ctx, &caps[0], &caps[1], &caps[2], None, None)
        })
        .into_owned();
    IMAGE_INLINE
        .replace_all(&text, |caps: &Captures| {
            write_image(ctx, &caps[0], &caps[1], "", Some(&caps[2]), title_of(caps, 3, 4))
        })
        .into_owned()
}

fn write_image(
    ctx: &Context,
    whole: &str,
    alt: &str,
    link_id: &str,
    url: Option<&str>,
    title: Option<&str>,
) -> String {
    let (url, title) = match url {
        Some(u) => (u.to_string(), title.unwrap_or("").to_string()),
        None => {
            let id = if link_id.is_empty() { id_from_text(alt) } else { link_id.to_lowercase() };
            match ctx.urls.get(&id) {
                Some(u) => (u.clone(), ctx.titles.get(&id).cloned().unwrap_or_default()),
                // Unresolved references stay in the text verbatim.
                None => return whole.to_string(),
            }
        }
    };
    let alt = alt.replace('"', "&quot;");
    let url = escape_chars(&url, URL_ESCAPES);
    let title = escape_chars(&title.replace('"', "&quot;"), URL_ESCAPES);
    format!("<img src=\"{url}\" alt=\"{alt}\" title=\"{title}\" />")
}

pub(crate) fn do_anchors(ctx: &Context, text: &str) -> String {
    let text = ANCHOR_REF
        .replace_all(text, |caps: &Captures| {
            write_anchor(ctx, &caps[0], &caps[1], &caps[2], "", None)
        })
        .into_owned();
    let text = ANCHOR_INLINE
        .replace_all(&text, |caps: &Captures| {
            write_anchor(ctx, &caps[0], &caps[1], "", &caps[2], title_of(caps, 3, 4))
        })
        .into_owned();
    ANCHOR_SHORTCUT
        .replace_all(&text, |caps: &Captures| {
            write_anchor(ctx, &caps[0], &caps[1], "", "", None)
        })
        .into_owned()
}

fn write_anchor(
    ctx: &Context,
    whole: &str,
    link_text: &str,
    link_id: &str,
    url: &str,
    title: Option<&str>,
) -> String {
    let mut url = url.to_string();
    let mut title = title.unwrap_or("").to_string();
    if url.is_empty() {
        let id = if link_id.is_empty() { id_from_text(link_text) } else { link_id.to_lowercase() };
        match ctx.urls.get(&id) {
            Some(u) => {
                url = u.clone();
                if let Some(t) = ctx.titles.get(&id) {
                    title = t.clone();
                }
            }
            None => {
                // `[text]()` is an explicit empty link; anything else
                // unresolved stays in the text verbatim.
                if !EMPTY_PARENS.is_match(whole) {
                    return whole.to_string();
                }
            }
        }
    }
    let url = escape_chars(&url, URL_ESCAPES);
    let mut result = format!("<a href=\"{url}\"");
    if !title.is_empty() {
        let title = escape_chars(&title.replace('"', "&quot;"), URL_ESCAPES);
        result.push_str(&format!(" title=\"{title}\""));
    }
    result.push('>');
    result.push_str(link_text);
    result.push_str("</a>");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx_with(id: &str, url: &str, title: Option<&str>) -> Context {
        let mut ctx = Context::new(8);
        ctx.urls.insert(id.to_string(), url.to_string());
        if let Some(t) = title {
            ctx.titles.insert(id.to_string(), t.to_string());
        }
        ctx
    }

    #[test]
    fn test_inline_anchor() {
        let ctx = Context::new(8);
        assert_eq!(
            do_anchors(&ctx, "[text](http://example.com \"Title\")"),
            "<a href=\"http://example.com\" title=\"Title\">text</a>"
        );
    }

    #[test]
    fn test_inline_anchor_without_title() {
        let ctx = Context::new(8);
        assert_eq!(do_anchors(&ctx, "[x](/a)"), "<a href=\"/a\">x</a>");
    }

    #[test]
    fn test_reference_anchor_resolves() {
        let ctx = ctx_with("id", "/url", Some("T"));
        assert_eq!(
            do_anchors(&ctx, "[text][id]"),
            "<a href=\"/url\" title=\"T\">text</a>"
        );
    }

    #[test]
    fn test_implicit_reference_uses_link_text() {
        let ctx = ctx_with("text", "/url", None);
        assert_eq!(do_anchors(&ctx, "[Text][]"), "<a href=\"/url\">Text</a>");
    }

    #[test]
    fn test_unresolved_reference_is_left_verbatim() {
        let ctx = Context::new(8);
        assert_eq!(do_anchors(&ctx, "[text][nope]"), "[text][nope]");
    }

    #[test]
    fn test_empty_parens_make_empty_href() {
        let ctx = Context::new(8);
        assert_eq!(do_anchors(&ctx, "[x]()"), "<a href=\"\">x</a>");
    }

    #[test]
    fn test_underscores_in_url_are_hidden() {
        let ctx = Context::new(8);
        assert_eq!(do_anchors(&ctx, "[x](/my_page)"), "<a href=\"/my~E95Epage\">x</a>");
    }

    #[test]
    fn test_inline_image_always_carries_title_attr() {
        let ctx = Context::new(8);
        assert_eq!(
            do_images(&ctx, "![alt](/img.png)"),
            "<img src=\"/img.png\" alt=\"alt\" title=\"\" />"
        );
    }

    #[test]
    fn test_reference_image() {
        let ctx = ctx_with("pic", "/p.png", Some("P"));
        assert_eq!(
            do_images(&ctx, "![alt][pic]"),
            "<img src=\"/p.png\" alt=\"alt\" title=\"P\" />"
        );
    }

    #[test]
    fn test_unresolved_image_reference_is_left_verbatim() {
        let ctx = Context::new(8);
        assert_eq!(do_images(&ctx, "![alt][nope]"), "![alt][nope]");
    }
}
