//! Angle-bracket autolinks and obfuscated email addresses.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::escape::unescape_special_chars;

static URL_AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<((?:https?|ftp|dict):[^'">\s]+)>"#).expect("url autolink pattern")
});

static EMAIL_AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:mailto:)?([-.\w]+@[-a-z0-9]+(?:\.[-a-z0-9]+)*\.[a-z]+)>")
        .expect("email autolink pattern")
});

pub(crate) fn do_auto_links(text: &str) -> String {
    let text = URL_AUTOLINK.replace_all(text, "<a href=\"$1\">$1</a>").into_owned();
    EMAIL_AUTOLINK
        .replace_all(&text, |caps: &Captures| {
            encode_email_address(&unescape_special_chars(&caps[1]))
        })
        .into_owned()
}

/// Render an email autolink with the address obfuscated as a mix of
/// decimal entities, hex entities and literal characters. The mix is
/// drawn from a generator seeded by the address itself, so the same
/// address always renders the same way.
fn encode_email_address(addr: &str) -> String {
    let mut rng = Obfuscator::for_address(addr);
    let mut encoded = String::new();
    for ch in format!("mailto:{addr}").chars() {
        if ch == '@' {
            // The separator is never left readable.
            if rng.next_f64() < 0.5 {
                encoded.push_str(&format!("&#{};", ch as u32));
            } else {
                encoded.push_str(&format!("&#x{:X};", ch as u32));
            }
        } else if ch == ':' {
            encoded.push(ch);
        } else {
            let r = rng.next_f64();
            if r > 0.9 {
                encoded.push(ch);
            } else if r > 0.45 {
                encoded.push_str(&format!("&#x{:X};", ch as u32));
            } else {
                encoded.push_str(&format!("&#{};", ch as u32));
            }
        }
    }
    // The visible text drops the scheme: everything after the last
    // literal colon.
    let visible = encoded.rsplit(':').next().unwrap_or(&encoded);
    format!("<a href=\"{encoded}\">{visible}</a>")
}

/// Small xorshift generator seeded by hashing the address, so output is a
/// pure function of its input.
struct Obfuscator {
    state: u64,
}

impl Obfuscator {
    fn for_address(addr: &str) -> Self {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in addr.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        Self { state: hash.max(1) }
    }

    fn next_f64(&mut self) -> f64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_autolink() {
        assert_eq!(
            do_auto_links("<http://example.com/a>"),
            "<a href=\"http://example.com/a\">http://example.com/a</a>"
        );
    }

    #[test]
    fn test_non_link_angle_text_is_untouched() {
        assert_eq!(do_auto_links("a < b > c"), "a < b > c");
    }

    #[test]
    fn test_email_is_obfuscated_and_deterministic() {
        let once = do_auto_links("<user@example.com>");
        let again = do_auto_links("<user@example.com>");
        assert_eq!(once, again);
        assert!(once.starts_with("<a href=\""), "got {once:?}");
        assert!(!once.contains('@'), "separator must be encoded, got {once:?}");
        assert!(once.contains("&#"), "got {once:?}");
    }

    #[test]
    fn test_mailto_prefix_is_accepted_and_hidden_from_view() {
        let out = do_auto_links("<mailto:user@example.com>");
        let visible = out.split('>').nth(1).expect("anchor body");
        assert!(!visible.contains("mailto"), "got {out:?}");
    }
}
