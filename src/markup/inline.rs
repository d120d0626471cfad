//! Inline span conversion: code spans, links, strong, emphasis.
//!
//! Code spans are carved out first so emphasis never fires inside them.
//! Emphasis is matched non-greedily, which resolves nested markers
//! innermost-first. Anything unmatched passes through untouched.

use super::escape_html;
use regex::Regex;
use std::sync::LazyLock;

static RE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]\(([^() \t\r\n]*)\)").unwrap());
static RE_STRONG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static RE_EM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").unwrap());

/// Convert inline markup within already-assembled block text.
pub(super) fn convert_inline(text: &str) -> String {
    let escaped = escape_html(text);

    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;
    for caps in RE_CODE.captures_iter(&escaped) {
        let whole = caps.get(0).expect("group 0 always present");
        out.push_str(&apply_spans(&escaped[last..whole.start()]));
        out.push_str("<code>");
        out.push_str(&caps[1]);
        out.push_str("</code>");
        last = whole.end();
    }
    out.push_str(&apply_spans(&escaped[last..]));
    out
}

/// Links, then strong, then emphasis over non-code text.
fn apply_spans(text: &str) -> String {
    let text = RE_LINK.replace_all(text, r#"<a href="$2">$1</a>"#);
    let text = RE_STRONG.replace_all(&text, "<strong>$1</strong>");
    let text = RE_EM.replace_all(&text, "<em>$1</em>");
    text.into_owned()
}
