//! Markdown subset to HTML conversion.
//!
//! Block structure (headings, lists, blockquotes, fenced code, paragraphs)
//! lives in [`block`]; inline spans (code, links, emphasis) in [`inline`].
//!
//! Two rules shape the converter:
//! - fenced code block content is HTML-escaped but otherwise preserved
//!   byte for byte - no inline construct is interpreted inside a fence;
//! - unknown inline constructs pass through unchanged instead of failing,
//!   so future markup degrades gracefully.
//!
//! Conversion is deterministic: identical input yields byte-identical
//! output.

mod block;
mod inline;

use crate::{config::MarkdownConfig, error::ParseError};
use std::path::Path;

/// Convert a document body to HTML.
///
/// `line_offset` is the 0-based line where the body starts within the
/// source file, so fence errors report real file line numbers.
pub fn convert(
    path: &Path,
    body: &str,
    line_offset: usize,
    opts: &MarkdownConfig,
) -> Result<String, ParseError> {
    block::convert_blocks(path, body, line_offset, opts)
}

/// Escape text for HTML element and attribute contexts.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_str(body: &str) -> String {
        convert(
            Path::new("test.md"),
            body,
            0,
            &MarkdownConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let body = "# Title\n\nSome *emphasis* and `code`.\n\n```rust\nlet x = 1;\n```\n";
        let first = convert_str(body);
        let second = convert_str(body);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fence_preserves_markup_characters() {
        let body = "```\nlet x = a * b * c;\n**not bold**\n```\n";
        let html = convert_str(body);

        assert!(html.contains("let x = a * b * c;"));
        assert!(html.contains("**not bold**"));
        assert!(!html.contains("<em>"));
        assert!(!html.contains("<strong>"));
    }

    #[test]
    fn test_fence_escapes_html() {
        let html = convert_str("```\nVec<String> & friends\n```\n");
        assert!(html.contains("Vec&lt;String&gt; &amp; friends"));
    }

    #[test]
    fn test_unterminated_fence_reports_file_line() {
        let err = convert(
            Path::new("post.md"),
            "intro\n\n```rust\nfn main() {}\n",
            4,
            &MarkdownConfig::default(),
        )
        .unwrap_err();

        match err {
            ParseError::UnterminatedFence { line, .. } => assert_eq!(line, 7),
            other => panic!("expected UnterminatedFence, got {other:?}"),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }
}
