//! Block-level markdown parsing.

use super::{escape_html, inline};
use crate::{config::MarkdownConfig, error::ParseError, utils::slug};
use std::path::Path;

/// Convert body lines to HTML blocks.
pub(super) fn convert_blocks(
    path: &Path,
    src: &str,
    line_offset: usize,
    opts: &MarkdownConfig,
) -> Result<String, ParseError> {
    let lines: Vec<&str> = src.lines().collect();
    let mut out = String::with_capacity(src.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim_end();

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        // Fenced code block: contents stay verbatim (escaped only).
        if let Some((fence_len, info)) = fence_open(line) {
            let opened_at = line_offset + i + 1;
            let close = (i + 1..lines.len()).find(|&j| fence_close(lines[j].trim_end(), fence_len));
            let Some(close) = close else {
                return Err(ParseError::UnterminatedFence {
                    path: path.to_path_buf(),
                    line: opened_at,
                });
            };
            push_code_block(&mut out, &lines[i + 1..close], info, opts);
            i = close + 1;
            continue;
        }

        if let Some((level, text)) = heading(line) {
            push_heading(&mut out, level, text, opts);
            i += 1;
            continue;
        }

        if is_rule(line) {
            out.push_str("<hr />\n");
            i += 1;
            continue;
        }

        if line.trim_start().starts_with('>') {
            let mut quoted = Vec::new();
            while i < lines.len() && lines[i].trim_start().starts_with('>') {
                quoted.push(strip_quote_marker(lines[i].trim_start()));
                i += 1;
            }
            out.push_str("<blockquote>\n<p>");
            out.push_str(&inline::convert_inline(&quoted.join("\n")));
            out.push_str("</p>\n</blockquote>\n");
            continue;
        }

        if unordered_item(line).is_some() {
            out.push_str("<ul>\n");
            while let Some(item) = lines.get(i).and_then(|l| unordered_item(l.trim_end())) {
                push_list_item(&mut out, item);
                i += 1;
            }
            out.push_str("</ul>\n");
            continue;
        }

        if ordered_item(line).is_some() {
            out.push_str("<ol>\n");
            while let Some(item) = lines.get(i).and_then(|l| ordered_item(l.trim_end())) {
                push_list_item(&mut out, item);
                i += 1;
            }
            out.push_str("</ol>\n");
            continue;
        }

        // Paragraph: everything until a blank line or another block opener.
        let mut para = Vec::new();
        while i < lines.len() {
            let l = lines[i].trim_end();
            if l.trim().is_empty() || opens_block(l) {
                break;
            }
            para.push(l);
            i += 1;
        }
        out.push_str("<p>");
        out.push_str(&inline::convert_inline(&para.join("\n")));
        out.push_str("</p>\n");
    }

    Ok(out)
}

/// Whether a line starts a non-paragraph block.
fn opens_block(line: &str) -> bool {
    fence_open(line).is_some()
        || heading(line).is_some()
        || is_rule(line)
        || line.trim_start().starts_with('>')
        || unordered_item(line).is_some()
        || ordered_item(line).is_some()
}

/// Opening fence: three or more backticks plus an optional info string.
fn fence_open(line: &str) -> Option<(usize, &str)> {
    let fence_len = line.bytes().take_while(|&b| b == b'`').count();
    if fence_len < 3 {
        return None;
    }
    let info = line[fence_len..].trim();
    // info strings never contain backticks; `` ```a`b`` `` is inline code
    if info.contains('`') {
        return None;
    }
    Some((fence_len, info))
}

/// Closing fence: at least as many backticks as the opener, nothing else.
fn fence_close(line: &str, open_len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= open_len && trimmed.bytes().all(|b| b == b'`')
}

/// ATX heading: 1-6 `#` followed by a space.
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    rest.strip_prefix(' ').map(|text| (level, text.trim()))
}

/// Thematic break: a line of three or more `-`, `*` or `_`.
fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3
        && (trimmed.bytes().all(|b| b == b'-')
            || trimmed.bytes().all(|b| b == b'*')
            || trimmed.bytes().all(|b| b == b'_'))
}

/// `- item` or `* item` (the space is required, so `*emphasis*` is safe).
fn unordered_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .map(str::trim)
}

/// `1. item` style ordered list entry.
fn ordered_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    trimmed[digits..].strip_prefix(". ").map(str::trim)
}

fn strip_quote_marker(line: &str) -> &str {
    let rest = line.strip_prefix('>').unwrap_or(line);
    rest.strip_prefix(' ').unwrap_or(rest)
}

fn push_code_block(out: &mut String, body: &[&str], info: &str, opts: &MarkdownConfig) {
    let lang = info.split_whitespace().next().unwrap_or_default();
    if lang.is_empty() {
        out.push_str("<pre><code>");
    } else {
        out.push_str("<pre><code class=\"");
        out.push_str(&escape_html(&opts.lang_prefix));
        out.push_str(&escape_html(lang));
        out.push_str("\">");
    }
    for line in body {
        out.push_str(&escape_html(line));
        out.push('\n');
    }
    out.push_str("</code></pre>\n");
}

fn push_heading(out: &mut String, level: usize, text: &str, opts: &MarkdownConfig) {
    let id = if opts.heading_ids {
        slug::slugify(text)
    } else {
        String::new()
    };

    if id.is_empty() {
        out.push_str(&format!("<h{level}>"));
    } else {
        out.push_str(&format!("<h{level} id=\"{id}\">"));
    }
    out.push_str(&inline::convert_inline(text));
    out.push_str(&format!("</h{level}>\n"));
}

fn push_list_item(out: &mut String, item: &str) {
    out.push_str("<li>");
    out.push_str(&inline::convert_inline(item));
    out.push_str("</li>\n");
}
