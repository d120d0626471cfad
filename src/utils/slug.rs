//! URL slugification and output path sanitizing.

use crate::config::SlugMode;
use deunicode::deunicode;
use std::path::{Path, PathBuf};

/// Characters never allowed in output paths, regardless of slug mode.
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '\\', '"', '\t', '\r', '\n',
];

/// Convert text to a lowercase ascii slug.
///
/// Unicode is transliterated first, then every run of non-alphanumeric
/// characters collapses to a single `-`.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Apply the configured slug mode to each component of a relative path.
pub fn slugify_path(path: &Path, mode: SlugMode) -> PathBuf {
    match mode {
        SlugMode::On => path
            .components()
            .map(|c| slugify(&c.as_os_str().to_string_lossy()))
            .collect(),
        SlugMode::Safe => path
            .components()
            .map(|c| sanitize_text(&c.as_os_str().to_string_lossy()))
            .collect(),
        SlugMode::No => path.to_path_buf(),
    }
}

/// Remove forbidden characters and replace whitespace with underscores.
fn sanitize_text(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
