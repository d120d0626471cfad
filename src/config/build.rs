//! `[build]` section configuration.
//!
//! Build paths, slug mode, markdown options, index and rss generation.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How output path components are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Transliterate to a lowercase ascii slug.
    #[default]
    On,
    /// Only strip characters that are unsafe in paths.
    Safe,
    /// Keep path components verbatim.
    No,
}

/// `[build]` section in sumi.toml.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"
/// layouts = "layouts"
/// output = "public"
///
/// [build.rss]
/// enable = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root (resolved from the CLI, never from the config file).
    #[serde(skip)]
    pub root: Option<PathBuf>,

    /// Content directory containing markdown documents.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Layout template directory.
    #[serde(default = "defaults::build::layouts")]
    #[educe(Default = defaults::build::layouts())]
    pub layouts: PathBuf,

    /// Output directory for rendered files.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Subdirectory of `content` whose documents are posts.
    #[serde(default = "defaults::build::posts")]
    #[educe(Default = defaults::build::posts())]
    pub posts: PathBuf,

    /// Clean the output directory before building.
    #[serde(default)]
    pub clean: bool,

    /// Include documents marked `draft: true`.
    #[serde(default)]
    pub drafts: bool,

    /// Treat per-document failures as fatal.
    #[serde(default)]
    pub strict: bool,

    /// Slug mode for output paths.
    #[serde(default)]
    pub slug: SlugMode,

    /// Markdown conversion options.
    #[serde(default)]
    pub markdown: MarkdownConfig,

    /// Post index page generation.
    #[serde(default)]
    pub index: IndexConfig,

    /// rss feed generation.
    #[serde(default)]
    pub rss: RssConfig,
}

/// `[build.markdown]` - markup conversion options.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Emit slug `id` attributes on headings.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub heading_ids: bool,

    /// Class prefix for fenced code block languages
    /// (`language-rust` for ` ```rust `).
    #[serde(default = "defaults::build::markdown::lang_prefix")]
    #[educe(Default = defaults::build::markdown::lang_prefix())]
    pub lang_prefix: String,
}

/// `[build.index]` - chronological post index page.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Layout the listing is rendered through.
    #[serde(default = "defaults::build::index::layout")]
    #[educe(Default = defaults::build::index::layout())]
    pub layout: String,
}

/// `[build.rss]` - feed generation.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RssConfig {
    #[serde(default)]
    pub enable: bool,

    /// Feed path relative to the output directory.
    #[serde(default = "defaults::build::rss::path")]
    #[educe(Default = defaults::build::rss::path())]
    pub path: PathBuf,
}
