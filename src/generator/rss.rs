//! rss feed generation.
//!
//! Builds a validated rss channel from the built posts and writes it to
//! the configured feed path under the output directory.

use super::sorted_posts;
use crate::{build::BuiltPage, config::SiteConfig, log, utils::date::DateTimeUtc, utils::fs};
use anyhow::{Result, anyhow};
use regex::Regex;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};
use std::sync::LazyLock;

// ============================================================================
// Public API
// ============================================================================

/// Build the rss feed if enabled in config.
pub fn build_rss(config: &SiteConfig, pages: &[BuiltPage]) -> Result<()> {
    if config.build.rss.enable {
        RssFeed::build(config, pages).write(config)?;
    }
    Ok(())
}

// ============================================================================
// RssFeed Implementation
// ============================================================================

/// rss feed builder over the built posts.
struct RssFeed<'a> {
    config: &'a SiteConfig,
    posts: Vec<&'a BuiltPage>,
}

impl<'a> RssFeed<'a> {
    fn build(config: &'a SiteConfig, pages: &'a [BuiltPage]) -> Self {
        Self {
            config,
            posts: sorted_posts(pages, config),
        }
    }

    /// Generate the rss xml string.
    fn into_xml(self) -> Result<String> {
        let items: Vec<_> = self
            .posts
            .iter()
            .filter_map(|page| page_to_rss_item(page, self.config))
            .collect();

        let channel = ChannelBuilder::default()
            .title(&self.config.base.title)
            .link(self.config.base.url.as_deref().unwrap_or_default())
            .description(&self.config.base.description)
            .language(self.config.base.language.clone())
            .generator("sumi".to_string())
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| anyhow!("rss validation failed: {e}"))?;
        Ok(channel.to_string())
    }

    /// Write the rss feed to its output file.
    fn write(self, config: &SiteConfig) -> Result<()> {
        let count = self.posts.len();
        let xml = self.into_xml()?;
        let rss_path = config.build.output.join(&config.build.rss.path);

        fs::write_file(&rss_path, xml.as_bytes())?;

        log!("rss"; "{count} item(s) in {}", config.build.rss.path.display());
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a built post to an rss item.
/// Returns None if required fields (title, date) are missing.
fn page_to_rss_item(page: &BuiltPage, config: &SiteConfig) -> Option<rss::Item> {
    let title = page.doc.title()?.to_owned();
    let pub_date = page.doc.date().map(DateTimeUtc::to_rfc2822)?;
    let link = page.paths.full_url.clone();
    let author = normalize_rss_author(page.doc.meta_str("author"), config);
    let description = page.doc.meta_str("description").map(str::to_owned);

    Some(
        ItemBuilder::default()
            .title(title)
            .link(Some(link.clone()))
            .guid(GuidBuilder::default().permalink(true).value(link).build())
            .description(description)
            .pub_date(pub_date)
            .author(author)
            .build(),
    )
}

/// Normalize an author field to rss format: "email@example.com (Name)"
///
/// Priority:
/// 1. Post meta author if already in valid format
/// 2. Site config author if in valid format
/// 3. Combine site config email and author
fn normalize_rss_author(author: Option<&str>, config: &SiteConfig) -> Option<String> {
    static RE_VALID_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}[ \t]*\([^)]+\)$").unwrap()
    });

    let author = author?;

    if RE_VALID_AUTHOR.is_match(author) {
        return Some(author.to_owned());
    }

    let site_author = &config.base.author;
    if RE_VALID_AUTHOR.is_match(site_author) {
        return Some(site_author.clone());
    }

    Some(format!("{} ({})", config.base.email, site_author))
}
