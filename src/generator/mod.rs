//! Aggregate output generation: the post index page and the rss feed.
//!
//! Both consume the pages the build already rendered, so a post skipped
//! for a parse failure never appears in either aggregate.

pub mod index;
pub mod rss;

use crate::{build::BuiltPage, config::SiteConfig};
use std::cmp::Reverse;

/// Posts ordered newest first; ties and undated posts fall back to
/// source path order, so the listing is stable across rebuilds.
pub fn sorted_posts<'a>(pages: &'a [BuiltPage], config: &SiteConfig) -> Vec<&'a BuiltPage> {
    let mut posts: Vec<&BuiltPage> = pages
        .iter()
        .filter(|page| page.doc.is_post(config))
        .collect();
    posts.sort_by_key(|page| (Reverse(page.doc.date()), page.doc.source.clone()));
    posts
}
