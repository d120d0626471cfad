//! Aggregate post index page.
//!
//! Lists every built post newest first and writes the result to
//! `<output>/<posts>/index.html`, rendered through the configured index
//! layout when that layout exists.

use super::sorted_posts;
use crate::{
    build::BuiltPage,
    config::SiteConfig,
    content::{Document, Metadata, Value},
    layout::LayoutStore,
    log,
    markup::escape_html,
    utils::fs,
};
use anyhow::Result;

/// Title given to the generated index document.
const INDEX_TITLE: &str = "Posts";

/// Generate and write the post index page.
pub fn build_index(
    config: &SiteConfig,
    layouts: &LayoutStore,
    pages: &[BuiltPage],
) -> Result<()> {
    let index_path = config
        .build
        .output
        .join(&config.build.posts)
        .join("index.html");

    // A `url:` override can point a source document at this exact path
    // (nested index.md files map to their own directory, so they never
    // collide); hand-written pages win over generated ones.
    if let Some(page) = pages.iter().find(|p| p.paths.html == index_path) {
        log!(
            "warn";
            "index generation skipped: `{}` already provides `{}`",
            page.doc.source.display(),
            index_path.display()
        );
        return Ok(());
    }

    let posts = sorted_posts(pages, config);
    let list = render_list(&posts);

    let layout_name = &config.build.index.layout;
    let html = if layouts.contains(layout_name) {
        let doc = index_document(layout_name);
        layouts.render(&doc, &list, config)?
    } else {
        list
    };

    fs::write_file(&index_path, html.as_bytes())?;
    log!("index"; "{} post(s) listed", posts.len());
    Ok(())
}

/// Synthetic document carrying the index layout and title.
fn index_document(layout: &str) -> Document {
    let mut meta = Metadata::new();
    meta.insert("layout".into(), Value::Scalar(layout.to_owned()));
    meta.insert("title".into(), Value::Scalar(INDEX_TITLE.to_owned()));
    Document {
        source: "index".into(),
        meta,
        raw_body: String::new(),
        body_line: 0,
    }
}

fn render_list(posts: &[&BuiltPage]) -> String {
    let mut out = String::from("<ul class=\"post-list\">\n");
    for page in posts {
        let title = page.doc.title().unwrap_or(&page.paths.relative);

        out.push_str("<li>");
        if let Some(date) = page.doc.date() {
            let ymd = date.format_ymd();
            out.push_str(&format!("<time datetime=\"{ymd}\">{ymd}</time> "));
        }
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&page.paths.url_path),
            escape_html(title)
        ));
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
    out
}
