//! Site build orchestration.
//!
//! The pipeline: validate config, load layouts, discover content, render
//! every document in parallel, then generate the aggregate outputs (post
//! index, rss feed).
//!
//! Failure handling follows two tracks. Structural problems (bad config,
//! a layout cycle, an unwritable output directory) abort the build.
//! Per-document problems (malformed front matter, an unterminated fence,
//! a missing layout) skip that document, log it, and let every sibling
//! build; `--strict` turns a non-empty skip list into a fatal error after
//! the full list has been reported.

use crate::{
    config::{ConfigError, SiteConfig},
    content::{self, DocPaths, Document},
    error::{BuildReport, ParseError},
    generator,
    layout::LayoutStore,
    log,
    logger::Progress,
    markup,
    utils::fs as outfs,
};
use anyhow::{Result, bail};
use rayon::prelude::*;
use std::time::Instant;

/// A document rendered to disk, with everything the aggregate
/// generators need.
#[derive(Debug)]
pub struct BuiltPage {
    pub doc: Document,
    pub paths: DocPaths,
}

/// Why a single document failed while the rest of the build continues.
enum PageError {
    Parse(ParseError),
    Config(ConfigError),
    /// Not attributable to the document's content (e.g. output IO).
    Fatal(anyhow::Error),
}

/// Build the whole site.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let started = Instant::now();

    config.validate()?;

    let layouts = LayoutStore::load(&config.build.layouts)?;
    layouts.validate()?;
    log!("layouts"; "{} layout(s) loaded", layouts.len());

    if config.build.clean {
        outfs::clean_dir(&config.build.output)?;
    }

    let discovered = content::store::collect(config);
    if discovered.drafts > 0 {
        log!("drafts"; "{} draft(s) excluded", discovered.drafts);
    }

    let mut report = BuildReport::default();
    for failure in discovered.failures {
        log!("skip"; "{failure}");
        report.skip(failure.path().to_owned(), failure.to_string());
    }

    let progress = Progress::new("build", discovered.documents.len());
    let results: Vec<(Document, Result<DocPaths, PageError>)> = discovered
        .documents
        .into_par_iter()
        .map(|doc| {
            let outcome = compile_document(&doc, &layouts, config);
            progress.inc();
            (doc, outcome)
        })
        .collect();
    progress.finish();

    let mut pages = Vec::with_capacity(results.len());
    for (doc, outcome) in results {
        match outcome {
            Ok(paths) => {
                report.built += 1;
                pages.push(BuiltPage { doc, paths });
            }
            Err(PageError::Parse(err)) => {
                log!("skip"; "{err}");
                report.skip(doc.source, err.to_string());
            }
            Err(PageError::Config(err)) if !err.is_structural() => {
                log!("skip"; "`{}`: {err}", doc.source.display());
                report.skip(doc.source, err.to_string());
            }
            Err(PageError::Config(err)) => return Err(err.into()),
            Err(PageError::Fatal(err)) => return Err(err),
        }
    }

    if config.build.index.enable {
        generator::index::build_index(config, &layouts, &pages)?;
    }
    generator::rss::build_rss(config, &pages)?;

    log!(
        "build";
        "{} page(s) built in {:.2}s",
        report.built,
        started.elapsed().as_secs_f32()
    );

    if !report.is_clean() {
        log!("warn"; "{} document(s) skipped", report.skipped.len());
        if config.build.strict {
            bail!(
                "strict mode: {} document(s) failed to build",
                report.skipped.len()
            );
        }
    }

    Ok(report)
}

/// Render one document to its output file.
fn compile_document(
    doc: &Document,
    layouts: &LayoutStore,
    config: &SiteConfig,
) -> Result<DocPaths, PageError> {
    let paths = doc.paths(config).map_err(PageError::Fatal)?;

    let body_html = markup::convert(
        &doc.source,
        &doc.raw_body,
        doc.body_line,
        &config.build.markdown,
    )
    .map_err(PageError::Parse)?;

    let html = layouts
        .render(doc, &body_html, config)
        .map_err(PageError::Config)?;

    outfs::write_file(&paths.html, html.as_bytes()).map_err(PageError::Fatal)?;

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::from_str(
            r#"
            [base]
            title = "Test Site"
        "#,
        )
        .unwrap();
        config.build.content = root.join("content");
        config.build.layouts = root.join("layouts");
        config.build.output = root.join("public");
        config
    }

    fn scaffold(root: &Path) {
        write(
            root,
            "layouts/default.html",
            "<html><body>{{ content }}</body></html>",
        );
        write(
            root,
            "layouts/post.html",
            "---\nlayout: default\n---\n<article><h1>{{ title }}</h1>{{ content }}</article>",
        );
        write(
            root,
            "layouts/archive.html",
            "---\nlayout: default\n---\n<section>{{ content }}</section>",
        );
    }

    #[test]
    fn test_full_site_build() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(
            dir.path(),
            "content/index.md",
            "---\nlayout: default\ntitle: Home\n---\n# Welcome\n",
        );
        write(
            dir.path(),
            "content/posts/2022-04-27-hello.md",
            "---\nlayout: post\ntitle: Hello\n---\nfirst post\n",
        );

        let config = site(dir.path());
        let report = build_site(&config).unwrap();

        assert_eq!(report.built, 2);
        assert!(report.is_clean());

        let home = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(home.contains("<h1 id=\"welcome\">Welcome</h1>"));
        assert!(home.starts_with("<html>"));

        let post =
            fs::read_to_string(dir.path().join("public/posts/hello/index.html")).unwrap();
        assert!(post.contains("<h1>Hello</h1>"));
        assert!(post.contains("<p>first post</p>"));
    }

    #[test]
    fn test_malformed_document_skips_but_siblings_build() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(
            dir.path(),
            "content/posts/good.md",
            "---\nlayout: post\ntitle: Good\n---\nfine\n",
        );
        write(
            dir.path(),
            "content/posts/broken.md",
            "---\nlayout: post\ntitle: Broken\n---\n```rust\nnever closed\n",
        );

        let config = site(dir.path());
        let report = build_site(&config).unwrap();

        assert_eq!(report.built, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].source.ends_with("broken.md"));
        assert!(report.skipped[0].reason.contains("unterminated code fence"));

        assert!(dir.path().join("public/posts/good/index.html").exists());
        assert!(!dir.path().join("public/posts/broken").exists());
    }

    #[test]
    fn test_missing_layout_skips_only_that_document() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(
            dir.path(),
            "content/posts/orphan.md",
            "---\nlayout: ghost\ntitle: Orphan\n---\nbody\n",
        );
        write(
            dir.path(),
            "content/posts/fine.md",
            "---\nlayout: post\ntitle: Fine\n---\nbody\n",
        );

        let report = build_site(&site(dir.path())).unwrap();

        assert_eq!(report.built, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("ghost"));
    }

    #[test]
    fn test_strict_mode_fails_on_skips() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(dir.path(), "content/bad.md", "---\ntitle: Never Closed\n");
        write(
            dir.path(),
            "content/ok.md",
            "---\nlayout: default\ntitle: Ok\n---\nbody\n",
        );

        let mut config = site(dir.path());
        config.build.strict = true;

        let err = build_site(&config).unwrap_err().to_string();
        assert!(err.contains("strict mode"));
        // the sibling still built before the failure was raised
        assert!(dir.path().join("public/ok/index.html").exists());
    }

    #[test]
    fn test_layout_cycle_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "layouts/a.html",
            "---\nlayout: b\n---\n{{ content }}",
        );
        write(
            dir.path(),
            "layouts/b.html",
            "---\nlayout: a\n---\n{{ content }}",
        );
        write(dir.path(), "content/page.md", "body\n");

        let err = build_site(&site(dir.path())).unwrap_err();
        assert!(err.to_string().contains("layout cycle"));
        assert!(!dir.path().join("public/page/index.html").exists());
    }

    #[test]
    fn test_index_lists_posts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(
            dir.path(),
            "content/posts/older.md",
            "---\nlayout: post\ntitle: Older\ndate: 2021-10-15\n---\n",
        );
        write(
            dir.path(),
            "content/posts/newer.md",
            "---\nlayout: post\ntitle: Newer\ndate: 2022-04-27\n---\n",
        );

        build_site(&site(dir.path())).unwrap();

        let index =
            fs::read_to_string(dir.path().join("public/posts/index.html")).unwrap();
        let newer = index.find("Newer").unwrap();
        let older = index.find("Older").unwrap();
        assert!(newer < older);
        assert!(index.contains("<section>"));
        assert!(index.contains("href=\"/posts/newer/\""));
    }

    #[test]
    fn test_index_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(
            dir.path(),
            "content/posts/one.md",
            "---\nlayout: post\ntitle: One\ndate: 2022-01-01\n---\n",
        );

        let mut config = site(dir.path());
        config.build.index.enable = false;
        build_site(&config).unwrap();

        assert!(!dir.path().join("public/posts/index.html").exists());
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(dir.path(), "public/stale/index.html", "old page");
        write(
            dir.path(),
            "content/fresh.md",
            "---\nlayout: default\ntitle: Fresh\n---\nnew\n",
        );

        let mut config = site(dir.path());
        config.build.clean = true;
        build_site(&config).unwrap();

        assert!(!dir.path().join("public/stale").exists());
        assert!(dir.path().join("public/fresh/index.html").exists());
    }

    #[test]
    fn test_rss_feed_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write(
            dir.path(),
            "content/posts/hello.md",
            "---\nlayout: post\ntitle: Hello Feed\ndate: 2022-04-27\ndescription: a first post\n---\nbody\n",
        );

        let mut config = site(dir.path());
        config.base.url = Some("https://example.com".into());
        config.build.rss.enable = true;
        build_site(&config).unwrap();

        let feed = fs::read_to_string(dir.path().join("public/feed.xml")).unwrap();
        assert!(feed.contains("<title>Hello Feed</title>"));
        assert!(feed.contains("https://example.com/posts/hello/"));
        assert!(feed.contains("Wed, 27 Apr 2022"));
    }
}
