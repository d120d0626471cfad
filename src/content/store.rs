//! Content discovery and parallel parsing.

use super::Document;
use crate::{config::SiteConfig, error::ParseError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File extensions treated as markdown content.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Outcome of content discovery.
///
/// Parse failures are collected, not propagated: one malformed document
/// must not stop the rest of the build.
#[derive(Debug, Default)]
pub struct Discovered {
    pub documents: Vec<Document>,
    pub failures: Vec<ParseError>,
    /// Draft documents excluded from this build.
    pub drafts: usize,
}

/// Discover and parse every published document under the content directory.
pub fn collect(config: &SiteConfig) -> Discovered {
    let files = collect_files(&config.build.content);

    let results: Vec<Result<Document, ParseError>> =
        files.par_iter().map(|path| Document::from_path(path)).collect();

    let mut discovered = Discovered::default();
    for result in results {
        match result {
            Ok(doc) if doc.draft() && !config.build.drafts => discovered.drafts += 1,
            Ok(doc) => discovered.documents.push(doc),
            Err(err) => discovered.failures.push(err),
        }
    }

    discovered
}

/// Enumerate markdown files, sorted for deterministic ordering.
///
/// Dotfiles and `_`-prefixed names (files or whole directories) are
/// non-published and skipped.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || is_published(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|path| is_markdown(path))
        .collect()
}

fn is_published(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_none_or(|name| !name.starts_with('.') && !name.starts_with('_'))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config_for(content: &Path) -> SiteConfig {
        let mut config = SiteConfig::from_str("").unwrap();
        config.build.content = content.to_path_buf();
        config
    }

    #[test]
    fn test_collect_files_filters_non_published() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "home");
        write(dir.path(), "posts/hello.md", "post");
        write(dir.path(), "posts/.hidden.md", "hidden");
        write(dir.path(), "_drafts/wip.md", "draft dir");
        write(dir.path(), "assets/style.css", "not markdown");
        write(dir.path(), "notes.markdown", "alt extension");

        let files = collect_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(names, vec!["index.md", "notes.markdown", "posts/hello.md"]);
    }

    #[test]
    fn test_collect_accumulates_failures() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.md", "---\ntitle: Good\n---\nbody\n");
        write(dir.path(), "bad.md", "---\ntitle: Never Closed\n");

        let discovered = collect(&config_for(dir.path()));

        assert_eq!(discovered.documents.len(), 1);
        assert_eq!(discovered.documents[0].title(), Some("Good"));
        assert_eq!(discovered.failures.len(), 1);
        assert!(discovered.failures[0].path().ends_with("bad.md"));
    }

    #[test]
    fn test_drafts_excluded_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "live.md", "---\ntitle: Live\n---\n");
        write(dir.path(), "wip.md", "---\ntitle: WIP\ndraft: true\n---\n");

        let mut config = config_for(dir.path());
        let discovered = collect(&config);
        assert_eq!(discovered.documents.len(), 1);
        assert_eq!(discovered.drafts, 1);

        config.build.drafts = true;
        let discovered = collect(&config);
        assert_eq!(discovered.documents.len(), 2);
        assert_eq!(discovered.drafts, 0);
    }

    #[test]
    fn test_collect_is_deterministically_ordered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.md", "b");
        write(dir.path(), "a.md", "a");
        write(dir.path(), "c.md", "c");

        let first = collect_files(dir.path());
        let second = collect_files(dir.path());
        assert_eq!(first, second);
        assert!(first[0].ends_with("a.md"));
    }
}
