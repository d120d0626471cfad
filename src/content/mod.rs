//! Content documents and front matter parsing.
//!
//! A document is a markdown file with an optional leading front matter
//! block:
//!
//! ```text
//! ---
//! layout: post
//! title: Benchmarking a Database Driver
//! date: 2022-04-27
//! tags: [rust, benchmarks]
//! ---
//! body text...
//! ```
//!
//! The block is `key: value` lines between two `---` delimiter lines.
//! A file without an opening delimiter has empty metadata and its whole
//! content as body. An opening delimiter that is never closed is a
//! [`ParseError`] for that document only.

pub mod store;

use crate::{
    config::SiteConfig,
    error::ParseError,
    utils::{date::DateTimeUtc, slug},
};
use anyhow::{Result, anyhow};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Delimiter line opening and closing a front matter block.
pub const FRONT_MATTER_DELIMITER: &str = "---";

/// A front matter value: bare scalar or bracketed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Render for template substitution: lists join with ", ".
    pub fn join(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

/// Front matter metadata. Ordered map so iteration is deterministic.
pub type Metadata = BTreeMap<String, Value>;

/// Computed output locations for a document.
///
/// Pure function of source path + metadata + config; recomputed on every
/// build and never persisted.
#[derive(Debug, Clone)]
pub struct DocPaths {
    /// Output HTML file path.
    pub html: PathBuf,
    /// Relative path without extension (for logging).
    pub relative: String,
    /// URL path component with trailing slash (e.g., `/posts/hello/`).
    pub url_path: String,
    /// Full URL including base (e.g., `https://example.com/posts/hello/`).
    pub full_url: String,
}

/// A parsed source document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source file path.
    pub source: PathBuf,
    /// Parsed front matter.
    pub meta: Metadata,
    /// Body text after the front matter block.
    pub raw_body: String,
    /// 0-based line offset of the body within the source file,
    /// so converter errors can report file line numbers.
    pub body_line: usize,
}

impl Document {
    /// Read and parse a document from disk.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse front matter and body from file content.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ParseError> {
        let Some(first_line) = text.split_inclusive('\n').next() else {
            return Ok(Self {
                source: path.to_path_buf(),
                meta: Metadata::new(),
                raw_body: String::new(),
                body_line: 0,
            });
        };

        // No opening delimiter: the entire file is body.
        if trim_line(first_line) != FRONT_MATTER_DELIMITER {
            return Ok(Self {
                source: path.to_path_buf(),
                meta: Metadata::new(),
                raw_body: text.to_owned(),
                body_line: 0,
            });
        }

        let block_start = first_line.len();
        let mut offset = block_start;
        let mut closed = None;
        for line in text[block_start..].split_inclusive('\n') {
            if trim_line(line) == FRONT_MATTER_DELIMITER {
                closed = Some((offset, offset + line.len()));
                break;
            }
            offset += line.len();
        }

        let Some((block_end, body_start)) = closed else {
            return Err(ParseError::UnterminatedFrontMatter {
                path: path.to_path_buf(),
            });
        };

        let block = &text[block_start..block_end];
        let meta = parse_metadata(path, block)?;

        Ok(Self {
            source: path.to_path_buf(),
            meta,
            raw_body: text[body_start..].to_owned(),
            // opening delimiter + block lines + closing delimiter
            body_line: 2 + block.lines().count(),
        })
    }

    /// Scalar metadata lookup.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }

    /// Layout name this document renders through.
    pub fn layout(&self) -> Option<&str> {
        self.meta_str("layout")
    }

    pub fn title(&self) -> Option<&str> {
        self.meta_str("title")
    }

    pub fn draft(&self) -> bool {
        self.meta_str("draft") == Some("true")
    }

    /// Publish date from `date:` front matter, falling back to a
    /// `YYYY-MM-DD-` filename prefix.
    pub fn date(&self) -> Option<DateTimeUtc> {
        self.meta_str("date")
            .and_then(DateTimeUtc::parse)
            .or_else(|| date_from_stem(self.file_stem()))
    }

    /// Whether this document lives under the posts subdirectory.
    pub fn is_post(&self, config: &SiteConfig) -> bool {
        self.source
            .strip_prefix(&config.build.content)
            .map(|rel| rel.starts_with(&config.build.posts))
            .unwrap_or(false)
    }

    /// Compute output paths for this document.
    pub fn paths(&self, config: &SiteConfig) -> Result<DocPaths> {
        let content_dir = &config.build.content;
        let output_dir = &config.build.output;

        let rel = self.source.strip_prefix(content_dir).map_err(|_| {
            anyhow!(
                "File is not in content directory: {}",
                self.source.display()
            )
        })?;
        let stem = strip_date_prefix(self.file_stem());
        let relative = rel.parent().unwrap_or(Path::new("")).join(stem);
        let relative_str = relative.to_string_lossy().replace('\\', "/");

        // content/index.md is the site home page, not a `index/` directory
        let is_root_index = relative_str == "index";

        let html = if let Some(url) = self.meta_str("url") {
            let trimmed = url.trim_matches('/');
            if trimmed.is_empty() {
                output_dir.join("index.html")
            } else {
                output_dir
                    .join(slug::slugify_path(Path::new(trimmed), config.build.slug))
                    .join("index.html")
            }
        } else if is_root_index {
            output_dir.join("index.html")
        } else {
            output_dir
                .join(slug::slugify_path(&relative, config.build.slug))
                .join("index.html")
        };

        // Derive the URL from the final html path so both always agree.
        let rel_out = html
            .strip_prefix(output_dir)
            .map_err(|_| anyhow!("Path is not in output directory: {}", html.display()))?;
        let mut url_path = format!("/{}", rel_out.to_string_lossy().replace('\\', "/"));
        if let Some(stripped) = url_path.strip_suffix("index.html") {
            url_path = stripped.to_owned();
        }

        let base_url = config
            .base
            .url
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/');
        let full_url = format!("{base_url}{url_path}");

        Ok(DocPaths {
            html,
            relative: relative_str,
            url_path,
            full_url,
        })
    }

    fn file_stem(&self) -> &str {
        self.source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

/// Strip a trailing `\n` / `\r\n` from a line segment.
fn trim_line(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Parse `key: value` lines of a front matter block.
///
/// Line numbers in errors are 1-based file lines (the block starts at
/// line 2, after the opening delimiter).
fn parse_metadata(path: &Path, block: &str) -> Result<Metadata, ParseError> {
    let mut meta = Metadata::new();

    for (i, raw_line) in block.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(ParseError::FrontMatter {
                path: path.to_path_buf(),
                line: i + 2,
                reason: "missing `:` separator".into(),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::FrontMatter {
                path: path.to_path_buf(),
                line: i + 2,
                reason: "empty key".into(),
            });
        }

        meta.insert(key.to_owned(), parse_value(value.trim()));
    }

    Ok(meta)
}

/// Parse a value: `[a, b, c]` is a list, anything else a scalar.
fn parse_value(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('[') && raw.ends_with(']') {
        let items = raw[1..raw.len() - 1]
            .split(',')
            .map(|item| unquote(item.trim()).to_owned())
            .filter(|item| !item.is_empty())
            .collect();
        Value::List(items)
    } else {
        Value::Scalar(unquote(raw).to_owned())
    }
}

/// Strip one level of matching single or double quotes.
fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if s.len() >= 2 {
        let (first, last) = (bytes[0], bytes[s.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Date from a `YYYY-MM-DD-` filename prefix (e.g. `2022-04-27-hello`).
fn date_from_stem(stem: &str) -> Option<DateTimeUtc> {
    if stem.len() > 11 && stem.as_bytes()[10] == b'-' {
        DateTimeUtc::parse(&stem[..10])
    } else {
        None
    }
}

/// Strip the date prefix from a post filename stem, if present.
fn strip_date_prefix(stem: &str) -> &str {
    if date_from_stem(stem).is_some() {
        &stem[11..]
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Document {
        Document::parse(Path::new("content/posts/test.md"), text).unwrap()
    }

    #[test]
    fn test_no_front_matter_keeps_whole_file_as_body() {
        let text = "# Hello\n\njust a body\n";
        let doc = parse(text);

        assert!(doc.meta.is_empty());
        assert_eq!(doc.raw_body, text);
        assert_eq!(doc.body_line, 0);
    }

    #[test]
    fn test_front_matter_scalars_and_lists() {
        let doc = parse(
            "---\nlayout: post\ntitle: \"Quoted Title\"\ntags: [rust, benchmarks]\n---\nbody\n",
        );

        assert_eq!(doc.layout(), Some("post"));
        assert_eq!(doc.title(), Some("Quoted Title"));
        assert_eq!(
            doc.meta.get("tags"),
            Some(&Value::List(vec!["rust".into(), "benchmarks".into()]))
        );
        assert_eq!(doc.raw_body, "body\n");
        assert_eq!(doc.body_line, 5);
    }

    #[test]
    fn test_unterminated_front_matter() {
        let err = Document::parse(Path::new("bad.md"), "---\ntitle: Oops\n").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedFrontMatter { .. }));
    }

    #[test]
    fn test_missing_separator_reports_line() {
        let err =
            Document::parse(Path::new("bad.md"), "---\ntitle: Fine\nnot a pair\n---\n").unwrap_err();
        match err {
            ParseError::FrontMatter { line, .. } => assert_eq!(line, 3),
            other => panic!("expected FrontMatter error, got {other:?}"),
        }
    }

    #[test]
    fn test_colon_in_value_is_preserved() {
        let doc = parse("---\ntitle: Rust: The Good Parts\n---\n");
        assert_eq!(doc.title(), Some("Rust: The Good Parts"));
    }

    #[test]
    fn test_crlf_delimiters() {
        let doc = parse("---\r\ntitle: Windows\r\n---\r\nbody\r\n");
        assert_eq!(doc.title(), Some("Windows"));
        assert_eq!(doc.raw_body, "body\r\n");
    }

    #[test]
    fn test_date_from_meta_overrides_filename() {
        let doc = Document::parse(
            Path::new("content/posts/2021-01-01-old.md"),
            "---\ndate: 2022-04-27\n---\n",
        )
        .unwrap();
        assert_eq!(doc.date().unwrap().format_ymd(), "2022-04-27");
    }

    #[test]
    fn test_date_from_filename_prefix() {
        let doc = Document::parse(Path::new("content/posts/2021-10-15-notes.md"), "body").unwrap();
        assert_eq!(doc.date().unwrap().format_ymd(), "2021-10-15");

        let doc = Document::parse(Path::new("content/about.md"), "body").unwrap();
        assert!(doc.date().is_none());
    }

    #[test]
    fn test_draft_flag() {
        assert!(parse("---\ndraft: true\n---\n").draft());
        assert!(!parse("---\ndraft: false\n---\n").draft());
        assert!(!parse("body").draft());
    }

    mod paths {
        use super::*;
        use crate::config::SiteConfig;

        fn config() -> SiteConfig {
            let mut config = SiteConfig::from_str("").unwrap();
            config.build.content = PathBuf::from("/site/content");
            config.build.output = PathBuf::from("/site/public");
            config.base.url = Some("https://example.com".into());
            config
        }

        fn doc(source: &str, text: &str) -> Document {
            Document::parse(Path::new(source), text).unwrap()
        }

        #[test]
        fn test_pretty_urls() {
            let paths = doc("/site/content/posts/hello.md", "body")
                .paths(&config())
                .unwrap();

            assert_eq!(paths.html, PathBuf::from("/site/public/posts/hello/index.html"));
            assert_eq!(paths.url_path, "/posts/hello/");
            assert_eq!(paths.full_url, "https://example.com/posts/hello/");
        }

        #[test]
        fn test_root_index() {
            let paths = doc("/site/content/index.md", "body").paths(&config()).unwrap();

            assert_eq!(paths.html, PathBuf::from("/site/public/index.html"));
            assert_eq!(paths.url_path, "/");
            assert_eq!(paths.full_url, "https://example.com/");
        }

        #[test]
        fn test_date_prefix_stripped_from_slug() {
            let paths = doc("/site/content/posts/2022-04-27-driver-bench.md", "body")
                .paths(&config())
                .unwrap();

            assert_eq!(paths.url_path, "/posts/driver-bench/");
        }

        #[test]
        fn test_url_override() {
            let paths = doc(
                "/site/content/posts/hello.md",
                "---\nurl: /special/place/\n---\n",
            )
            .paths(&config())
            .unwrap();

            assert_eq!(
                paths.html,
                PathBuf::from("/site/public/special/place/index.html")
            );
            assert_eq!(paths.url_path, "/special/place/");
        }

        #[test]
        fn test_slugified_components() {
            let paths = doc("/site/content/posts/Hello World.md", "body")
                .paths(&config())
                .unwrap();

            assert_eq!(paths.url_path, "/posts/hello-world/");
        }

        #[test]
        fn test_paths_are_deterministic() {
            let config = config();
            let document = doc("/site/content/posts/hello.md", "body");
            let first = document.paths(&config).unwrap();
            let second = document.paths(&config).unwrap();

            assert_eq!(first.html, second.html);
            assert_eq!(first.full_url, second.full_url);
        }

        #[test]
        fn test_is_post() {
            let config = config();
            assert!(doc("/site/content/posts/hello.md", "").is_post(&config));
            assert!(!doc("/site/content/about.md", "").is_post(&config));
        }
    }
}
