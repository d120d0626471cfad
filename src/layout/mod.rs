//! Layout templates and chain rendering.
//!
//! A layout is an HTML file in the layouts directory with `{{ ... }}`
//! placeholders. Its own front matter may name a parent layout, forming a
//! chain:
//!
//! ```text
//! document body -> post.html -> default.html (no parent)
//! ```
//!
//! Rendering substitutes `{{ content }}` at each step and wraps outward
//! until a layout without a parent terminates the chain. Parent references
//! are an explicit mapping lookup, never dispatch; chains are validated to
//! be acyclic when the store loads, so a cycle aborts the build before any
//! document renders.

use crate::{
    config::{ConfigError, SiteConfig},
    content::Document,
    markup::escape_html,
};
use regex::{Captures, Regex};
use std::{collections::BTreeMap, fs, path::Path, sync::LazyLock};

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[ \t]*([A-Za-z0-9_.-]+)[ \t]*\}\}").unwrap());

/// A named layout template.
#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    /// Parent layout wrapping this one, from the layout's own front matter.
    pub parent: Option<String>,
    /// Template text with placeholders.
    pub template: String,
}

/// All layouts of a site, keyed by name.
#[derive(Debug, Default)]
pub struct LayoutStore {
    layouts: BTreeMap<String, Layout>,
}

impl LayoutStore {
    /// Load every `.html` layout from a directory.
    ///
    /// A missing directory yields an empty store: documents without a
    /// `layout:` key render bare, and any named layout becomes a
    /// `LayoutNotFound` for the documents naming it.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut layouts = BTreeMap::new();
        if !dir.is_dir() {
            return Ok(Self { layouts });
        }

        let entries = fs::read_dir(dir).map_err(|e| ConfigError::Io(dir.to_path_buf(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io(dir.to_path_buf(), e))?;
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "html") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned)
            else {
                continue;
            };

            let text =
                fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
            // A malformed layout is structural, unlike a malformed document.
            let parsed = Document::parse(&path, &text)
                .map_err(|e| ConfigError::Validation(format!("layout `{name}`: {e}")))?;

            layouts.insert(
                name.clone(),
                Layout {
                    name,
                    parent: parsed.layout().map(str::to_owned),
                    template: parsed.raw_body,
                },
            );
        }

        Ok(Self { layouts })
    }

    /// Validate that every chain terminates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.layouts.keys() {
            match self.chain(name) {
                Ok(_) => {}
                // A dangling parent only matters if something renders
                // through it; cycles poison the whole store.
                Err(ConfigError::LayoutNotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Resolve the layout chain starting at `name`, innermost first.
    pub fn chain(&self, name: &str) -> Result<Vec<&Layout>, ConfigError> {
        let mut chain = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        let mut current = Some(name);

        while let Some(n) = current {
            if seen.contains(&n) {
                let mut cycle: Vec<String> = seen.iter().map(|s| (*s).to_owned()).collect();
                cycle.push(n.to_owned());
                return Err(ConfigError::LayoutCycle(cycle));
            }
            let layout = self
                .layouts
                .get(n)
                .ok_or_else(|| ConfigError::LayoutNotFound(n.to_owned()))?;
            seen.push(&layout.name);
            chain.push(layout);
            current = layout.parent.as_deref();
        }

        Ok(chain)
    }

    /// Render a document body through its layout chain.
    ///
    /// Documents without a `layout:` key pass through unchanged.
    pub fn render(
        &self,
        doc: &Document,
        body_html: &str,
        config: &SiteConfig,
    ) -> Result<String, ConfigError> {
        let Some(name) = doc.layout() else {
            return Ok(body_html.to_owned());
        };

        let mut rendered = body_html.to_owned();
        for layout in self.chain(name)? {
            rendered = substitute(&layout.template, &rendered, doc, config);
        }
        Ok(rendered)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

/// Replace `{{ key }}` placeholders in one template.
///
/// The substituted content is inserted literally and never rescanned, so
/// placeholder-looking text inside a document body stays as written.
fn substitute(template: &str, content: &str, doc: &Document, config: &SiteConfig) -> String {
    RE_PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            resolve(&caps[1], content, doc, config)
        })
        .into_owned()
}

/// Resolve a placeholder key. Unknown keys render empty.
fn resolve(key: &str, content: &str, doc: &Document, config: &SiteConfig) -> String {
    match key {
        "content" => content.to_owned(),
        "title" | "page.title" => escape_html(doc.title().unwrap_or_default()),
        "page.date" => doc.date().map(|d| d.format_ymd()).unwrap_or_default(),
        "site.title" => escape_html(&config.base.title),
        "site.description" => escape_html(&config.base.description),
        "site.author" => escape_html(&config.base.author),
        "site.language" => escape_html(&config.base.language),
        "site.url" => escape_html(config.base.url.as_deref().unwrap_or_default()),
        _ => key
            .strip_prefix("page.")
            .and_then(|k| doc.meta.get(k))
            .map(|v| escape_html(&v.join()))
            .unwrap_or_default(),
    }
}
