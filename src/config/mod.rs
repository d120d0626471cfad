//! Site configuration management for `sumi.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                       |
//! |-------------|-----------------------------------------------|
//! | `[base]`    | Site metadata (title, author, url)            |
//! | `[build]`   | Build paths, slug mode, markdown, index, rss  |
//! | `[extra]`   | User-defined custom fields                    |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "My Blog"
//! description = "a personal blog"
//! url = "https://example.com"
//!
//! [build]
//! content = "content"
//! output = "public"
//!
//! [build.rss]
//! enable = true
//!
//! [extra]
//! favicon = "/favicon.ico"
//! ```

mod base;
mod build;
pub mod defaults;
mod error;

// Re-export public types used by other modules
pub use build::{BuildConfig, MarkdownConfig, SlugMode};
pub use error::ConfigError;

use crate::cli::Cli;
use anyhow::{Result, bail};
use base::BaseConfig;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing sumi.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf());
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.expect("CLI reference set during load")
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.set_root(&root);
        self.update_path_with_root(&root);

        let build_args = cli.build_args();
        if build_args.strict {
            self.build.strict = true;
        }
        if build_args.clean {
            self.build.clean = true;
        }
        if build_args.drafts {
            self.build.drafts = true;
        }
        Self::update_option(&mut self.build.rss.enable, build_args.rss.as_ref());
        if let Some(url) = &build_args.base_url {
            self.base.url = Some(url.clone());
        }
    }

    /// Validate configuration consistency.
    ///
    /// Structural problems here abort the build before any file is read.
    pub fn validate(&self) -> Result<()> {
        let build = &self.build;

        if build.output == build.content || build.output.starts_with(&build.content) {
            bail!(ConfigError::Validation(format!(
                "output directory `{}` must not be inside the content directory",
                build.output.display()
            )));
        }
        if build.output == build.layouts {
            bail!(ConfigError::Validation(
                "output and layouts directories must differ".into()
            ));
        }
        if build.rss.enable && self.base.url.is_none() {
            bail!(ConfigError::Validation(
                "`base.url` is required when `[build.rss].enable = true`".into()
            ));
        }

        Ok(())
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Apply CLI overrides first
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.layouts, cli.layouts.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        let root = Self::normalize_path(root, None);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&self.config_path, Some(&root));
        self.build.content = Self::normalize_path(&self.build.content, Some(&root));
        self.build.layouts = Self::normalize_path(&self.build.layouts, Some(&root));
        self.build.output = Self::normalize_path(&self.build.output, Some(&root));
    }

    /// Resolve a path against a base directory (or the process cwd).
    fn normalize_path(path: &Path, base: Option<&Path>) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match base {
            Some(base) => base.join(path),
            None => env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf()),
        }
    }
}
