//! Site configuration.
//!
//! One immutable [`PressConfig`] is built at startup and passed by reference
//! into every component: the aggregator reads the paths, the renderer reads
//! the rendering switch, and the view controller reads the view settings.
//! Nothing reads configuration from ambient globals.
//!
//! ## Config File Location
//!
//! `config.toml` at the content root, next to the documents directory:
//!
//! ```text
//! site/
//! ├── config.toml              # Optional; every key has a default
//! ├── newsletters/
//! │   ├── index.json           # Manifest: ["a.txt", "b.txt"]
//! │   ├── a.txt
//! │   └── b.txt
//! └── thumbnails/
//!     └── placeholder.png
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! manifest = "newsletters/index.json"
//! documents = "newsletters/"
//! placeholder_thumbnail = "thumbnails/placeholder.png"
//!
//! [view]
//! mode = "page"              # "page" or "overlay"
//! article_page = "article.html"
//! article_param = "article"
//! default_author = "Staff"
//! site_title = "Newsletters"
//!
//! [rendering]
//! rich_formatting = true     # CommonMark + sanitizer; false = plain paragraphs
//!
//! [loading]
//! # max_concurrent_fetches = 8   # Omit for unbounded
//! ```
//!
//! Config files are sparse and unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::view::ViewMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PressConfig {
    /// Where the manifest, documents and placeholder image live.
    pub paths: PathsConfig,
    /// Listing and article presentation.
    pub view: ViewConfig,
    /// Body rendering capabilities.
    pub rendering: RenderingConfig,
    /// Retrieval fan-out.
    pub loading: LoadingConfig,
}

impl PressConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.manifest.trim().is_empty() {
            return Err(ConfigError::Validation(
                "paths.manifest must not be empty".into(),
            ));
        }
        for (key, value) in [
            ("paths.manifest", &self.paths.manifest),
            ("paths.documents", &self.paths.documents),
        ] {
            if value.contains("..") || value.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a relative path inside the content root"
                )));
            }
        }
        if self.view.article_param.trim().is_empty() {
            return Err(ConfigError::Validation(
                "view.article_param must not be empty".into(),
            ));
        }
        if self.loading.max_concurrent_fetches == Some(0) {
            return Err(ConfigError::Validation(
                "loading.max_concurrent_fetches must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Retrieval path of a newsletter, relative to the content root.
    ///
    /// `filename` must already have passed
    /// [`sanitize_filename`](crate::sanitize::sanitize_filename).
    pub fn document_path(&self, filename: &str) -> String {
        let dir = self.paths.documents.trim_end_matches('/');
        if dir.is_empty() {
            filename.to_string()
        } else {
            format!("{dir}/{filename}")
        }
    }
}

/// Fixed locations, relative to the content root (or base URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// JSON array of newsletter filenames.
    pub manifest: String,
    /// Directory holding the newsletter `.txt` files.
    pub documents: String,
    /// Image shown on listing cards without a `Thumbnail` header.
    pub placeholder_thumbnail: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: "newsletters/index.json".to_string(),
            documents: "newsletters/".to_string(),
            placeholder_thumbnail: "thumbnails/placeholder.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// How selecting a listing entry presents the article.
    pub mode: ViewMode,
    /// Dedicated article page used in `page` mode.
    pub article_page: String,
    /// Query parameter carrying the article filename.
    pub article_param: String,
    /// Author shown when a newsletter has no `Author` header.
    pub default_author: String,
    /// Document title of the listing page.
    pub site_title: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mode: ViewMode::Page,
            article_page: "article.html".to_string(),
            article_param: "article".to_string(),
            default_author: "Staff".to_string(),
            site_title: "Newsletters".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderingConfig {
    /// Build the CommonMark formatter and markup sanitizer pair. When false,
    /// bodies always render as escaped plain paragraphs.
    pub rich_formatting: bool,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            rich_formatting: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadingConfig {
    /// Cap on simultaneous newsletter retrievals. `None` launches them all at once.
    pub max_concurrent_fetches: Option<usize>,
}

/// Load `config.toml` from the content root, falling back to defaults when absent.
pub fn load_config(root: &Path) -> Result<PressConfig, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(PressConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: PressConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// A documented `config.toml` with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# newsstand configuration
#
# Place this file at the content root. Every option is optional; the values
# below are the defaults. Unknown keys will cause an error.

[paths]
# JSON array of newsletter filenames, relative to the content root.
manifest = "newsletters/index.json"
# Directory holding the newsletter .txt files.
documents = "newsletters/"
# Image shown for newsletters without a Thumbnail header.
placeholder_thumbnail = "thumbnails/placeholder.png"

[view]
# "page": selecting an entry navigates to article_page?article=<file>.
# "overlay": selecting an entry opens the article over the listing.
mode = "page"
article_page = "article.html"
article_param = "article"
default_author = "Staff"
site_title = "Newsletters"

[rendering]
# Render bodies as sanitized CommonMark. When false, bodies are shown as
# escaped plain paragraphs.
rich_formatting = true

[loading]
# Maximum number of newsletters fetched at once. Omit for no limit.
# max_concurrent_fetches = 8
"#
}
