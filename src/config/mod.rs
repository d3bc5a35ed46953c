//! Site specification management for `sitewright.json`.
//!
//! # Sections
//!
//! | Section          | Purpose                                         |
//! |------------------|-------------------------------------------------|
//! | top level        | Site metadata, roots, theme, engine, policy     |
//! | `collections`    | Named content groups                            |
//! | `nav`            | Navigation and footer models                    |
//! | `assets`         | Route-pattern asset bundles                     |
//! | `structuredData` | JSON-LD profile toggles                         |
//! | `versioning`     | Version hub and version list                    |
//! | `redirects`      | Redirect table                                  |
//! | `hosting`        | Hosting config generation targets               |
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "My Site",
//!   "baseUrl": "https://example.com",
//!   "theme": "default",
//!   "trailingSlash": "always",
//!   "collections": [
//!     { "name": "posts", "input": "posts/*.md", "output": "posts" }
//!   ]
//! }
//! ```
//!
//! Unknown keys are ignored so specifications stay forward-compatible;
//! required keys absent surface as `PlanError` at plan time.

mod assets;
mod collections;
pub mod defaults;
mod error;
mod nav;

pub use assets::{AssetRegistry, RouteBundle};
pub use collections::CollectionSpec;
pub use error::ConfigError;
pub use nav::{NavGroup, NavItem, NavSpec};

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Specification
// ============================================================================

/// Root specification structure representing `sitewright.json`.
///
/// Immutable after load; the planner owns it for one plan operation.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSpec {
    /// Site root directory (set after loading, not part of the document).
    #[serde(skip)]
    pub root: PathBuf,

    /// Site name.
    pub name: String,

    /// Absolute base URL of the deployed site.
    #[serde(alias = "base-url")]
    pub base_url: String,

    /// Content directory, relative to the site root.
    #[educe(Default = defaults::content_root())]
    #[serde(alias = "content-root")]
    pub content_root: PathBuf,

    /// Themes directory, relative to the site root.
    #[educe(Default = defaults::themes_root())]
    #[serde(alias = "themes-root")]
    pub themes_root: PathBuf,

    /// Data directory, relative to the site root. Missing is not an error.
    #[educe(Default = defaults::data_root())]
    #[serde(alias = "data-root")]
    pub data_root: PathBuf,

    /// Default theme name.
    #[educe(Default = defaults::theme())]
    pub theme: String,

    /// Templating engine id (`tera` or `substitute`).
    #[educe(Default = defaults::engine())]
    pub engine: String,

    /// Output-path policy for routes.
    #[serde(alias = "trailing-slash")]
    pub trailing_slash: TrailingSlash,

    /// Content collections, in declaration order.
    pub collections: Vec<CollectionSpec>,

    /// Navigation and footer models.
    pub nav: NavSpec,

    /// Asset registry.
    pub assets: AssetRegistry,

    /// Structured-data (JSON-LD) toggles.
    #[serde(alias = "structured-data")]
    pub structured_data: StructuredDataSpec,

    /// Versioning metadata.
    pub versioning: VersioningSpec,

    /// Redirect table.
    pub redirects: Vec<RedirectRule>,

    /// Hosting config generation targets.
    pub hosting: HostingSpec,
}

/// Output-path policy applied site-wide.
///
/// | Mode       | `posts/hello`               | root route   |
/// |------------|-----------------------------|--------------|
/// | `always`   | `posts/hello/index.html`    | `index.html` |
/// | `never`    | `posts/hello.html`          | `index.html` |
/// | `preserve` | keeps an existing extension, otherwise `never` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    #[default]
    Always,
    Never,
    Preserve,
}

/// Structured-data (JSON-LD) toggles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataSpec {
    /// Master switch. Off means every page resolves to no profile unless
    /// front matter explicitly selects one.
    #[serde(default)]
    pub enable: bool,

    /// Publisher name carried into every emitted profile.
    #[serde(default)]
    pub publisher: Option<String>,

    /// Publisher logo URL.
    #[serde(default)]
    pub logo: Option<String>,
}

/// Versioning metadata for multi-version documentation sites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersioningSpec {
    #[serde(default)]
    pub enable: bool,

    /// Site URL path of the version hub page. Must resolve to a planned
    /// route when versioning is enabled.
    #[serde(default)]
    pub hub: Option<String>,

    /// Label shown for the currently built version.
    #[serde(default)]
    pub current: Option<String>,

    /// Other published versions.
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

/// One published version of the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub label: String,
    pub url: String,
}

/// One redirect rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRule {
    /// Source URL path.
    pub from: String,
    /// Destination URL path or absolute URL.
    pub to: String,
    /// HTTP status, defaults to 301.
    #[serde(default = "defaults::redirect_status")]
    pub status: u16,
}

/// Hosting config generation, applied by the builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingSpec {
    /// Selected targets (e.g. `apache`, `iis`, `netlify`). Empty means no
    /// hosting files are generated.
    #[serde(default)]
    pub targets: Vec<String>,
}

// ============================================================================
// Loading & Validation
// ============================================================================

impl SiteSpec {
    /// Load a specification from a JSON file.
    ///
    /// The site root is the directory containing the file; all configured
    /// roots resolve relative to it. `~` in the path is expanded.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let raw = fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let mut spec: SiteSpec =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Json(path.clone(), e))?;
        spec.root = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(spec)
    }

    /// Validate cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for collection in &self.collections {
            if !seen.insert(collection.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate collection `{}`",
                    collection.name
                )));
            }
            if collection.input.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "collection `{}` has an empty input glob",
                    collection.name
                )));
            }
        }
        for rule in &self.redirects {
            if rule.from.is_empty() || rule.to.is_empty() {
                return Err(ConfigError::Validation(
                    "redirect rule with empty `from` or `to`".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Absolute content directory.
    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.content_root)
    }

    /// Absolute themes directory.
    pub fn themes_dir(&self) -> PathBuf {
        self.root.join(&self.themes_root)
    }

    /// Absolute data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.data_root)
    }

    /// Base URL without its trailing slash.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
