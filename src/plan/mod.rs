//! Site planner: specification + resolved content/themes => Build Plan.
//!
//! The plan is the single artifact handed from planning to building and
//! verification. Planning is deterministic for identical file-system state:
//! routes come out in collection declaration order, then sorted file
//! enumeration order.
//!
//! # Invariants
//!
//! - Every output path in the plan is unique.
//! - Every output path is relative and stays inside the output root.

pub mod assets;
pub mod structured;

use crate::{
    config::{NavSpec, RedirectRule, RouteBundle, SiteSpec, TrailingSlash, VersionEntry},
    content::{self, ContentError, data::DataStore},
    log,
    theme::{ThemeChain, ThemeError},
};
use assets::BundleMatcher;
use chrono::Utc;
use serde_json::{Map, Value};
use std::{collections::HashSet, path::PathBuf};
use structured::Profile;
use thiserror::Error;

/// Fatal planning failures, wrapping the first unrecoverable sub-failure.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("theme resolution failed")]
    Theme(#[from] ThemeError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("missing required specification key: `{0}`")]
    MissingKey(&'static str),

    #[error("route collision: `{0}` planned twice")]
    RouteCollision(String),

    #[error("route escapes the output root: `{0}`")]
    RouteEscape(String),

    #[error("versioning hub `{0}` does not resolve to a planned route")]
    VersioningHub(String),
}

/// One render-ready page.
#[derive(Debug, Clone)]
pub struct PageEntry {
    /// Output path relative to the output root (e.g. `posts/hello/index.html`).
    pub route: String,
    /// Site URL path (e.g. `/posts/hello/`).
    pub url: String,
    /// Absolute source file.
    pub source: PathBuf,
    /// Owning collection name.
    pub collection: String,
    /// Bound layout name and its resolved file.
    pub layout_name: String,
    pub layout_path: PathBuf,
    pub title: String,
    /// Front matter bindings exposed to the template as `page`.
    pub bindings: Map<String, Value>,
    /// Markdown body.
    pub body: String,
    /// Selected structured-data profile, if any.
    pub profile: Option<Profile>,
    /// Matched asset bundle, if any.
    pub bundle: Option<RouteBundle>,
}

/// Versioning metadata carried into the output.
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub generator: String,
    pub built_at: String,
    pub current: Option<String>,
    pub versions: Vec<VersionEntry>,
    pub hub: Option<String>,
}

/// The fully resolved, render-ready description of the site.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub pages: Vec<PageEntry>,
    pub nav: NavSpec,
    pub redirects: Vec<RedirectRule>,
    pub data: DataStore,
    pub theme: ThemeChain,
    /// Engine id after theme override.
    pub engine: String,
    pub version: VersionInfo,
    /// Recoverable findings collected while planning (parse errors, bad
    /// asset patterns, bad data files).
    pub warnings: Vec<String>,
}

/// Produce a Build Plan from a loaded specification.
pub fn plan(spec: &SiteSpec) -> Result<BuildPlan, PlanError> {
    if spec.name.is_empty() {
        return Err(PlanError::MissingKey("name"));
    }
    if spec.base_url.is_empty() {
        return Err(PlanError::MissingKey("baseUrl"));
    }

    let theme = ThemeChain::load(&spec.themes_dir(), &spec.theme)?;
    let engine = theme.engine(&spec.engine).to_string();

    let data = DataStore::load(&spec.data_dir());
    let mut warnings: Vec<String> = data
        .warnings
        .iter()
        .map(|(path, message)| format!("data file `{path}`: {message}"))
        .collect();

    let matcher = BundleMatcher::new(&spec.assets);
    for pattern in &matcher.bad_patterns {
        warnings.push(format!("invalid asset bundle pattern `{pattern}`"));
    }

    let mut pages = Vec::new();
    let mut seen_routes = HashSet::new();

    for collection in &spec.collections {
        let content = content::enumerate_collection(&spec.content_dir(), collection)?;
        for warning in &content.warnings {
            warnings.push(format!(
                "content `{}`: {}",
                warning.path.display(),
                warning.message
            ));
        }

        let items: Vec<_> = content.items.into_iter().filter(|i| !i.draft).collect();
        if collection.required && items.is_empty() {
            return Err(ContentError::EmptyCollection(collection.name.clone()).into());
        }

        for item in items {
            let layout_name = item
                .layout
                .clone()
                .or_else(|| collection.default_layout.clone())
                .unwrap_or_else(|| theme.default_layout().to_string());
            let layout_path = theme.resolve_layout(&layout_name)?;

            let (route, url) =
                route_for(collection.output_prefix(), &item.slug, spec.trailing_slash);
            check_route(&route)?;
            if !seen_routes.insert(route.clone()) {
                return Err(PlanError::RouteCollision(route));
            }

            let profile = structured::resolve(spec, collection, &item);
            let bundle = matcher.best_match(&url).cloned();

            pages.push(PageEntry {
                route,
                url,
                source: item.source,
                collection: collection.name.clone(),
                layout_name,
                layout_path,
                title: item.title,
                bindings: item.front,
                body: item.body,
                profile,
                bundle,
            });
        }
    }

    if spec.versioning.enable {
        let hub = spec
            .versioning
            .hub
            .as_deref()
            .ok_or(PlanError::MissingKey("versioning.hub"))?;
        if !pages.iter().any(|p| p.url == hub) {
            return Err(PlanError::VersioningHub(hub.to_string()));
        }
    }

    log!("plan"; "resolved {} pages across {} collections", pages.len(), spec.collections.len());

    Ok(BuildPlan {
        pages,
        nav: spec.nav.clone(),
        redirects: spec.redirects.clone(),
        data,
        theme,
        engine,
        version: VersionInfo {
            generator: format!("sitewright {}", env!("CARGO_PKG_VERSION")),
            built_at: Utc::now().to_rfc3339(),
            current: spec.versioning.current.clone(),
            versions: spec.versioning.versions.clone(),
            hub: spec.versioning.hub.clone(),
        },
        warnings,
    })
}

/// Map a collection prefix + slug to `(output path, URL path)` under the
/// trailing-slash policy.
///
/// An `index` slug collapses into the prefix itself.
fn route_for(prefix: &str, slug: &str, policy: TrailingSlash) -> (String, String) {
    let logical = if slug == "index" {
        prefix.to_string()
    } else if prefix.is_empty() {
        slug.to_string()
    } else {
        format!("{prefix}/{slug}")
    };

    if logical.is_empty() {
        return ("index.html".to_string(), "/".to_string());
    }

    match policy {
        TrailingSlash::Always => (format!("{logical}/index.html"), format!("/{logical}/")),
        TrailingSlash::Never => (format!("{logical}.html"), format!("/{logical}.html")),
        TrailingSlash::Preserve => {
            let last = logical.rsplit('/').next().unwrap_or(&logical);
            if last.contains('.') {
                (logical.clone(), format!("/{logical}"))
            } else {
                (format!("{logical}.html"), format!("/{logical}.html"))
            }
        }
    }
}

/// Reject routes that are absolute or step outside the output root.
fn check_route(route: &str) -> Result<(), PlanError> {
    let escapes = route.starts_with('/')
        || route.contains(':')
        || route.split('/').any(|part| part == ".." || part.is_empty());
    if escapes {
        return Err(PlanError::RouteEscape(route.to_string()));
    }
    Ok(())
}
