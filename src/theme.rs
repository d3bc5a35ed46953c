//! Theme manifests, inheritance chains, and token merging.
//!
//! A theme lives under `<themes_root>/<name>/` with a `theme.json` manifest.
//! Themes inherit through `extends`: layout and partial lookups walk the
//! child theme first and fall back along the parent chain; token trees merge
//! child-over-parent, per key, recursively.
//!
//! # Example manifest
//!
//! ```json
//! {
//!   "schemaVersion": 2,
//!   "name": "docs",
//!   "engine": "tera",
//!   "layoutsPath": "layouts",
//!   "defaultLayout": "page",
//!   "extends": "default",
//!   "tokens": { "color": { "accent": "#0a7" } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::{BTreeSet, HashSet},
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Manifest filename inside each theme directory.
const MANIFEST_FILE: &str = "theme.json";

/// Manifest schema versions this build understands.
const SUPPORTED_SCHEMAS: &[u32] = &[1, 2];

/// Theme resolution errors.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("theme not found: no manifest at `{0}`")]
    NotFound(PathBuf),

    #[error("theme inheritance cycle through `{0}`")]
    Cycle(String),

    #[error("unsupported theme schema version {0}")]
    Schema(u32),

    #[error("layout not found in theme chain: `{0}`")]
    LayoutNotFound(String),

    #[error("partial not found in theme chain: `{0}`")]
    PartialNotFound(String),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("theme manifest parsing error in `{0}`")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// One theme's manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeManifest {
    /// Manifest schema version; `contractVersion` is the historical key.
    #[serde(alias = "contractVersion")]
    pub schema_version: u32,

    pub name: String,

    /// Engine id override; falls back to the specification's engine.
    #[serde(default)]
    pub engine: Option<String>,

    /// Layout directory relative to the theme root.
    #[serde(default = "default_layouts_path")]
    pub layouts_path: String,

    /// Partial directory relative to the theme root.
    #[serde(default = "default_partials_path")]
    pub partials_path: String,

    /// Layout used when neither item nor collection binds one.
    #[serde(default = "default_layout")]
    pub default_layout: String,

    /// Parent theme name.
    #[serde(default)]
    pub extends: Option<String>,

    /// Design token tree.
    #[serde(default)]
    pub tokens: Map<String, Value>,
}

fn default_layouts_path() -> String {
    "layouts".to_string()
}

fn default_partials_path() -> String {
    "partials".to_string()
}

fn default_layout() -> String {
    "page".to_string()
}

/// A resolved inheritance chain, child first.
#[derive(Debug, Clone)]
pub struct ThemeChain {
    /// `(theme directory, manifest)` pairs; index 0 is the requested theme.
    pub links: Vec<(PathBuf, ThemeManifest)>,
}

impl ThemeChain {
    /// Load a theme and its full `extends` chain.
    ///
    /// A revisited theme name is a `Cycle` error; an unsupported
    /// `schemaVersion` is a `Schema` error.
    pub fn load(themes_root: &Path, name: &str) -> Result<Self, ThemeError> {
        let mut links = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(name.to_string());

        while let Some(current) = next.take() {
            if !visited.insert(current.clone()) {
                return Err(ThemeError::Cycle(current));
            }
            let dir = themes_root.join(&current);
            let manifest = load_manifest(&dir)?;
            next = manifest.extends.clone();
            links.push((dir, manifest));
        }

        Ok(Self { links })
    }

    /// Manifest of the requested (child) theme.
    pub fn child(&self) -> &ThemeManifest {
        // load() always pushes at least one link
        &self.links[0].1
    }

    /// Engine id for rendering: child theme override, else `fallback`.
    pub fn engine<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.child().engine.as_deref().unwrap_or(fallback)
    }

    /// Default layout name of the child theme.
    pub fn default_layout(&self) -> &str {
        &self.child().default_layout
    }

    /// Resolve a layout file, walking child to parents.
    pub fn resolve_layout(&self, name: &str) -> Result<PathBuf, ThemeError> {
        self.resolve(name, |m| &m.layouts_path)
            .ok_or_else(|| ThemeError::LayoutNotFound(name.to_string()))
    }

    /// Resolve a partial file, walking child to parents.
    pub fn resolve_partial(&self, name: &str) -> Result<PathBuf, ThemeError> {
        self.resolve(name, |m| &m.partials_path)
            .ok_or_else(|| ThemeError::PartialNotFound(name.to_string()))
    }

    fn resolve(&self, name: &str, subdir: impl Fn(&ThemeManifest) -> &str) -> Option<PathBuf> {
        let file = if name.contains('.') {
            name.to_string()
        } else {
            format!("{name}.html")
        };
        self.links
            .iter()
            .map(|(dir, manifest)| dir.join(subdir(manifest)).join(&file))
            .find(|path| path.is_file())
    }

    /// Merged token tree: root ancestor first, each child overlaid on top.
    pub fn tokens(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for (_, manifest) in self.links.iter().rev() {
            merged = merge_tokens(&merged, &manifest.tokens);
        }
        merged
    }

    /// All layout file names appearing anywhere in the chain, sorted.
    pub fn layout_names(&self) -> BTreeSet<String> {
        self.template_names(|m| &m.layouts_path)
    }

    /// All partial file names appearing anywhere in the chain, sorted.
    pub fn partial_names(&self) -> BTreeSet<String> {
        self.template_names(|m| &m.partials_path)
    }

    fn template_names(&self, subdir: impl Fn(&ThemeManifest) -> &str) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for (dir, manifest) in &self.links {
            let Ok(entries) = fs::read_dir(dir.join(subdir(manifest))) else {
                continue;
            };
            for entry in entries.filter_map(Result::ok) {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.ends_with(".html") && entry.path().is_file() {
                    names.insert(name);
                }
            }
        }
        names
    }
}

/// Read and schema-check one manifest.
fn load_manifest(dir: &Path) -> Result<ThemeManifest, ThemeError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Err(ThemeError::NotFound(path));
    }
    let raw = fs::read_to_string(&path).map_err(|e| ThemeError::Io(path.clone(), e))?;
    let manifest: ThemeManifest =
        serde_json::from_str(&raw).map_err(|e| ThemeError::Json(path.clone(), e))?;
    if !SUPPORTED_SCHEMAS.contains(&manifest.schema_version) {
        return Err(ThemeError::Schema(manifest.schema_version));
    }
    Ok(manifest)
}

/// Merge two token trees, `over` winning per key.
///
/// Nested maps merge key-wise; scalars (and arrays) overwrite. Pure: the
/// result is independent of which nested keys appear only in `base` vs only
/// in `over`.
pub fn merge_tokens(base: &Map<String, Value>, over: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in over {
        match (merged.get(key), value) {
            (Some(Value::Object(base_child)), Value::Object(over_child)) => {
                let combined = merge_tokens(base_child, over_child);
                merged.insert(key.clone(), Value::Object(combined));
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tokens(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn write_theme(root: &Path, name: &str, manifest: Value) {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("layouts")).unwrap();
        fs::create_dir_all(dir.join("partials")).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest.to_string()).unwrap();
    }

    #[test]
    fn test_merge_child_scalar_wins() {
        let base = tokens(json!({ "color": { "accent": "#00f", "bg": "#fff" } }));
        let over = tokens(json!({ "color": { "accent": "#0a7" } }));
        let merged = merge_tokens(&base, &over);
        assert_eq!(merged["color"]["accent"], "#0a7");
        assert_eq!(merged["color"]["bg"], "#fff");
    }

    #[test]
    fn test_merge_disjoint_maps_union() {
        let base = tokens(json!({ "font": { "body": "serif" } }));
        let over = tokens(json!({ "color": { "accent": "#0a7" } }));
        let merged = merge_tokens(&base, &over);
        assert_eq!(merged["font"]["body"], "serif");
        assert_eq!(merged["color"]["accent"], "#0a7");
    }

    #[test]
    fn test_load_chain_and_layout_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(dir.path(), "base", json!({ "schemaVersion": 1, "name": "base" }));
        write_theme(
            dir.path(),
            "child",
            json!({ "schemaVersion": 2, "name": "child", "extends": "base" }),
        );
        fs::write(dir.path().join("base/layouts/page.html"), "base page").unwrap();
        fs::write(dir.path().join("child/layouts/post.html"), "child post").unwrap();

        let chain = ThemeChain::load(dir.path(), "child").unwrap();
        assert_eq!(chain.links.len(), 2);

        // Child-local layout resolves to the child theme.
        let post = chain.resolve_layout("post").unwrap();
        assert!(post.ends_with("child/layouts/post.html"));

        // Missing in child falls back to the parent.
        let page = chain.resolve_layout("page").unwrap();
        assert!(page.ends_with("base/layouts/page.html"));

        assert!(matches!(
            chain.resolve_layout("missing"),
            Err(ThemeError::LayoutNotFound(_))
        ));
    }

    #[test]
    fn test_partial_shadowing_and_name_union() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(dir.path(), "base", json!({ "schemaVersion": 1, "name": "base" }));
        write_theme(
            dir.path(),
            "child",
            json!({ "schemaVersion": 1, "name": "child", "extends": "base" }),
        );
        fs::write(dir.path().join("base/partials/header.html"), "base header").unwrap();
        fs::write(dir.path().join("base/partials/footer.html"), "base footer").unwrap();
        fs::write(dir.path().join("child/partials/header.html"), "child header").unwrap();

        let chain = ThemeChain::load(dir.path(), "child").unwrap();
        let names: Vec<_> = chain.partial_names().into_iter().collect();
        assert_eq!(names, vec!["footer.html", "header.html"]);

        // The child copy shadows the parent's.
        let header = chain.resolve_partial("header").unwrap();
        assert!(header.ends_with("child/partials/header.html"));
        let footer = chain.resolve_partial("footer").unwrap();
        assert!(footer.ends_with("base/partials/footer.html"));

        assert!(matches!(
            chain.resolve_partial("sidebar"),
            Err(ThemeError::PartialNotFound(_))
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(
            dir.path(),
            "a",
            json!({ "schemaVersion": 1, "name": "a", "extends": "b" }),
        );
        write_theme(
            dir.path(),
            "b",
            json!({ "schemaVersion": 1, "name": "b", "extends": "a" }),
        );
        assert!(matches!(
            ThemeChain::load(dir.path(), "a"),
            Err(ThemeError::Cycle(_))
        ));
    }

    #[test]
    fn test_missing_theme() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ThemeChain::load(dir.path(), "ghost"),
            Err(ThemeError::NotFound(_))
        ));
    }

    #[test]
    fn test_unsupported_schema() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(dir.path(), "future", json!({ "schemaVersion": 9, "name": "future" }));
        assert!(matches!(
            ThemeChain::load(dir.path(), "future"),
            Err(ThemeError::Schema(9))
        ));
    }

    #[test]
    fn test_contract_version_alias() {
        let manifest: ThemeManifest =
            serde_json::from_str(r#"{ "contractVersion": 1, "name": "legacy" }"#).unwrap();
        assert_eq!(manifest.schema_version, 1);
    }

    #[test]
    fn test_chain_tokens_child_over_parent() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(
            dir.path(),
            "base",
            json!({
                "schemaVersion": 1, "name": "base",
                "tokens": { "color": { "accent": "#00f" }, "radius": "4px" }
            }),
        );
        write_theme(
            dir.path(),
            "child",
            json!({
                "schemaVersion": 1, "name": "child", "extends": "base",
                "tokens": { "color": { "accent": "#0a7" } }
            }),
        );
        let chain = ThemeChain::load(dir.path(), "child").unwrap();
        let merged = chain.tokens();
        assert_eq!(merged["color"]["accent"], "#0a7");
        assert_eq!(merged["radius"], "4px");
    }
}
