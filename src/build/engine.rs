//! Layout rendering engines.
//!
//! The templating capability is pluggable behind `LayoutEngine`, keyed by
//! engine id from the specification (overridable per theme). `tera` is the
//! full-featured default; `substitute` is a dependency-free dotted-path
//! replacement for minimal themes and tests.

use crate::theme::ThemeChain;
use anyhow::{Context as _, Result, bail};
use regex::Regex;
use serde_json::Value;
use std::{fs, path::Path, sync::LazyLock};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").unwrap());

/// A pluggable layout renderer.
pub trait LayoutEngine {
    /// Render `layout_path` (registered under `layout_name`) with the page
    /// context.
    fn render(&self, layout_name: &str, layout_path: &Path, ctx: &Value) -> Result<String>;
}

/// Instantiate the engine for an id, with theme template directories.
pub fn engine_for(id: &str, theme: &ThemeChain) -> Result<Box<dyn LayoutEngine>> {
    match id {
        "tera" => Ok(Box::new(TeraEngine::new(theme)?)),
        "substitute" => Ok(Box::new(SubstituteEngine)),
        other => bail!("unknown templating engine `{other}`"),
    }
}

// ============================================================================
// Tera
// ============================================================================

/// Tera-backed engine. Every layout and partial name appearing in the theme
/// chain is registered at its child-most resolved path, so child themes
/// shadow parent templates.
pub struct TeraEngine {
    tera: tera::Tera,
}

impl TeraEngine {
    pub fn new(theme: &ThemeChain) -> Result<Self> {
        let mut tera = tera::Tera::default();
        for name in theme.layout_names() {
            let path = theme.resolve_layout(&name)?;
            tera.add_template_file(&path, Some(&name))
                .with_context(|| format!("layout `{name}` failed to compile"))?;
        }
        for name in theme.partial_names() {
            let path = theme.resolve_partial(&name)?;
            tera.add_template_file(&path, Some(&name))
                .with_context(|| format!("partial `{name}` failed to compile"))?;
        }
        Ok(Self { tera })
    }
}

impl LayoutEngine for TeraEngine {
    fn render(&self, layout_name: &str, _layout_path: &Path, ctx: &Value) -> Result<String> {
        let template = if layout_name.contains('.') {
            layout_name.to_string()
        } else {
            format!("{layout_name}.html")
        };
        let context = tera::Context::from_value(ctx.clone())
            .context("page context is not a JSON object")?;
        self.tera
            .render(&template, &context)
            .with_context(|| format!("tera render of `{template}` failed"))
    }
}

// ============================================================================
// Substitute
// ============================================================================

/// Minimal `{{ dotted.path }}` substitution engine.
///
/// Unresolvable paths render as empty strings; no escaping is applied.
pub struct SubstituteEngine;

impl LayoutEngine for SubstituteEngine {
    fn render(&self, _layout_name: &str, layout_path: &Path, ctx: &Value) -> Result<String> {
        let template = fs::read_to_string(layout_path)
            .with_context(|| format!("read layout `{}`", layout_path.display()))?;
        Ok(substitute(&template, ctx))
    }
}

/// Replace every `{{ path.to.value }}` placeholder from the context.
fn substitute(template: &str, ctx: &Value) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures| {
            lookup(ctx, &caps[1]).unwrap_or_default()
        })
        .into_owned()
}

/// Resolve a dotted path against a JSON value, rendering scalars plainly.
fn lookup(ctx: &Value, path: &str) -> Option<String> {
    let mut current = ctx;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(match current {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitute_dotted_paths() {
        let ctx = json!({
            "site": { "name": "Test Site" },
            "page": { "title": "Hello" },
            "content": "<p>body</p>"
        });
        let out = substitute(
            "<title>{{ page.title }} - {{ site.name }}</title>{{ content }}",
            &ctx,
        );
        assert_eq!(out, "<title>Hello - Test Site</title><p>body</p>");
    }

    #[test]
    fn test_substitute_missing_path_is_empty() {
        let out = substitute("[{{ nope.missing }}]", &json!({}));
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("default/layouts")).unwrap();
        std::fs::write(
            dir.path().join("default/theme.json"),
            r#"{ "schemaVersion": 1, "name": "default" }"#,
        )
        .unwrap();
        let theme = ThemeChain::load(dir.path(), "default").unwrap();
        assert!(engine_for("handlebars", &theme).is_err());
        assert!(engine_for("substitute", &theme).is_ok());
    }
}
