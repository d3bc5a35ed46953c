//! Site builder: executes a Build Plan into an output directory.
//!
//! # Architecture
//!
//! ```text
//! build(spec, plan, out_dir, opts)
//!     │
//!     ├── clean or reuse out_dir
//!     ├── write data/site-nav.json (nav/footer models + version info)
//!     ├── for each planned page:
//!     │       markdown → HTML → layout render → fragment injection → write
//!     └── write hosting config files for selected targets
//! ```
//!
//! Rebuilding without `clean` only (re)writes files present in the current
//! plan; stale files are left untouched. Partial output on crash is
//! acceptable — writes are not transactional.

pub mod engine;
pub mod hosting;
pub mod inject;
pub mod markdown;

use crate::{
    config::SiteSpec,
    log,
    plan::{BuildPlan, PageEntry, structured},
};
use serde_json::{Value, json};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Builder failures, fatal for the build step.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("write failed for `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("render failed for `{route}`: {message}")]
    Render { route: String, message: String },

    #[error("hosting: {0}")]
    Hosting(String),
}

/// Build-step options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Remove prior output before building.
    pub clean: bool,
    /// Minify rendered HTML.
    pub minify: bool,
}

/// Summary of one build execution.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages_written: usize,
}

/// Execute a Build Plan. Idempotent for identical plans.
pub fn build(
    spec: &SiteSpec,
    plan: &BuildPlan,
    out_dir: &Path,
    opts: BuildOptions,
) -> Result<BuildReport, BuildError> {
    if opts.clean && out_dir.exists() {
        fs::remove_dir_all(out_dir).map_err(|e| BuildError::Io(out_dir.to_path_buf(), e))?;
    }
    fs::create_dir_all(out_dir).map_err(|e| BuildError::Io(out_dir.to_path_buf(), e))?;

    write_nav_json(plan, out_dir)?;

    let engine = engine::engine_for(&plan.engine, &plan.theme)
        .map_err(|e| BuildError::Render { route: String::new(), message: format!("{e:#}") })?;

    let site_ctx = json!({
        "name": spec.name,
        "baseUrl": spec.base_url_trimmed(),
        "tokens": Value::Object(plan.theme.tokens()),
        "version": {
            "generator": plan.version.generator,
            "builtAt": plan.version.built_at,
            "current": plan.version.current,
        },
    });
    let data_ctx = plan.data.as_json();
    let nav_ctx = serde_json::to_value(&plan.nav).unwrap_or_default();

    let mut report = BuildReport::default();
    for page in &plan.pages {
        let html = render_page(spec, page, engine.as_ref(), &site_ctx, &data_ctx, &nav_ctx)?;
        let html = finalize(html, opts.minify);

        let target = out_dir.join(&page.route);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(&target, &html).map_err(|e| BuildError::Io(target.clone(), e))?;
        report.pages_written += 1;
    }

    let targets = hosting::parse_targets(&spec.hosting.targets).map_err(BuildError::Hosting)?;
    hosting::write_selected(&targets, &plan.redirects, out_dir)
        .map_err(|e| BuildError::Io(out_dir.to_path_buf(), e))?;

    log!("build"; "wrote {} pages to {}", report.pages_written, out_dir.display());
    Ok(report)
}

/// Render one page through markdown, layout, and fragment injection.
fn render_page(
    spec: &SiteSpec,
    page: &PageEntry,
    engine: &dyn engine::LayoutEngine,
    site_ctx: &Value,
    data_ctx: &Value,
    nav_ctx: &Value,
) -> Result<String, BuildError> {
    let content = markdown::render(&page.body);

    let mut page_ctx = page.bindings.clone();
    page_ctx.insert("title".to_string(), json!(page.title));
    page_ctx.insert("url".to_string(), json!(page.url));
    page_ctx.insert("route".to_string(), json!(page.route));
    page_ctx.insert("collection".to_string(), json!(page.collection));

    let ctx = json!({
        "site": site_ctx,
        "page": Value::Object(page_ctx),
        "content": content,
        "data": data_ctx,
        "nav": nav_ctx,
    });

    let rendered = engine
        .render(&page.layout_name, &page.layout_path, &ctx)
        .map_err(|e| BuildError::Render { route: page.route.clone(), message: format!("{e:#}") })?;

    let mut html = rendered;
    if let Some(bundle) = &page.bundle {
        html = inject::into_head(&html, &inject::bundle_fragment(bundle));
    }
    if let Some(profile) = page.profile {
        let doc = structured::json_ld(profile, &page.title, &page.url, spec);
        html = inject::into_head(&html, &inject::json_ld_fragment(&doc));
    }
    Ok(inject::ensure_highlight_bootstrap(html))
}

/// Write the navigation/footer/version model consumed by themes at runtime.
fn write_nav_json(plan: &BuildPlan, out_dir: &Path) -> Result<(), BuildError> {
    let data_dir = out_dir.join("data");
    fs::create_dir_all(&data_dir).map_err(|e| BuildError::Io(data_dir.clone(), e))?;

    let nav = serde_json::to_value(&plan.nav).unwrap_or_default();
    let doc = json!({
        "nav": nav,
        "version": {
            "generator": plan.version.generator,
            "builtAt": plan.version.built_at,
            "current": plan.version.current,
            "hub": plan.version.hub,
            "versions": plan.version.versions.iter()
                .map(|v| json!({ "label": v.label, "url": v.url }))
                .collect::<Vec<_>>(),
        },
    });
    let path = data_dir.join("site-nav.json");
    fs::write(&path, format!("{doc:#}")).map_err(|e| BuildError::Io(path, e))
}

/// Optional minification pass.
fn finalize(html: String, minify: bool) -> Vec<u8> {
    if !minify {
        return html.into_bytes();
    }
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html.as_bytes(), &cfg)
}
