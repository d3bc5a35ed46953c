//! The check battery: verifier (over a plan) and auditor (over output).

use super::{CheckConfig, CheckResult, Issue, IssueAggregator, finalize};
use crate::{
    config::SiteSpec,
    log,
    plan::BuildPlan,
    utils::globs,
};
use regex::Regex;
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path,
    sync::LazyLock,
};
use walkdir::WalkDir;

static CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta[^>]*charset"#).unwrap());
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sid\s*=\s*["']([^"']+)["']"#).unwrap());
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<h([1-6])[\s>]").unwrap());
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).unwrap());
static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src\s*=\s*["']([^"']+)["']"#).unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<title>.+?</title>").unwrap());
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta[^>]*name\s*=\s*["']description["']"#).unwrap());
static NAV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(<nav[\s>]|site-nav\.json)").unwrap());

// ============================================================================
// Verifier (pre-build, over a Build Plan)
// ============================================================================

/// Run the configured checks against a Build Plan.
pub fn verify_plan(spec: &SiteSpec, plan: &BuildPlan, cfg: &CheckConfig) -> CheckResult {
    let mut issues = Vec::new();
    let warnings = plan.warnings.clone();

    if cfg.structure {
        check_plan_structure(plan, &mut issues);
    }
    if cfg.nav_presence {
        check_nav_targets(plan, &mut issues);
    }
    if cfg.asset_existence {
        check_planned_assets(spec, plan, &mut issues);
    }
    if cfg.seo_meta {
        check_planned_seo(plan, &mut issues);
    }
    if cfg.file_budget {
        let routes: Vec<String> = plan.pages.iter().map(|p| p.route.clone()).collect();
        budget_issue(&routes, cfg, &mut issues);
    }

    let result = finalize(cfg, issues, warnings);
    log!("verify"; "{} issues, success={}", result.issues.len(), result.success);
    result
}

/// Plan invariants: unique, in-root output paths and resolvable layouts.
fn check_plan_structure(plan: &BuildPlan, issues: &mut Vec<Issue>) {
    let mut seen = HashSet::new();
    for page in &plan.pages {
        if !seen.insert(&page.route) {
            issues.push(Issue {
                category: "structure".into(),
                code: "route-duplicate".into(),
                message: format!("output path `{}` planned twice", page.route),
                path: Some(page.route.clone()),
            });
        }
        if page.route.starts_with('/') || page.route.split('/').any(|c| c == "..") {
            issues.push(Issue {
                category: "structure".into(),
                code: "route-escape".into(),
                message: format!("output path `{}` escapes the output root", page.route),
                path: Some(page.route.clone()),
            });
        }
        if !page.layout_path.is_file() {
            issues.push(Issue {
                category: "structure".into(),
                code: "layout-missing".into(),
                message: format!(
                    "layout `{}` for `{}` is not a file",
                    page.layout_path.display(),
                    page.route
                ),
                path: Some(page.route.clone()),
            });
        }
    }
}

/// Every internal nav target must resolve to a planned route.
fn check_nav_targets(plan: &BuildPlan, issues: &mut Vec<Issue>) {
    let urls: HashSet<_> = plan.pages.iter().map(|p| p.url.as_str()).collect();
    let mut agg = IssueAggregator::default();

    let mut stack: Vec<_> = plan.nav.items.iter().collect();
    for group in &plan.nav.footer {
        stack.extend(group.items.iter());
    }
    while let Some(item) = stack.pop() {
        stack.extend(item.children.iter());
        let url = item.url.as_str();
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with('#') {
            continue;
        }
        if !urls.contains(url) {
            agg.add("nav-target-missing", "nav", "nav target not planned", url);
        }
    }
    agg.flush(issues);
}

/// Bundle css/js with site-local URLs should exist as source files.
fn check_planned_assets(spec: &SiteSpec, plan: &BuildPlan, issues: &mut Vec<Issue>) {
    let mut checked = HashSet::new();
    let mut agg = IssueAggregator::default();
    for page in &plan.pages {
        let Some(bundle) = &page.bundle else { continue };
        for url in bundle.css.iter().chain(bundle.js.iter()) {
            if !url.starts_with('/') || !checked.insert(url.clone()) {
                continue;
            }
            let source = spec.root.join(url.trim_start_matches('/'));
            if !source.is_file() {
                agg.add("asset-missing", "assets", "bundle asset has no source file", url);
            }
        }
    }
    agg.flush(issues);
}

/// Front-matter description presence, aggregated per code.
fn check_planned_seo(plan: &BuildPlan, issues: &mut Vec<Issue>) {
    let mut agg = IssueAggregator::default();
    for page in &plan.pages {
        if page.title.is_empty() {
            agg.add("seo-title-missing", "seo", "page without title", &page.route);
        }
        if !page.bindings.contains_key("description") {
            agg.add(
                "seo-description-missing",
                "seo",
                "page without front-matter description",
                &page.route,
            );
        }
    }
    agg.flush(issues);
}

// ============================================================================
// Auditor (post-build, over output)
// ============================================================================

/// Run the configured checks against a built output directory.
pub fn audit_output(out_dir: &Path, cfg: &CheckConfig) -> CheckResult {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let mut all_files = Vec::new();
    let mut html_files = Vec::new();
    for entry in WalkDir::new(out_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let rel = entry
            .path()
            .strip_prefix(out_dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if rel.ends_with(".html") {
            html_files.push((rel.clone(), entry.path().to_path_buf()));
        }
        all_files.push(rel);
    }

    if cfg.structure && !all_files.iter().any(|f| f == "index.html") {
        issues.push(Issue {
            category: "structure".into(),
            code: "index-missing".into(),
            message: "output has no root index.html".into(),
            path: None,
        });
    }

    let mut nav_agg = IssueAggregator::default();
    let mut page_agg = IssueAggregator::default();

    for (rel, path) in &html_files {
        let Ok(html) = fs::read_to_string(path) else {
            warnings.push(format!("unreadable output file `{rel}`"));
            continue;
        };

        if cfg.charset && !CHARSET_RE.is_match(&html) {
            page_agg.add("charset-missing", "html", "page without charset meta", rel);
        }
        if cfg.duplicate_ids {
            check_duplicate_ids(rel, &html, &mut page_agg);
        }
        if cfg.heading_order {
            check_heading_order(rel, &html, &mut page_agg);
        }
        if cfg.link_integrity {
            check_links(out_dir, rel, &html, &mut page_agg);
        }
        if cfg.asset_existence {
            check_assets(out_dir, rel, &html, &mut page_agg);
        }
        if cfg.seo_meta {
            if !TITLE_RE.is_match(&html) {
                page_agg.add("seo-title-missing", "seo", "page without <title>", rel);
            }
            if !DESCRIPTION_RE.is_match(&html) {
                page_agg.add("seo-description-missing", "seo", "page without description meta", rel);
            }
        }
        if cfg.nav_presence && !NAV_RE.is_match(&html) {
            nav_agg.add("nav-missing", "nav", "navigation missing", rel);
        }
    }

    nav_agg.flush(&mut issues);
    page_agg.flush(&mut issues);

    if cfg.file_budget {
        budget_issue(&all_files, cfg, &mut issues);
    }

    let result = finalize(cfg, issues, warnings);
    log!("audit"; "{} files, {} issues, success={}", all_files.len(), result.issues.len(), result.success);
    result
}

/// File-count budget shared by verifier and auditor.
///
/// Counts everything except `budgetExclude` matches; exceeding the ceiling
/// raises one `budget` issue carrying the actual count.
fn budget_issue(files: &[String], cfg: &CheckConfig, issues: &mut Vec<Issue>) {
    let Some(max) = cfg.max_total_files else { return };
    let excludes: Vec<_> = cfg
        .budget_exclude
        .iter()
        .filter_map(|p| globs::compile(p).ok())
        .collect();
    let count = files
        .iter()
        .filter(|f| !excludes.iter().any(|p| globs::matches(p, f)))
        .count();
    if count > max {
        issues.push(Issue {
            category: "budget".into(),
            code: "budget-max-files".into(),
            message: format!("output has {count} files, budget allows {max}"),
            path: None,
        });
    }
}

fn check_duplicate_ids(rel: &str, html: &str, agg: &mut IssueAggregator) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for cap in ID_RE.captures_iter(html) {
        if let Some(id) = cap.get(1) {
            *counts.entry(id.as_str()).or_default() += 1;
        }
    }
    if counts.values().any(|&n| n > 1) {
        agg.add("duplicate-id", "html", "page with duplicate element ids", rel);
    }
}

fn check_heading_order(rel: &str, html: &str, agg: &mut IssueAggregator) {
    let mut last = 0u32;
    for cap in HEADING_RE.captures_iter(html) {
        let level: u32 = cap[1].parse().unwrap_or(1);
        if last != 0 && level > last + 1 {
            agg.add("heading-skip", "html", "heading level skips", rel);
            return;
        }
        last = level;
    }
}

fn check_links(out_dir: &Path, rel: &str, html: &str, agg: &mut IssueAggregator) {
    for cap in HREF_RE.captures_iter(html) {
        let href = &cap[1];
        if !href.starts_with('/') || href.starts_with("//") {
            continue;
        }
        let target = href.split(['#', '?']).next().unwrap_or(href);
        if !resolves(out_dir, target) {
            agg.add("link-broken", "links", "internal link target missing", rel);
            return;
        }
    }
}

fn check_assets(out_dir: &Path, rel: &str, html: &str, agg: &mut IssueAggregator) {
    for cap in SRC_RE.captures_iter(html) {
        let src = &cap[1];
        if !src.starts_with('/') || src.starts_with("//") {
            continue;
        }
        if !out_dir.join(src.trim_start_matches('/')).is_file() {
            agg.add("asset-missing", "assets", "referenced asset missing from output", rel);
            return;
        }
    }
}

/// Does a site URL path resolve to a file in the output?
fn resolves(out_dir: &Path, url: &str) -> bool {
    let trimmed = url.trim_start_matches('/');
    if trimmed.is_empty() {
        return out_dir.join("index.html").is_file();
    }
    let direct = out_dir.join(trimmed);
    direct.is_file()
        || out_dir.join(trimmed.trim_end_matches('/')).join("index.html").is_file()
        || out_dir.join(format!("{}.html", trimmed.trim_end_matches('/'))).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_OK: &str = "<html><head><meta charset=\"utf-8\"><title>t</title>\
        <meta name=\"description\" content=\"d\"></head>\
        <body><nav></nav><h1>a</h1><h2>b</h2></body></html>";

    fn write_output(dir: &Path, files: &[(&str, &str)]) {
        for (rel, content) in files {
            let path = dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn test_clean_output_passes() {
        let dir = tempfile::tempdir().unwrap();
        write_output(dir.path(), &[("index.html", PAGE_OK)]);
        let result = audit_output(dir.path(), &CheckConfig::default());
        assert!(result.success);
        assert!(result.issues.is_empty(), "issues: {:?}", result.issues);
    }

    #[test]
    fn test_nav_missing_aggregated_single_warning() {
        let dir = tempfile::tempdir().unwrap();
        let no_nav = "<html><head><meta charset=\"utf-8\"><title>t</title>\
            <meta name=\"description\" content=\"d\"></head><body><h1>x</h1></body></html>";
        write_output(dir.path(), &[("index.html", no_nav), ("a/index.html", no_nav)]);
        let result = audit_output(dir.path(), &CheckConfig::default());
        let nav_issues: Vec<_> =
            result.issues.iter().filter(|i| i.code == "nav-missing").collect();
        assert_eq!(nav_issues.len(), 1);
        assert!(nav_issues[0].message.contains("2 page(s)"));
        assert!(nav_issues[0].message.contains("a/index.html"));
    }

    #[test]
    fn test_budget_gate_and_suppression_cycle() {
        let dir = tempfile::tempdir().unwrap();
        write_output(dir.path(), &[("index.html", PAGE_OK), ("extra.txt", "x")]);

        let mut cfg = CheckConfig::default();
        cfg.max_total_files = Some(1);

        // Over budget: one budget issue with the actual count.
        let result = audit_output(dir.path(), &cfg);
        let budget: Vec<_> = result.issues.iter().filter(|i| i.category == "budget").collect();
        assert_eq!(budget.len(), 1);
        assert!(budget[0].message.contains("2 files"));
        assert!(result.success);

        // Excluding the extra file removes the issue.
        cfg.budget_exclude = vec!["*.txt".into()];
        let result = audit_output(dir.path(), &cfg);
        assert!(result.issues.iter().all(|i| i.category != "budget"));

        // Gating the category flips success.
        cfg.budget_exclude.clear();
        cfg.fail_on_categories = vec!["budget".into()];
        let result = audit_output(dir.path(), &cfg);
        assert!(!result.success);

        // Suppressing the code restores success.
        cfg.suppress_issues = vec!["budget-max-files".into()];
        let result = audit_output(dir.path(), &cfg);
        assert!(result.success);
    }

    #[test]
    fn test_duplicate_ids_and_heading_skip() {
        let dir = tempfile::tempdir().unwrap();
        let bad = "<html><head><meta charset=\"utf-8\"><title>t</title>\
            <meta name=\"description\" content=\"d\"></head><body><nav></nav>\
            <p id=\"x\"></p><p id=\"x\"></p><h1>a</h1><h4>skip</h4></body></html>";
        write_output(dir.path(), &[("index.html", bad)]);
        let result = audit_output(dir.path(), &CheckConfig::default());
        let codes: Vec<_> = result.issues.iter().map(|i| i.code.as_str()).collect();
        assert!(codes.contains(&"duplicate-id"));
        assert!(codes.contains(&"heading-skip"));
    }

    #[test]
    fn test_broken_internal_link() {
        let dir = tempfile::tempdir().unwrap();
        let page = "<html><head><meta charset=\"utf-8\"><title>t</title>\
            <meta name=\"description\" content=\"d\"></head><body><nav></nav>\
            <a href=\"/missing/\">x</a></body></html>";
        write_output(dir.path(), &[("index.html", page)]);
        let result = audit_output(dir.path(), &CheckConfig::default());
        assert!(result.issues.iter().any(|i| i.code == "link-broken"));
    }

    #[test]
    fn test_toggles_disable_checks() {
        let dir = tempfile::tempdir().unwrap();
        write_output(dir.path(), &[("index.html", "<html><body>bare</body></html>")]);
        let cfg: CheckConfig = serde_json::from_str(
            r#"{
                "charset": false, "seoMeta": false, "navPresence": false,
                "headingOrder": false, "duplicateIds": false
            }"#,
        )
        .unwrap();
        let result = audit_output(dir.path(), &cfg);
        assert!(result.issues.is_empty(), "issues: {:?}", result.issues);
    }
}
