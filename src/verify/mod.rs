//! Verification and audit rule engine.
//!
//! Both the verifier (pre-build, over a Build Plan) and the auditor
//! (post-build, over output) run a configurable battery of checks and
//! aggregate findings. Findings are never fatal by themselves; overall
//! success flips only when an issue's category is gated through
//! `failOnCategories` and the issue is not suppressed.

pub mod checks;

pub use checks::{audit_output, verify_plan};

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Check toggles and gating rules.
///
/// All checks default to on; gating defaults to empty (report-only).
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckConfig {
    /// Output structure (root index, layout files resolvable).
    #[educe(Default = true)]
    pub structure: bool,

    /// Navigation presence per page, aggregated into one warning.
    #[educe(Default = true)]
    #[serde(alias = "nav-presence")]
    pub nav_presence: bool,

    /// Internal link integrity.
    #[educe(Default = true)]
    #[serde(alias = "link-integrity")]
    pub link_integrity: bool,

    /// Referenced local assets exist.
    #[educe(Default = true)]
    #[serde(alias = "asset-existence")]
    pub asset_existence: bool,

    /// Duplicate element ids within a page.
    #[educe(Default = true)]
    #[serde(alias = "duplicate-ids")]
    pub duplicate_ids: bool,

    /// Heading levels never skip (h2 to h4 is a finding).
    #[educe(Default = true)]
    #[serde(alias = "heading-order")]
    pub heading_order: bool,

    /// Charset meta present.
    #[educe(Default = true)]
    pub charset: bool,

    /// Total file-count budget.
    #[educe(Default = true)]
    #[serde(alias = "file-budget")]
    pub file_budget: bool,

    /// Title and description meta.
    #[educe(Default = true)]
    #[serde(alias = "seo-meta")]
    pub seo_meta: bool,

    /// Budget ceiling; `None` disables the budget check regardless of the
    /// toggle.
    #[serde(alias = "max-total-files")]
    pub max_total_files: Option<usize>,

    /// Globs excluded from the budget count (relative output paths).
    #[serde(alias = "budget-exclude")]
    pub budget_exclude: Vec<String>,

    /// Categories that flip overall success when present.
    #[serde(alias = "fail-on-categories")]
    pub fail_on_categories: Vec<String>,

    /// Issue codes exempt from gating (case-insensitive match).
    #[serde(alias = "suppress-issues")]
    pub suppress_issues: Vec<String>,
}

/// One finding.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    /// Category tag (`nav`, `budget`, `seo`, ...).
    pub category: String,
    /// Machine-readable code, the suppression key.
    pub code: String,
    /// Human message.
    pub message: String,
    /// File or page context, when the issue is not aggregated.
    pub path: Option<String>,
}

/// Outcome of a verify or audit pass.
#[derive(Debug, Default)]
pub struct CheckResult {
    pub success: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub issues: Vec<Issue>,
}

impl CheckConfig {
    /// Is `category` gated to fail the run?
    fn gates(&self, category: &str) -> bool {
        self.fail_on_categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Is `code` suppressed?
    fn suppresses(&self, code: &str) -> bool {
        self.suppress_issues.iter().any(|c| c.eq_ignore_ascii_case(code))
    }
}

/// Apply gating and suppression to collected issues.
pub fn finalize(cfg: &CheckConfig, issues: Vec<Issue>, mut warnings: Vec<String>) -> CheckResult {
    let mut errors = Vec::new();
    for issue in &issues {
        if cfg.gates(&issue.category) && !cfg.suppresses(&issue.code) {
            errors.push(format!("[{}] {}", issue.category, issue.message));
        } else {
            warnings.push(format!("[{}] {}", issue.category, issue.message));
        }
    }
    CheckResult { success: errors.is_empty(), warnings, errors, issues }
}

// ============================================================================
// Per-code aggregation
// ============================================================================

/// Accumulates repeated per-page findings, flushed into one issue per code.
///
/// Many same-category occurrences across pages become one warning with a
/// count and the affected paths, not one warning per page.
#[derive(Debug, Default)]
pub struct IssueAggregator {
    entries: BTreeMap<String, AggEntry>,
}

#[derive(Debug)]
struct AggEntry {
    category: String,
    label: String,
    pages: Vec<String>,
}

impl IssueAggregator {
    pub fn add(&mut self, code: &str, category: &str, label: &str, path: &str) {
        self.entries
            .entry(code.to_string())
            .or_insert_with(|| AggEntry {
                category: category.to_string(),
                label: label.to_string(),
                pages: Vec::new(),
            })
            .pages
            .push(path.to_string());
    }

    /// Drain into one issue per code.
    pub fn flush(self, issues: &mut Vec<Issue>) {
        for (code, entry) in self.entries {
            let message = format!(
                "{}: {} page(s) affected: {}",
                entry.label,
                entry.pages.len(),
                entry.pages.join(", ")
            );
            issues.push(Issue {
                category: entry.category,
                code,
                message,
                path: None,
            });
        }
    }
}
