//! Sequential task pipeline.
//!
//! A pipeline file is a JSON array of steps (or `{ "steps": [...] }`); each
//! step names a task kind plus flat task options. Steps run strictly in
//! order, single-threaded. A failing step halts the run unless it opts into
//! `allowFailure`, which records the failure and continues.
//!
//! Build products flow forward through [`RunContext`]: a `build` step
//! leaves its spec, plan, and output directory behind so later `verify`,
//! `audit`, and `hosting` steps operate on them without re-loading.

pub mod exec;
pub mod indexnow;
pub mod markdown_fix;
pub mod prune;
pub mod reports;
pub mod xref;

use crate::{
    build::{self, hosting},
    config::{ConfigError, SiteSpec},
    log,
    plan::{self, BuildPlan},
    verify::{self, CheckConfig, CheckResult},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Task failures, classified for reporting.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid task options: {0}")]
    Options(String),

    #[error("network: {0}")]
    Network(String),

    #[error("{0}")]
    Failed(String),
}

/// Successful task result: a one-line summary plus structured details.
#[derive(Debug)]
pub struct TaskOutcome {
    pub message: String,
    pub payload: Value,
}

/// One step as declared in the pipeline file.
#[derive(Debug, Deserialize)]
pub struct StepSpec {
    pub task: String,

    /// Record a failure of this step and keep going.
    #[serde(default, alias = "allowFailure", alias = "allow-failure")]
    pub allow_failure: bool,

    /// Remaining keys are task options, passed through untyped.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PipelineDoc {
    Steps(Vec<StepSpec>),
    Wrapped { steps: Vec<StepSpec> },
}

/// Outcome of one executed step.
#[derive(Debug, Serialize)]
pub struct StepResult {
    pub index: usize,
    pub task: String,
    pub success: bool,
    pub message: String,
    pub payload: Value,
}

/// Outcome of a whole pipeline run.
#[derive(Debug)]
pub struct PipelineRun {
    pub results: Vec<StepResult>,
    pub success: bool,
}

/// Build products carried between steps.
pub struct RunContext {
    pub root: PathBuf,
    pub spec: Option<SiteSpec>,
    pub plan: Option<BuildPlan>,
    pub out_dir: Option<PathBuf>,
}

impl RunContext {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf(), spec: None, plan: None, out_dir: None }
    }
}

/// Load and execute a pipeline file. The returned run's `success` reflects
/// step outcomes; `Err` is reserved for an unreadable or malformed file.
pub fn run_pipeline(root: &Path, pipeline_path: &Path) -> Result<PipelineRun, ConfigError> {
    let raw = fs::read_to_string(pipeline_path)
        .map_err(|e| ConfigError::Io(pipeline_path.to_path_buf(), e))?;
    let doc: PipelineDoc = serde_json::from_str(&raw)
        .map_err(|e| ConfigError::Json(pipeline_path.to_path_buf(), e))?;
    let steps = match doc {
        PipelineDoc::Steps(steps) | PipelineDoc::Wrapped { steps } => steps,
    };

    let mut ctx = RunContext::new(root);
    let mut results = Vec::new();
    let mut success = true;

    for (index, step) in steps.iter().enumerate() {
        log!("pipeline"; "step {}/{}: {}", index + 1, steps.len(), step.task);
        match run_step(&mut ctx, step) {
            Ok(outcome) => {
                log!("pipeline"; "{}", outcome.message);
                results.push(StepResult {
                    index,
                    task: step.task.clone(),
                    success: true,
                    message: outcome.message,
                    payload: outcome.payload,
                });
            }
            Err(err) if step.allow_failure => {
                log!("warn"; "step `{}` failed (allowed): {err}", step.task);
                results.push(StepResult {
                    index,
                    task: step.task.clone(),
                    success: true,
                    message: format!("allowed failure: {err}"),
                    payload: Value::Null,
                });
            }
            Err(err) => {
                log!("error"; "step `{}` failed: {err}", step.task);
                results.push(StepResult {
                    index,
                    task: step.task.clone(),
                    success: false,
                    message: format!("{err}"),
                    payload: Value::Null,
                });
                success = false;
                break;
            }
        }
    }

    Ok(PipelineRun { results, success })
}

/// Dispatch one step by task kind.
pub fn run_step(ctx: &mut RunContext, step: &StepSpec) -> Result<TaskOutcome, TaskError> {
    match step.task.as_str() {
        "build" => run_build(ctx, options(step)?),
        "verify" => run_verify(ctx, options(step)?),
        "audit" => run_audit(ctx, options(step)?),
        "hosting" => run_hosting(ctx, options(step)?),
        "exec" => exec::run(&ctx.root, &options(step)?),
        "markdown-fix" => markdown_fix::run(&ctx.root, &options(step)?),
        "xref-merge" => xref::run(&ctx.root, &options(step)?),
        "indexnow" => run_indexnow(ctx, options(step)?),
        "artifact-prune" => run_prune(options(step)?),
        other => Err(TaskError::Options(format!("unknown task `{other}`"))),
    }
}

/// Parse a step's flat options into a typed options struct.
fn options<T: serde::de::DeserializeOwned>(step: &StepSpec) -> Result<T, TaskError> {
    serde_json::from_value(Value::Object(step.options.clone()))
        .map_err(|e| TaskError::Options(format!("task `{}`: {e}", step.task)))
}

// ============================================================================
// Built-in site tasks
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BuildTaskOptions {
    config: PathBuf,
    #[serde(alias = "out-dir")]
    out_dir: PathBuf,
    clean: bool,
    minify: bool,
}

impl Default for BuildTaskOptions {
    fn default() -> Self {
        Self {
            config: PathBuf::from("sitewright.json"),
            out_dir: PathBuf::from("public"),
            clean: false,
            minify: false,
        }
    }
}

fn run_build(ctx: &mut RunContext, opts: BuildTaskOptions) -> Result<TaskOutcome, TaskError> {
    let spec = SiteSpec::from_path(&ctx.root.join(&opts.config))
        .map_err(|e| TaskError::Failed(format!("{e}")))?;
    spec.validate().map_err(|e| TaskError::Failed(format!("{e}")))?;
    let plan = plan::plan(&spec).map_err(|e| TaskError::Failed(format!("{e}")))?;
    let out_dir = ctx.root.join(&opts.out_dir);
    let report = build::build(
        &spec,
        &plan,
        &out_dir,
        build::BuildOptions { clean: opts.clean, minify: opts.minify },
    )
    .map_err(|e| TaskError::Failed(format!("{e}")))?;

    let outcome = TaskOutcome {
        message: format!("built {} page(s) into `{}`", report.pages_written, opts.out_dir.display()),
        payload: json!({ "pages": report.pages_written, "outDir": opts.out_dir }),
    };
    ctx.spec = Some(spec);
    ctx.plan = Some(plan);
    ctx.out_dir = Some(out_dir);
    Ok(outcome)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VerifyTaskOptions {
    config: Option<PathBuf>,
    #[serde(flatten)]
    checks: CheckConfig,
}

fn run_verify(ctx: &mut RunContext, opts: VerifyTaskOptions) -> Result<TaskOutcome, TaskError> {
    if ctx.spec.is_none() || ctx.plan.is_none() {
        let config = opts.config.clone().unwrap_or_else(|| PathBuf::from("sitewright.json"));
        let spec = SiteSpec::from_path(&ctx.root.join(config))
            .map_err(|e| TaskError::Failed(format!("{e}")))?;
        spec.validate().map_err(|e| TaskError::Failed(format!("{e}")))?;
        let plan = plan::plan(&spec).map_err(|e| TaskError::Failed(format!("{e}")))?;
        ctx.spec = Some(spec);
        ctx.plan = Some(plan);
    }
    let (Some(spec), Some(plan)) = (&ctx.spec, &ctx.plan) else {
        return Err(TaskError::Failed("no build plan available".to_string()));
    };
    let result = verify::verify_plan(spec, plan, &opts.checks);
    check_outcome("verify", result)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AuditTaskOptions {
    #[serde(alias = "out-dir")]
    out_dir: Option<PathBuf>,
    #[serde(flatten)]
    checks: CheckConfig,
}

fn run_audit(ctx: &mut RunContext, opts: AuditTaskOptions) -> Result<TaskOutcome, TaskError> {
    let out_dir = match (&opts.out_dir, &ctx.out_dir) {
        (Some(dir), _) => ctx.root.join(dir),
        (None, Some(dir)) => dir.clone(),
        (None, None) => ctx.root.join("public"),
    };
    if !out_dir.is_dir() {
        return Err(TaskError::Options(format!(
            "output directory `{}` does not exist",
            out_dir.display()
        )));
    }
    let result = verify::audit_output(&out_dir, &opts.checks);
    check_outcome("audit", result)
}

/// Shared reporting for verify and audit results.
fn check_outcome(kind: &str, result: CheckResult) -> Result<TaskOutcome, TaskError> {
    for warning in &result.warnings {
        log!(kind; "warning: {warning}");
    }
    if !result.success {
        return Err(TaskError::Failed(format!(
            "{kind} failed: {}",
            result.errors.join("; ")
        )));
    }
    let payload = json!({
        "warnings": result.warnings.len(),
        "issues": result.issues,
    });
    Ok(TaskOutcome {
        message: format!("{kind} passed with {} warning(s)", result.warnings.len()),
        payload,
    })
}

// ============================================================================
// Hosting selection
// ============================================================================

/// Targets accept both a list and a comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TargetList {
    List(Vec<String>),
    Csv(String),
}

impl TargetList {
    fn into_names(self) -> Vec<String> {
        match self {
            Self::List(names) => names,
            Self::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HostingTaskOptions {
    targets: Option<TargetList>,
    #[serde(alias = "out-dir")]
    out_dir: Option<PathBuf>,
    #[serde(alias = "remove-unselected")]
    remove_unselected: bool,
    /// Fail when a selected target's config file is absent.
    strict: bool,
}

fn run_hosting(ctx: &mut RunContext, opts: HostingTaskOptions) -> Result<TaskOutcome, TaskError> {
    let names = opts
        .targets
        .map(TargetList::into_names)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| TaskError::Options("hosting requires at least one target".to_string()))?;
    let targets = hosting::parse_targets(&names).map_err(TaskError::Options)?;

    let out_dir = match (&opts.out_dir, &ctx.out_dir) {
        (Some(dir), _) => ctx.root.join(dir),
        (None, Some(dir)) => dir.clone(),
        (None, None) => ctx.root.join("public"),
    };
    let report = hosting::select_artifacts(&targets, &out_dir, opts.remove_unselected)
        .map_err(|e| TaskError::Failed(format!("hosting selection: {e}")))?;

    if opts.strict && !report.missing.is_empty() {
        return Err(TaskError::Failed(format!(
            "missing selected artifacts: {}",
            report.missing.join(", ")
        )));
    }

    Ok(TaskOutcome {
        message: format!(
            "hosting selection kept {}, removed {}, missing {}",
            report.kept.len(),
            report.removed.len(),
            report.missing.len()
        ),
        payload: json!({
            "kept": report.kept,
            "removed": report.removed,
            "missing": report.missing,
        }),
    })
}

// ============================================================================
// Network tasks
// ============================================================================

fn run_indexnow(
    ctx: &RunContext,
    opts: indexnow::IndexNowOptions,
) -> Result<TaskOutcome, TaskError> {
    if opts.dry_run {
        // No submitter is ever invoked on a dry run.
        struct NoSubmit;
        impl indexnow::Submitter for NoSubmit {
            fn submit(&self, _endpoint: &str, _body: &Value) -> Result<u16, String> {
                Err("dry run".to_string())
            }
        }
        return indexnow::run(&ctx.root, &opts, &NoSubmit);
    }
    let submitter = indexnow::HttpSubmitter::new()?;
    indexnow::run(&ctx.root, &opts, &submitter)
}

fn run_prune(opts: prune::ArtifactPruneOptions) -> Result<TaskOutcome, TaskError> {
    let repo = opts
        .repo
        .clone()
        .ok_or_else(|| TaskError::Options("artifact-prune requires a repo".to_string()))?;
    let token = opts
        .token
        .clone()
        .ok_or_else(|| TaskError::Options("artifact-prune requires a token".to_string()))?;
    let api = prune::GithubArtifactApi::new(repo, token)?;
    prune::run(&api, &opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_pipeline(dir: &Path, doc: &Value) -> PathBuf {
        let path = dir.join("pipeline.json");
        fs::write(&path, doc.to_string()).unwrap();
        path
    }

    #[test]
    fn test_both_document_shapes_parse() {
        let dir = tempfile::tempdir().unwrap();
        for doc in [
            json!([{ "task": "markdown-fix" }]),
            json!({ "steps": [{ "task": "markdown-fix" }] }),
        ] {
            let path = write_pipeline(dir.path(), &doc);
            let run = run_pipeline(dir.path(), &path).unwrap();
            assert!(run.success);
            assert_eq!(run.results.len(), 1);
        }
    }

    #[test]
    fn test_unknown_task_fails_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pipeline(dir.path(), &json!([{ "task": "frobnicate" }]));
        let run = run_pipeline(dir.path(), &path).unwrap();
        assert!(!run.success);
        assert!(run.results[0].message.contains("unknown task"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_halts_remaining_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pipeline(
            dir.path(),
            &json!([
                { "task": "exec", "command": "false" },
                { "task": "exec", "command": "true" },
            ]),
        );
        let run = run_pipeline(dir.path(), &path).unwrap();
        assert!(!run.success);
        // The second step never executes.
        assert_eq!(run.results.len(), 1);
        assert!(!run.results[0].success);
    }

    #[cfg(unix)]
    #[test]
    fn test_allow_failure_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pipeline(
            dir.path(),
            &json!([
                { "task": "exec", "command": "false", "allowFailure": true },
                { "task": "exec", "command": "true" },
            ]),
        );
        let run = run_pipeline(dir.path(), &path).unwrap();
        assert!(run.success);
        assert_eq!(run.results.len(), 2);
        assert!(run.results[0].message.contains("allowed failure"));
    }

    #[test]
    fn test_malformed_pipeline_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, "not json").unwrap();
        assert!(run_pipeline(dir.path(), &path).is_err());
    }

    #[test]
    fn test_hosting_strict_and_removal() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("_redirects"), "").unwrap();
        fs::write(out.join(".htaccess"), "").unwrap();

        let mut ctx = RunContext::new(dir.path());
        let step: StepSpec = serde_json::from_value(json!({
            "task": "hosting",
            "targets": "netlify",
            "removeUnselected": true,
        }))
        .unwrap();
        let outcome = run_step(&mut ctx, &step).unwrap();
        assert_eq!(outcome.payload["kept"], json!(["_redirects"]));
        assert_eq!(outcome.payload["removed"], json!([".htaccess"]));
        assert!(!out.join(".htaccess").exists());

        // Strict selection fails when a selected artifact is absent.
        let step: StepSpec = serde_json::from_value(json!({
            "task": "hosting",
            "targets": ["vercel"],
            "strict": true,
        }))
        .unwrap();
        let err = run_step(&mut ctx, &step).unwrap_err();
        assert!(format!("{err}").contains("missing selected artifacts"));
    }

    #[test]
    fn test_build_task_rejects_invalid_spec() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("sitewright.json"),
            json!({
                "name": "Test",
                "baseUrl": "https://example.com",
                "collections": [
                    { "name": "docs", "input": "*.md", "output": "/docs" },
                    { "name": "docs", "input": "*.md", "output": "/docs" },
                ],
            })
            .to_string(),
        )
        .unwrap();

        let mut ctx = RunContext::new(dir.path());
        for task in ["build", "verify"] {
            let step: StepSpec = serde_json::from_value(json!({ "task": task })).unwrap();
            let err = run_step(&mut ctx, &step).unwrap_err();
            assert!(format!("{err}").contains("duplicate collection"));
        }
    }

    #[test]
    fn test_dry_run_indexnow_through_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = RunContext::new(dir.path());
        let step: StepSpec = serde_json::from_value(json!({
            "task": "indexnow",
            "host": "docs.example.com",
            "key": "abc",
            "urls": ["https://docs.example.com/a/"],
            "dryRun": true,
        }))
        .unwrap();
        let outcome = run_step(&mut ctx, &step).unwrap();
        assert_eq!(outcome.payload["submitted"], 0);
        assert_eq!(outcome.payload["batches"], 1);
    }
}
