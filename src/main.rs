//! Sitewright - a declarative static site build and verification engine.

mod build;
mod cli;
mod config;
mod content;
mod init;
mod logger;
mod pipeline;
mod plan;
mod theme;
mod utils;
mod verify;

use anyhow::{Result, bail};
use build::BuildOptions;
use clap::Parser;
use cli::{CheckArgs, Cli, Commands};
use config::SiteSpec;
use plan::BuildPlan;
use std::path::{Path, PathBuf};
use thiserror::Error;
use verify::{CheckConfig, CheckResult};

/// A verify or audit run with gated errors.
#[derive(Debug, Error)]
#[error("{0}")]
struct GateFailure(String);

/// A pipeline run with a failed step.
#[derive(Debug, Error)]
#[error("{0}")]
struct PipelineFailure(String);

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        log!("error"; "{err:#}");
        std::process::exit(exit_code(&err));
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));

    match &cli.command {
        Commands::Scaffold { name } => {
            let target = name.as_ref().map_or_else(|| root.clone(), |n| root.join(n));
            init::scaffold(&target, name.is_some())
        }
        Commands::Build { build_args } => {
            let (spec, plan) = load_plan(cli, &root)?;
            let report = build::build(
                &spec,
                &plan,
                &root.join(&build_args.out),
                BuildOptions { clean: build_args.clean, minify: build_args.minify },
            )?;
            log!("build"; "done: {} page(s)", report.pages_written);
            Ok(())
        }
        Commands::Verify { check_args } => {
            let (spec, plan) = load_plan(cli, &root)?;
            let result = verify::verify_plan(&spec, &plan, &check_config(check_args));
            report_checks("verify", &result)
        }
        Commands::Audit { out, check_args } => {
            let out_dir = root.join(out);
            if !out_dir.is_dir() {
                bail!("output directory `{}` does not exist", out_dir.display());
            }
            let result = verify::audit_output(&out_dir, &check_config(check_args));
            report_checks("audit", &result)
        }
        Commands::Run { pipeline } => {
            let outcome = pipeline::run_pipeline(&root, &root.join(pipeline))?;
            if !outcome.success {
                let failed: Vec<_> = outcome
                    .results
                    .iter()
                    .filter(|r| !r.success)
                    .map(|r| format!("`{}`: {}", r.task, r.message))
                    .collect();
                return Err(PipelineFailure(failed.join("; ")).into());
            }
            log!("pipeline"; "completed {} step(s)", outcome.results.len());
            Ok(())
        }
    }
}

/// Load the specification and derive a Build Plan.
fn load_plan(cli: &Cli, root: &Path) -> Result<(SiteSpec, BuildPlan)> {
    let spec = SiteSpec::from_path(&root.join(&cli.config))?;
    spec.validate()?;
    let plan = plan::plan(&spec)?;
    log!("plan"; "resolved {} page(s)", plan.pages.len());
    Ok((spec, plan))
}

fn check_config(args: &CheckArgs) -> CheckConfig {
    CheckConfig {
        fail_on_categories: args.fail_on.clone(),
        suppress_issues: args.suppress.clone(),
        max_total_files: args.max_total_files,
        ..CheckConfig::default()
    }
}

fn report_checks(kind: &str, result: &CheckResult) -> Result<()> {
    for warning in &result.warnings {
        log!(kind; "warning: {warning}");
    }
    for error in &result.errors {
        log!("error"; "{error}");
    }
    if !result.success {
        return Err(GateFailure(format!("{kind} failed with {} error(s)", result.errors.len())).into());
    }
    log!(kind; "passed with {} warning(s)", result.warnings.len());
    Ok(())
}

/// Process exit code by failure class.
fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<config::ConfigError>().is_some() {
        2
    } else if err.downcast_ref::<plan::PlanError>().is_some() {
        3
    } else if err.downcast_ref::<build::BuildError>().is_some() {
        4
    } else if err.downcast_ref::<GateFailure>().is_some() {
        5
    } else if err.downcast_ref::<PipelineFailure>().is_some() {
        6
    } else {
        1
    }
}
