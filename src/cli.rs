//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Declarative static site build and verification engine
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Site specification file name (default: sitewright.json)
    #[arg(short = 'C', long, default_value = "sitewright.json")]
    pub config: PathBuf,

    /// Project root directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Output directory (relative to project root)
    #[arg(short, long, default_value = "public")]
    pub out: PathBuf,

    /// Clean output directory completely before building
    #[arg(long)]
    pub clean: bool,

    /// Minify the html content
    #[arg(short, long)]
    pub minify: bool,
}

/// Shared check-gating arguments for Verify and Audit
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Fail when an issue in this category is found (repeatable)
    #[arg(long = "fail-on")]
    pub fail_on: Vec<String>,

    /// Issue codes exempt from gating (repeatable)
    #[arg(long = "suppress")]
    pub suppress: Vec<String>,

    /// Total output file budget
    #[arg(long = "max-total-files")]
    pub max_total_files: Option<usize>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new site skeleton
    Scaffold {
        /// the name(path) of the site directory, relative to `root`
        name: Option<PathBuf>,
    },

    /// Plan and build the site
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Check the build plan before building
    Verify {
        #[command(flatten)]
        check_args: CheckArgs,
    },

    /// Check built output
    Audit {
        /// Output directory to audit (relative to project root)
        #[arg(short, long, default_value = "public")]
        out: PathBuf,

        #[command(flatten)]
        check_args: CheckArgs,
    },

    /// Run a pipeline file
    Run {
        /// Pipeline file (relative to project root)
        #[arg(default_value = "pipeline.json")]
        pipeline: PathBuf,
    },
}
