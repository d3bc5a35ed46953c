//! `exec` task: run an arbitrary external command.
//!
//! External collaborators (module packaging, doc extraction, encoding
//! conversion) are reached exclusively through this task.

use super::{TaskError, TaskOutcome};
use serde::Deserialize;
use serde_json::json;
use std::{path::PathBuf, process::Command};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecOptions {
    pub command: Option<String>,
    pub args: Vec<String>,
    #[serde(alias = "working-directory", alias = "workingDirectory")]
    pub cwd: Option<PathBuf>,
}

pub fn run(root: &std::path::Path, opts: &ExecOptions) -> Result<TaskOutcome, TaskError> {
    let command = opts
        .command
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| TaskError::Options("exec requires a command".to_string()))?;

    // Validate before side effects.
    which::which(command)
        .map_err(|_| TaskError::Options(format!("command `{command}` not found in PATH")))?;

    let cwd = opts.cwd.as_ref().map_or_else(|| root.to_path_buf(), |c| root.join(c));
    let output = Command::new(command)
        .args(&opts.args)
        .current_dir(&cwd)
        .output()
        .map_err(|e| TaskError::Failed(format!("failed to spawn `{command}`: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
    let payload = json!({
        "command": command,
        "status": output.status.code(),
        "stdout": stdout,
        "stderr": stderr,
    });

    if output.status.success() {
        Ok(TaskOutcome { message: format!("`{command}` succeeded"), payload })
    } else {
        Err(TaskError::Failed(format!(
            "`{command}` exited with status {}{}",
            output.status.code().map_or("unknown".to_string(), |c| c.to_string()),
            if stderr.is_empty() { String::new() } else { format!(": {stderr}") }
        )))
    }
}
