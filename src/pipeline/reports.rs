//! Task report files under `<root>/_reports/`.

use super::TaskError;
use serde_json::Value;
use std::{fs, path::Path, path::PathBuf};

pub const REPORTS_DIR: &str = "_reports";

fn target(root: &Path, name: &str, extension: &str) -> Result<PathBuf, TaskError> {
    let dir = root.join(REPORTS_DIR);
    fs::create_dir_all(&dir)
        .map_err(|e| TaskError::Failed(format!("create `{}`: {e}", dir.display())))?;
    Ok(dir.join(format!("{name}.{extension}")))
}

pub fn write_json(root: &Path, name: &str, payload: &Value) -> Result<(), TaskError> {
    let path = target(root, name, "json")?;
    fs::write(&path, format!("{payload:#}"))
        .map_err(|e| TaskError::Failed(format!("write `{}`: {e}", path.display())))
}

pub fn write_markdown(root: &Path, name: &str, content: &str) -> Result<(), TaskError> {
    let path = target(root, name, "md")?;
    fs::write(&path, content)
        .map_err(|e| TaskError::Failed(format!("write `{}`: {e}", path.display())))
}
