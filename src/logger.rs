//! Logging utilities with colored module prefixes.
//!
//! This module provides the `log!` macro for formatted terminal output.
//! Every subsystem logs under its own prefix (`plan`, `build`, `audit`,
//! `pipeline`, ...), so a pipeline run reads as an ordered transcript of
//! steps.
//!
//! # Example
//!
//! ```ignore
//! log!("plan"; "resolved {} pages", plan.pages.len());
//! log!("error"; "step {} failed: {}", index, message);
//! ```

use colored::{ColoredString, Colorize};
use std::io::{Write, stdout};

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Print a message with its `[module]` prefix.
///
/// Multiline messages keep the prefix on the first line only; continuation
/// lines are printed as-is so wrapped task output stays readable.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Color based on module name.
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "error" => prefix.bright_red().bold(),
        "warn" | "warning" => prefix.bright_magenta().bold(),
        "pipeline" => prefix.bright_blue().bold(),
        "audit" | "verify" => prefix.bright_green().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_prefix_known_modules() {
        // The colored string still carries the bracketed module name.
        assert!(colorize_prefix("error", "error").to_string().contains("[error]"));
        assert!(colorize_prefix("build", "build").to_string().contains("[build]"));
    }

    #[test]
    fn test_log_does_not_panic() {
        log("test", "single line");
        log("test", "multi\nline");
    }
}
