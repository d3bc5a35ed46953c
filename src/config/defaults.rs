//! Default values for specification fields.
//!
//! Free functions referenced from `#[serde(default = "...")]` attributes so
//! the documented defaults live in one place.

use std::path::PathBuf;

pub fn content_root() -> PathBuf {
    PathBuf::from("content")
}

pub fn themes_root() -> PathBuf {
    PathBuf::from("themes")
}

pub fn data_root() -> PathBuf {
    PathBuf::from("data")
}

pub fn theme() -> String {
    "default".to_string()
}

pub fn engine() -> String {
    "tera".to_string()
}

pub fn include_patterns() -> Vec<String> {
    vec!["*.md".to_string()]
}

pub fn redirect_status() -> u16 {
    301
}
