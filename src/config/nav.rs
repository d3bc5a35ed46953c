//! Navigation and footer models.
//!
//! Beyond title/url, nav declarations carry consumer-supplied `template`,
//! `class` and `meta` values which pass through the planner and land
//! untouched in `data/site-nav.json`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Site navigation declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavSpec {
    /// Top navigation items.
    #[serde(default)]
    pub items: Vec<NavItem>,

    /// Footer link groups.
    #[serde(default)]
    pub footer: Vec<NavGroup>,

    /// Pass-through template hint for the consuming theme.
    #[serde(default)]
    pub template: Option<String>,

    /// Pass-through CSS class for the consuming theme.
    #[serde(default)]
    pub class: Option<String>,

    /// Arbitrary pass-through metadata.
    #[serde(default)]
    pub meta: Option<Value>,
}

/// One navigation entry, optionally nested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub children: Vec<NavItem>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
}

/// A titled group of footer links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavGroup {
    pub title: String,
    #[serde(default)]
    pub items: Vec<NavItem>,
}
