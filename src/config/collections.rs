//! Collection declarations.
//!
//! A collection is a named group of content items sharing an input glob and
//! default rendering rules. Declaration order is meaningful: the planner
//! emits routes in collection declaration order.

use super::defaults;
use serde::{Deserialize, Serialize};

/// One named content group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSpec {
    /// Unique name within the specification.
    pub name: String,

    /// Input glob relative to the content root (e.g. `posts/*.md`).
    pub input: String,

    /// Output route prefix (e.g. `posts`). Empty means the site root.
    #[serde(default)]
    pub output: String,

    /// File patterns to include within the input match.
    #[serde(default = "defaults::include_patterns")]
    pub include: Vec<String>,

    /// Layout bound to items that carry no front-matter `layout`.
    #[serde(default, alias = "default-layout")]
    pub default_layout: Option<String>,

    /// Collection kind, drives the structured-data default
    /// (`news` => NewsArticle, `faq` => FAQPage, ...).
    #[serde(default)]
    pub kind: Option<String>,

    /// A required collection resolving zero content files is fatal.
    #[serde(default)]
    pub required: bool,
}

impl CollectionSpec {
    /// Normalized output prefix without leading or trailing slashes.
    pub fn output_prefix(&self) -> &str {
        self.output.trim_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_defaults() {
        let spec: CollectionSpec =
            serde_json::from_str(r#"{ "name": "posts", "input": "posts/*.md" }"#).unwrap();
        assert_eq!(spec.include, vec!["*.md"]);
        assert!(spec.default_layout.is_none());
        assert!(!spec.required);
    }

    #[test]
    fn test_output_prefix_trims_slashes() {
        let spec: CollectionSpec = serde_json::from_str(
            r#"{ "name": "docs", "input": "docs/**/*.md", "output": "/docs/" }"#,
        )
        .unwrap();
        assert_eq!(spec.output_prefix(), "docs");
    }

    #[test]
    fn test_kebab_alias_for_default_layout() {
        let spec: CollectionSpec = serde_json::from_str(
            r#"{ "name": "news", "input": "news/*.md", "default-layout": "article" }"#,
        )
        .unwrap();
        assert_eq!(spec.default_layout.as_deref(), Some("article"));
    }
}
