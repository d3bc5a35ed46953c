//! Asset registry: route-pattern to bundle matching.
//!
//! Routes are matched against bundle patterns by specificity: the pattern
//! with the most literal (non-wildcard) characters wins, `/**` is the
//! catch-all fallback.

use serde::{Deserialize, Serialize};

/// Site-wide asset registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRegistry {
    /// Route-pattern => bundle entries, checked in declaration order.
    #[serde(default, alias = "route-bundles")]
    pub route_bundles: Vec<RouteBundle>,
}

/// One bundle of stylesheets and scripts bound to a route pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBundle {
    /// Glob over site URL paths (e.g. `/docs/**`, `/**`).
    pub pattern: String,

    /// Stylesheet URLs injected for matching routes.
    #[serde(default)]
    pub css: Vec<String>,

    /// Script URLs injected for matching routes.
    #[serde(default)]
    pub js: Vec<String>,
}

impl RouteBundle {
    /// Count of literal characters in the pattern.
    ///
    /// Used as the specificity key: `/docs/**` (6 literals) beats `/**`
    /// (1 literal) for a `/docs/intro/` route.
    pub fn specificity(&self) -> usize {
        self.pattern
            .chars()
            .filter(|c| !matches!(c, '*' | '?' | '[' | ']'))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specificity_orders_catch_all_last() {
        let catch_all = RouteBundle { pattern: "/**".into(), ..Default::default() };
        let docs = RouteBundle { pattern: "/docs/**".into(), ..Default::default() };
        assert!(docs.specificity() > catch_all.specificity());
    }

    #[test]
    fn test_registry_accepts_kebab_key() {
        let registry: AssetRegistry = serde_json::from_str(
            r#"{ "route-bundles": [ { "pattern": "/**", "css": ["/site.css"] } ] }"#,
        )
        .unwrap();
        assert_eq!(registry.route_bundles.len(), 1);
    }
}
