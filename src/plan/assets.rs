//! Asset-bundle to route matching.
//!
//! Bundles declare URL-path globs; the planner picks one bundle per route.
//! Precedence: most literal characters wins, then the longer pattern, then
//! declaration order. `/**` naturally sorts last and acts as the catch-all.

use crate::{
    config::{AssetRegistry, RouteBundle},
    utils::globs,
};
use glob::Pattern;

/// Compiled bundle patterns for one plan operation.
pub struct BundleMatcher {
    compiled: Vec<(Pattern, RouteBundle)>,
    /// Patterns that failed to compile, reported as plan warnings.
    pub bad_patterns: Vec<String>,
}

impl BundleMatcher {
    pub fn new(registry: &AssetRegistry) -> Self {
        let mut compiled = Vec::new();
        let mut bad_patterns = Vec::new();
        for bundle in &registry.route_bundles {
            match globs::compile(&bundle.pattern) {
                Ok(pattern) => compiled.push((pattern, bundle.clone())),
                Err(_) => bad_patterns.push(bundle.pattern.clone()),
            }
        }
        Self { compiled, bad_patterns }
    }

    /// Best-matching bundle for a site URL path.
    pub fn best_match(&self, url: &str) -> Option<&RouteBundle> {
        let mut best: Option<(&RouteBundle, usize, usize)> = None;
        for (pattern, bundle) in &self.compiled {
            if !globs::matches(pattern, url) {
                continue;
            }
            let key = (bundle.specificity(), bundle.pattern.len());
            let better = match best {
                Some((_, spec, len)) => key > (spec, len),
                None => true,
            };
            if better {
                best = Some((bundle, key.0, key.1));
            }
        }
        best.map(|(bundle, _, _)| bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(patterns: &[&str]) -> AssetRegistry {
        AssetRegistry {
            route_bundles: patterns
                .iter()
                .map(|p| RouteBundle { pattern: (*p).to_string(), ..Default::default() })
                .collect(),
        }
    }

    #[test]
    fn test_most_specific_pattern_wins() {
        let matcher = BundleMatcher::new(&registry(&["/**", "/docs/**"]));
        assert_eq!(matcher.best_match("/docs/intro/").unwrap().pattern, "/docs/**");
        assert_eq!(matcher.best_match("/about/").unwrap().pattern, "/**");
    }

    #[test]
    fn test_catch_all_fallback_order_independent() {
        // Declaration order must not matter when specificity differs.
        let matcher = BundleMatcher::new(&registry(&["/docs/**", "/**"]));
        assert_eq!(matcher.best_match("/docs/intro/").unwrap().pattern, "/docs/**");
    }

    #[test]
    fn test_no_match() {
        let matcher = BundleMatcher::new(&registry(&["/docs/**"]));
        assert!(matcher.best_match("/blog/post/").is_none());
    }

    #[test]
    fn test_bad_pattern_collected() {
        let matcher = BundleMatcher::new(&registry(&["/docs/[**"]));
        assert_eq!(matcher.bad_patterns, vec!["/docs/[**"]);
    }
}
