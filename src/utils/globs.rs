//! Glob matching over route and path strings.
//!
//! Thin wrapper around `glob::Pattern` with `/` treated as a literal
//! separator, so `*` stays within one path segment and `**` crosses
//! segments.

use glob::{MatchOptions, Pattern, PatternError};

/// Compile a glob pattern.
pub fn compile(pattern: &str) -> Result<Pattern, PatternError> {
    Pattern::new(pattern)
}

/// Match a compiled pattern against a path-like string.
pub fn matches(pattern: &Pattern, text: &str) -> bool {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    pattern.matches_with(text, OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_stays_in_segment() {
        let p = compile("posts/*.md").unwrap();
        assert!(matches(&p, "posts/hello.md"));
        assert!(!matches(&p, "posts/2024/hello.md"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let p = compile("docs/**/*.md").unwrap();
        assert!(matches(&p, "docs/guide/intro.md"));
        let all = compile("/**").unwrap();
        assert!(matches(&all, "/anything/at/all/"));
    }
}
