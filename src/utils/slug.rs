//! URL slug derivation.
//!
//! Converts filenames and titles to URL-safe slugs. Unicode is transliterated
//! to ASCII first so `café-ötletek` becomes `cafe-otletek`.

use deunicode::deunicode;

/// Derive a URL-safe slug from arbitrary text.
///
/// Lowercases, transliterates to ASCII, collapses non-alphanumeric runs into
/// single hyphens, and strips leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut prev_hyphen = true; // suppress leading hyphen
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("2024-review.md"), "2024-review-md");
    }

    #[test]
    fn test_unicode_transliteration() {
        assert_eq!(slugify("café ötletek"), "cafe-otletek");
    }

    #[test]
    fn test_collapses_and_trims() {
        assert_eq!(slugify("  --weird__name--  "), "weird-name");
        assert_eq!(slugify(""), "");
    }
}
