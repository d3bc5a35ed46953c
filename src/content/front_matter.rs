//! Front matter parsing.
//!
//! Content files open with an optional `---` delimited YAML block followed by
//! the markdown body:
//!
//! ```markdown
//! ---
//! title: "Hello"
//! slug: hello-world
//! layout: post
//! ---
//!
//! # Body starts here
//! ```
//!
//! The parsed block is converted into a JSON object so template bindings and
//! planner lookups work on one value type throughout.

use serde_json::{Map, Value};

/// A parse failure for one content file. Recoverable: the file is excluded
/// from the plan and surfaces as a build warning.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
}

/// Split a content file into its front matter block and body.
///
/// Returns `(yaml, body)`; `yaml` is empty when the file has no front matter.
pub fn split(content: &str) -> (&str, &str) {
    let Some(rest) = content.strip_prefix("---") else {
        return ("", content);
    };
    // The opening fence must be its own line.
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return ("", content);
    };
    match rest.find("\n---") {
        Some(end) => {
            let yaml = &rest[..end];
            let after = &rest[end + 4..];
            let body = after.strip_prefix('\n').or_else(|| after.strip_prefix("\r\n")).unwrap_or(after);
            (yaml, body)
        }
        None => ("", content),
    }
}

/// Parse a content file into `(front matter object, body)`.
///
/// Malformed YAML, or a block that is not a mapping, is a `ParseError`.
pub fn parse(content: &str) -> Result<(Map<String, Value>, String), ParseError> {
    let (yaml, body) = split(content);
    if yaml.trim().is_empty() {
        return Ok((Map::new(), body.to_string()));
    }

    let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| ParseError {
        message: format!("malformed front matter: {e}"),
    })?;
    let json = serde_json::to_value(parsed).map_err(|e| ParseError {
        message: format!("front matter not representable as JSON: {e}"),
    })?;
    match json {
        Value::Object(map) => Ok((map, body.to_string())),
        Value::Null => Ok((Map::new(), body.to_string())),
        other => Err(ParseError {
            message: format!("front matter must be a mapping, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_front_matter() {
        let (yaml, body) = split("---\ntitle: Hi\n---\n\n# Body");
        assert_eq!(yaml, "title: Hi");
        assert_eq!(body, "\n# Body");
    }

    #[test]
    fn test_split_without_front_matter() {
        let (yaml, body) = split("# Just markdown");
        assert_eq!(yaml, "");
        assert_eq!(body, "# Just markdown");
    }

    #[test]
    fn test_parse_typed_values() {
        let (front, body) = parse("---\ntitle: Hello\ndraft: true\nweight: 3\n---\nbody").unwrap();
        assert_eq!(front["title"], "Hello");
        assert_eq!(front["draft"], true);
        assert_eq!(front["weight"], 3);
        assert_eq!(body, "body");
    }

    #[test]
    fn test_parse_malformed_is_error() {
        let err = parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(err.message.contains("malformed front matter"));
    }

    #[test]
    fn test_parse_non_mapping_is_error() {
        let err = parse("---\n- a\n- b\n---\nbody").unwrap_err();
        assert!(err.message.contains("must be a mapping"));
    }

    #[test]
    fn test_unterminated_fence_treated_as_body() {
        let (front, body) = parse("---\ntitle: Hi\nno closing fence").unwrap();
        assert!(front.is_empty());
        assert!(body.starts_with("---"));
    }
}
