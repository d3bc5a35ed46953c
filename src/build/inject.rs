//! Computed fragment injection into rendered pages.
//!
//! The builder injects three kinds of fragments after layout rendering:
//! asset bundle tags, structured-data JSON-LD blocks, and the
//! syntax-highlighter bootstrap script. The bootstrap must appear before any
//! highlighter asset `<script>` tag so manual initialization always precedes
//! library load.

use crate::config::RouteBundle;

/// Substring identifying a highlighter library script tag.
const HIGHLIGHT_MARKER: &str = "highlight";

/// Inline bootstrap that initializes the highlighter once it loads.
pub const HIGHLIGHT_BOOTSTRAP: &str = "<script>window.sitewrightHighlight=true;\
window.addEventListener('load',function(){if(window.hljs){hljs.highlightAll();}});</script>";

/// Insert a fragment immediately before `</head>`, or before `</body>`, or
/// append when the document has neither.
pub fn into_head(html: &str, fragment: &str) -> String {
    insert_before(html, "</head>", fragment)
        .or_else(|| insert_before(html, "</body>", fragment))
        .unwrap_or_else(|| format!("{html}{fragment}"))
}

/// Render a bundle into link/script tags.
///
/// When the bundle carries a highlighter script, the bootstrap is placed
/// before the first such tag.
pub fn bundle_fragment(bundle: &RouteBundle) -> String {
    let mut fragment = String::new();
    for css in &bundle.css {
        fragment.push_str(&format!("<link rel=\"stylesheet\" href=\"{css}\">"));
    }
    let mut bootstrapped = false;
    for js in &bundle.js {
        if !bootstrapped && js.contains(HIGHLIGHT_MARKER) {
            fragment.push_str(HIGHLIGHT_BOOTSTRAP);
            bootstrapped = true;
        }
        fragment.push_str(&format!("<script src=\"{js}\"></script>"));
    }
    fragment
}

/// JSON-LD block for a page.
pub fn json_ld_fragment(doc: &serde_json::Value) -> String {
    format!("<script type=\"application/ld+json\">{doc}</script>")
}

/// Guarantee the bootstrap precedes any highlighter script hardcoded in a
/// layout. No-op when the page has no highlighter tag or already carries the
/// bootstrap.
pub fn ensure_highlight_bootstrap(html: String) -> String {
    if html.contains("sitewrightHighlight") {
        return html;
    }
    let Some(script_pos) = find_highlight_script(&html) else {
        return html;
    };
    let mut out = String::with_capacity(html.len() + HIGHLIGHT_BOOTSTRAP.len());
    out.push_str(&html[..script_pos]);
    out.push_str(HIGHLIGHT_BOOTSTRAP);
    out.push_str(&html[script_pos..]);
    out
}

/// Byte offset of the first `<script ... src="...highlight..."` tag.
fn find_highlight_script(html: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(rel) = html[search_from..].find("<script") {
        let start = search_from + rel;
        let end = html[start..].find('>').map(|e| start + e)?;
        let tag = &html[start..end];
        if tag.contains("src") && tag.contains(HIGHLIGHT_MARKER) {
            return Some(start);
        }
        search_from = end;
    }
    None
}

fn insert_before(html: &str, marker: &str, fragment: &str) -> Option<String> {
    let pos = html.find(marker)?;
    let mut out = String::with_capacity(html.len() + fragment.len());
    out.push_str(&html[..pos]);
    out.push_str(fragment);
    out.push_str(&html[pos..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_head() {
        let out = into_head("<html><head></head><body></body></html>", "<meta x>");
        assert_eq!(out, "<html><head><meta x></head><body></body></html>");
    }

    #[test]
    fn test_into_head_without_head_falls_back() {
        let out = into_head("<body>x</body>", "<meta x>");
        assert_eq!(out, "<body>x<meta x></body>");
    }

    #[test]
    fn test_bundle_bootstrap_precedes_highlighter() {
        let bundle = RouteBundle {
            pattern: "/**".into(),
            css: vec!["/site.css".into()],
            js: vec!["/js/app.js".into(), "/js/highlight.min.js".into()],
        };
        let fragment = bundle_fragment(&bundle);
        let bootstrap = fragment.find("sitewrightHighlight").unwrap();
        let library = fragment.find("/js/highlight.min.js").unwrap();
        assert!(bootstrap < library);
        // Non-highlighter script stays ahead of the bootstrap.
        assert!(fragment.find("/js/app.js").unwrap() < bootstrap);
    }

    #[test]
    fn test_ensure_bootstrap_inserted_before_layout_script() {
        let html = "<head><script src=\"/vendor/highlight.js\"></script></head>".to_string();
        let out = ensure_highlight_bootstrap(html);
        let bootstrap = out.find("sitewrightHighlight").unwrap();
        let library = out.find("/vendor/highlight.js").unwrap();
        assert!(bootstrap < library);
    }

    #[test]
    fn test_ensure_bootstrap_idempotent() {
        let html = "<head><script src=\"/vendor/highlight.js\"></script></head>".to_string();
        let once = ensure_highlight_bootstrap(html);
        let twice = ensure_highlight_bootstrap(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_json_ld_fragment() {
        let fragment = json_ld_fragment(&json!({ "@type": "Article" }));
        assert!(fragment.starts_with("<script type=\"application/ld+json\">"));
        assert!(fragment.contains("\"@type\":\"Article\""));
    }
}
