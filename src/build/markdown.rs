//! Markdown to HTML rendering.
//!
//! Uses pulldown-cmark with GFM-ish extensions (tables, strikethrough, task
//! lists). Definition-list conversion stays off on purpose: `Q:`/`A:`
//! question-answer patterns must render as emphasized paragraphs, not `<dl>`
//! markup. Fenced code blocks pass through verbatim, including embedded
//! HTML- or script-looking text.

use pulldown_cmark::{Options, Parser, html::push_html};

/// Render a markdown body to HTML.
pub fn render(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 2);
    push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_code_preserved_verbatim() {
        let html = render("```\n<script>alert('x')</script>\n```");
        // Escaped, but character-for-character intact inside the block.
        assert!(html.contains("&lt;script&gt;alert('x')&lt;/script&gt;"));
        assert!(html.contains("<pre><code>"));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let html = render("## Using `plan()` safely");
        assert!(html.contains("<h2>Using <code>plan()</code> safely</h2>"));
    }

    #[test]
    fn test_q_emphasis_is_real_strong_element() {
        let html = render("**Q:** What is a Build Plan?");
        assert!(html.contains("<strong>Q:</strong>"));
        assert!(!html.contains("**Q:**"));
    }

    #[test]
    fn test_qa_pattern_not_definition_list() {
        let html = render("**Q:** What?\n\n**A:** That.\n");
        assert!(!html.contains("<dl>"));
        assert!(!html.contains("<dt>"));
    }

    #[test]
    fn test_gfm_table() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
