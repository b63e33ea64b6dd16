//! Markdown export and HTML conversion

use pulldown_cmark::{html, Options, Parser};

/// Notes as they go into a `.md` file
pub fn export_markdown(notes: &str) -> String {
    notes.trim().to_string()
}

/// Render markdown notes to an HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Wrap an HTML fragment in a full document with the stylesheet inlined
pub fn build_html_document(body: &str, css: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        css.trim(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_markdown_trims() {
        assert_eq!(export_markdown("\n\n# Notes\n- a\n  \n"), "# Notes\n- a");
        assert_eq!(export_markdown("   "), "");
    }

    #[test]
    fn test_heading_and_list() {
        let html = markdown_to_html("# Sun\n\n- star\n- hot\n");
        assert_eq!(html, "<h1>Sun</h1>\n<ul>\n<li>star</li>\n<li>hot</li>\n</ul>\n");
    }

    #[test]
    fn test_tables_enabled() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_strikethrough_enabled() {
        let html = markdown_to_html("~~old~~ new");
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_raw_html_is_passed_through() {
        let html = markdown_to_html("a <b>bold</b> word");
        assert!(html.contains("<b>bold</b>"));
    }

    #[test]
    fn test_document_inlines_css() {
        let doc = build_html_document("<p>x</p>\n", "body { color: red; }\n");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<style>\nbody { color: red; }\n</style>"));
        assert!(doc.contains("<body>\n<p>x</p>\n</body>"));
        assert!(doc.contains("charset=\"utf-8\""));
    }
}
