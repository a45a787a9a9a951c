//! HTML page shell for the preview.

use super::escape_html;

/// Wrap an HTML fragment into a full page with `css` in a style block.
pub fn wrap_page(fragment: &str, css: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{css}</style>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n"
    )
}

/// Page showing `source` verbatim, used when conversion fails and there is
/// no earlier page to fall back to.
pub fn plain_text_page(source: &str, css: &str) -> String {
    wrap_page(&format!("<pre>{}</pre>", escape_html(source)), css)
}
