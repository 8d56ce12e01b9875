//! Markdown-to-HTML conversion. The actual conversion is delegated to
//! [`pulldown_cmark`]; this module only fixes the extension set so every
//! caller renders bodies and build output the same way.

use pulldown_cmark::{html, Options, Parser};

/// Converts `markdown` to HTML and appends the result to `out`. Malformed
/// markup is not an error: the converter renders what it can and passes raw
/// HTML through unchanged.
pub fn to_html(out: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(out, Parser::new_ext(markdown, options));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_paragraph() {
        let mut out = String::new();
        to_html(&mut out, "Hello, *world*.");
        assert_eq!(out, "<p>Hello, <em>world</em>.</p>\n");
    }

    #[test]
    fn test_inline_html_passes_through() {
        let mut out = String::new();
        to_html(&mut out, "A <code>send</code> call.");
        assert_eq!(out, "<p>A <code>send</code> call.</p>\n");
    }

    #[test]
    fn test_deterministic() {
        let source = "# Channels\n\nA `Sender` is *cheap* to clone.";
        let mut first = String::new();
        let mut second = String::new();
        to_html(&mut first, source);
        to_html(&mut second, source);
        assert_eq!(first, second);
    }
}
