//! Display-only rendering of the small Markdown subset used by wiki pages:
//! `#`/`##`/`###` headings, `**bold**`, `*italic*` and line breaks.
//!
//! The stored document is always the Markdown text; this runs once per
//! render and is not meant to be applied to its own output.

use std::sync::LazyLock;

use regex::Regex;

static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mR)^### (.*)$").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mR)^## (.*)$").unwrap());
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mR)^# (.*)$").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());

/// Convert Markdown to an HTML fragment
pub fn to_html(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let html = escape(markdown);
    let html = H3.replace_all(&html, "<h3>${1}</h3>");
    let html = H2.replace_all(&html, "<h2>${1}</h2>");
    let html = H1.replace_all(&html, "<h1>${1}</h1>");
    let html = BOLD.replace_all(&html, "<strong>${1}</strong>");
    let html = ITALIC.replace_all(&html, "<em>${1}</em>");

    html.replace("\r\n", "<br/>").replace('\n', "<br/>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_at_line_start_only() {
        assert_eq!(
            to_html("# One\n## Two\n### Three\nnot # a heading"),
            "<h1>One</h1><br/><h2>Two</h2><br/><h3>Three</h3><br/>not # a heading"
        );
    }

    #[test]
    fn renders_bold_before_italic() {
        assert_eq!(
            to_html("**strong** and *soft*"),
            "<strong>strong</strong> and <em>soft</em>"
        );
    }

    #[test]
    fn emphasis_is_non_greedy() {
        assert_eq!(to_html("*a* b *c*"), "<em>a</em> b <em>c</em>");
    }

    #[test]
    fn default_document_renders() {
        assert_eq!(
            to_html(crate::models::DEFAULT_CONTENT),
            "<h1>New Document</h1><br/><br/>Start writing..."
        );
    }

    #[test]
    fn markup_in_content_is_escaped() {
        assert_eq!(
            to_html("<script>x</script> & co"),
            "&lt;script&gt;x&lt;/script&gt; &amp; co"
        );
    }

    #[test]
    fn crlf_line_endings_stay_out_of_tags() {
        assert_eq!(
            to_html("# Title\r\n## Sub\r\nbody"),
            "<h1>Title</h1><br/><h2>Sub</h2><br/>body"
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(to_html(""), "");
    }
}
