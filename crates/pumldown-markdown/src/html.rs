//! HTML escaping helpers.

/// Lead-in of every rendered failure fragment.
const ERROR_PREAMBLE: &str = "<p>An unexpected exception occurred:</p>";

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Wrap an error message in the HTML fragment shown in place of a document.
///
/// # Example
///
/// ```
/// use pumldown_markdown::error_fragment;
///
/// assert_eq!(
///     error_fragment("bad <input>"),
///     "<p>An unexpected exception occurred:</p><pre>bad &lt;input&gt;</pre>"
/// );
/// ```
#[must_use]
pub fn error_fragment(message: &str) -> String {
    format!("{ERROR_PREAMBLE}<pre>{}</pre>", escape_html(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_ampersand_not_doubled() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
        assert_eq!(escape_html("a<b"), "a&lt;b");
    }

    #[test]
    fn test_error_fragment_starts_with_preamble() {
        let fragment = error_fragment("boom");
        assert!(fragment.starts_with("<p>An unexpected exception occurred:</p>"));
        assert!(fragment.ends_with("<pre>boom</pre>"));
    }
}
