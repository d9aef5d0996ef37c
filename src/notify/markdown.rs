/// Sanitizing markdown-to-HTML boundary.
///
/// Writeups and notification bodies pass through here before display;
/// raw markdown is never shown. The transform is deliberately
/// conservative: everything is HTML-escaped first, then paragraph and
/// line breaks are restored. Scoring and review logic must never
/// depend on its output.
pub fn markdown_to_safe_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let escaped = escape_html(text);

    let paragraphs: Vec<String> = escaped
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("<p>{}</p>", p.trim().replace('\n', "<br>")))
        .collect();

    paragraphs.join("\n")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        let html = markdown_to_safe_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn renders_paragraphs_and_line_breaks() {
        let html = markdown_to_safe_html("first\nline\n\nsecond");
        assert_eq!(html, "<p>first<br>line</p>\n<p>second</p>");
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(markdown_to_safe_html(""), "");
    }
}
