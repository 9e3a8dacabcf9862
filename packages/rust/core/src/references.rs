//! References section appended to rewritten articles.

/// Heading of the appended section.
pub const REFERENCES_HEADING: &str = "## References";

/// `body`, a blank line, the references heading and one `- link` line per link.
pub fn append_references(body: &str, links: &[String]) -> String {
    let list = links
        .iter()
        .map(|link| format!("- {link}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{body}\n\n{REFERENCES_HEADING}\n{list}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_links_in_order() {
        let links = vec!["https://a.com/x".to_string(), "https://b.com/y".to_string()];
        assert_eq!(
            append_references("Hello", &links),
            "Hello\n\n## References\n- https://a.com/x\n- https://b.com/y"
        );
    }

    #[test]
    fn body_is_kept_verbatim() {
        let links = vec!["https://a.com/x".to_string()];
        let out = append_references("# Title\n\nBody text.\n", &links);
        assert_eq!(out, "# Title\n\nBody text.\n\n\n## References\n- https://a.com/x");
    }
}
