// src/fetch/html.rs
// =============================================================================
// This module extracts links from HTML pages using the `scraper` crate.
//
// Unlike a link checker, we do NOT resolve or filter anything here: every
// href is returned exactly as written. Turning "../about" into an absolute
// URL (or throwing away "mailto:") is the normalizer's job, because it needs
// to know the parent page and the SSL policy.
// =============================================================================

use scraper::{Html, Selector};

// Returns the raw href of every <a href> in document order
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='#top'>Top</a>"
//   result = ["/docs", "#top"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("'a[href]' is a valid selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hrefs_in_document_order() {
        let html = r##"
            <a href="/a">A</a>
            <a href="http://ex.com/b">B</a>
            <a href="mailto:test@example.com">Mail</a>
            <a href="#top">Top</a>
        "##;
        assert_eq!(
            extract_hrefs(html),
            vec!["/a", "http://ex.com/b", "mailto:test@example.com", "#top"]
        );
    }

    #[test]
    fn test_anchor_without_href_is_ignored() {
        let html = r#"<a name="here">Here</a><a href="">Empty</a>"#;
        assert_eq!(extract_hrefs(html), vec![""]);
    }

    #[test]
    fn test_no_links() {
        assert!(extract_hrefs("<html><body><p>No links.</p></body></html>").is_empty());
        assert!(extract_hrefs("").is_empty());
    }
}
