//! Listing URL extraction from saved dashboard HTML

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']*\bad=[^"']*)["']"#).expect("valid regex")
});

static AD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bad=(\d+)").expect("valid regex"));

/// Collect listing URLs from an HTML page.
///
/// Links carrying an `ad=` parameter are kept (made absolute against
/// `base_url`), and every other `ad=<digits>` occurrence in the page becomes
/// `<base_url>/alert_result?ad=<id>`. The result is sorted and duplicate-free.
///
/// # Examples
/// ```
/// use homescore::services::extract_listing_urls;
///
/// let html = r#"<a href="/alert_result?ad=42">T2</a> data-ad="x" ad=7"#;
/// let urls = extract_listing_urls(html, "https://www.jinka.fr");
/// assert_eq!(urls, vec![
///     "https://www.jinka.fr/alert_result?ad=42",
///     "https://www.jinka.fr/alert_result?ad=7",
/// ]);
/// ```
pub fn extract_listing_urls(html: &str, base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    let mut urls: BTreeSet<String> = BTreeSet::new();
    let mut linked_ids: BTreeSet<String> = BTreeSet::new();

    for caps in HREF_RE.captures_iter(html) {
        let href = caps[1].trim().replace("&amp;", "&");
        if href.is_empty() {
            continue;
        }
        if let Some(id) = AD_ID_RE.captures(&href) {
            linked_ids.insert(id[1].to_string());
        }
        urls.insert(absolute_url(&href, base));
    }

    for caps in AD_ID_RE.captures_iter(html) {
        let id = &caps[1];
        if !linked_ids.contains(id) {
            urls.insert(format!("{}/alert_result?ad={}", base, id));
        }
    }

    urls.into_iter().collect()
}

fn absolute_url(href: &str, base: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.jinka.fr";

    #[test]
    fn test_empty_html() {
        assert!(extract_listing_urls("", BASE).is_empty());
        assert!(extract_listing_urls("<html><body>nothing</body></html>", BASE).is_empty());
    }

    #[test]
    fn test_relative_and_absolute_links() {
        let html = r#"
            <a href="/alert_result?token=abc&amp;ad=111&amp;from=dashboard_card">A</a>
            <a href='https://www.jinka.fr/alert_result?ad=222'>B</a>
            <a href="/settings">settings</a>
        "#;
        let urls = extract_listing_urls(html, BASE);
        assert_eq!(
            urls,
            vec![
                "https://www.jinka.fr/alert_result?ad=222",
                "https://www.jinka.fr/alert_result?token=abc&ad=111&from=dashboard_card",
            ]
        );
    }

    #[test]
    fn test_ids_without_links() {
        let html = r#"<div data-url="ad=333"></div><script>open("?ad=444")</script>"#;
        let urls = extract_listing_urls(html, BASE);
        assert_eq!(
            urls,
            vec![
                "https://www.jinka.fr/alert_result?ad=333",
                "https://www.jinka.fr/alert_result?ad=444",
            ]
        );
    }

    #[test]
    fn test_output_sorted_and_deduplicated() {
        let html = r#"
            <a href="/alert_result?ad=9">x</a>
            <a href="/alert_result?ad=9">x again</a>
            <span>ad=5</span><span>ad=5</span><span>ad=1</span>
        "#;
        let urls = extract_listing_urls(html, BASE);
        let mut sorted = urls.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(urls, sorted);
        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn test_ignores_lookalike_parameters() {
        let html = r#"<img src="/img?load=123">"#;
        assert!(extract_listing_urls(html, BASE).is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let urls = extract_listing_urls("ad=8", "https://example.org/");
        assert_eq!(urls, vec!["https://example.org/alert_result?ad=8"]);
    }
}
