//! Link collection from a site's homepage and important pages.

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::discovery::existence::ExistenceCheck;
use crate::discovery::validator::is_candidate_url;
use crate::traits::fetcher::PageFetcher;
use crate::types::config::DiscoveryConfig;

static RE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).unwrap());
static RE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*["']([^"']+)["']"#).unwrap());
static RE_NAV_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<nav\b[^>]*>.*?</nav>|<(?:ul|div)\b[^>]*(?:class\s*=\s*["'][^"']*(?:navbar|menu|\bnav\b)[^"']*["']|role\s*=\s*["']navigation["'])[^>]*>.*?</(?:ul|div)>"#,
    )
    .unwrap()
});
static RE_FOOTER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<footer\b[^>]*>.*?</footer>|<div\b[^>]*class\s*=\s*["'][^"']*footer[^"']*["'][^>]*>.*?</div>"#)
        .unwrap()
});
static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<[a-z][a-z0-9]*\b([^>]*)>"#).unwrap());
static RE_BUTTON_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)class\s*=\s*["'][^"']*(?:button|btn|cta)[^"']*["']"#).unwrap()
});

/// Collects candidate links from a site.
///
/// Extraction runs several independent strategies over the raw HTML (all
/// anchors, navigation regions, footers, button-like elements carrying an
/// href) and unions the results; a fixed list of important relative paths is
/// then probed and, where live, harvested the same way.
pub struct LinkCollector {
    fetcher: Arc<dyn PageFetcher>,
    existence: Arc<dyn ExistenceCheck>,
    config: DiscoveryConfig,
}

impl LinkCollector {
    /// Create a collector over the given fetch and liveness capabilities.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        existence: Arc<dyn ExistenceCheck>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            fetcher,
            existence,
            config,
        }
    }

    /// Gather a deduplicated set of in-scope absolute URLs for a site.
    ///
    /// A blocked or failed homepage fetch (after the fetcher's own
    /// alternate-header retry) aborts collection and reports zero links.
    pub async fn collect(&self, start_url: &str) -> HashSet<String> {
        let mut links: HashSet<String> = HashSet::new();

        info!(url = %start_url, "Collecting links from homepage");
        let homepage = match self.fetcher.fetch_page(start_url).await {
            Ok(page) if page.is_success() => page,
            Ok(page) => {
                warn!(url = %start_url, status = page.status, "Homepage fetch not successful");
                return links;
            }
            Err(e) => {
                warn!(url = %start_url, error = %e, "Homepage fetch failed");
                return links;
            }
        };

        let base = match Url::parse(&homepage.url) {
            Ok(base) => base,
            Err(_) => return links,
        };

        let homepage_links = extract_links(&base, &homepage.body);
        debug!(count = homepage_links.len(), "Links found on homepage");
        links.extend(homepage_links);

        // Probe important pages, politely spaced out
        for path in &self.config.important_paths {
            let page_url = match base.join(path) {
                Ok(joined) => joined.to_string(),
                Err(_) => continue,
            };

            tokio::time::sleep(std::time::Duration::from_millis(
                self.config.politeness_delay_ms,
            ))
            .await;

            if !self.existence.exists(&page_url).await {
                continue;
            }

            debug!(url = %page_url, "Harvesting important page");
            match self.fetcher.fetch_page(&page_url).await {
                Ok(page) if page.is_success() => {
                    let page_links = extract_links(&base, &page.body);
                    debug!(url = %page_url, count = page_links.len(), "Links found");
                    links.extend(page_links);
                }
                Ok(page) => {
                    debug!(url = %page_url, status = page.status, "Skipping non-success page")
                }
                Err(e) => warn!(url = %page_url, error = %e, "Error fetching important page"),
            }
        }

        info!(url = %start_url, total = links.len(), "Link collection finished");
        links
    }
}

/// Extract candidate links from HTML using every strategy, unioned.
fn extract_links(base: &Url, html: &str) -> HashSet<String> {
    let mut hrefs: HashSet<String> = HashSet::new();

    // Strategy 1: every anchor
    for cap in RE_ANCHOR.captures_iter(html) {
        hrefs.insert(cap[1].to_string());
    }

    // Strategies 2 and 3: anchors inside navigation and footer regions.
    // Redundant with strategy 1 on well-formed pages, but regions sometimes
    // survive where the page-wide scan trips over broken markup.
    for region in RE_NAV_BLOCK
        .find_iter(html)
        .chain(RE_FOOTER_BLOCK.find_iter(html))
    {
        for cap in RE_ANCHOR.captures_iter(region.as_str()) {
            hrefs.insert(cap[1].to_string());
        }
    }

    // Strategy 4: button-like elements carrying an href
    for cap in RE_TAG.captures_iter(html) {
        let attrs = &cap[1];
        if RE_BUTTON_CLASS.is_match(attrs) {
            if let Some(href) = RE_HREF.captures(attrs) {
                hrefs.insert(href[1].to_string());
            }
        }
    }

    hrefs
        .into_iter()
        .filter_map(|href| resolve_candidate(base, &href))
        .collect()
}

/// Resolve one raw href into an absolute candidate URL, or discard it.
fn resolve_candidate(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?.to_string();
    is_candidate_url(&resolved).then_some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_extracts_plain_anchors() {
        let html = r#"
            <a href="/about">About</a>
            <a href="https://example.com/contact">Contact</a>
        "#;
        let links = extract_links(&base(), html);
        assert!(links.contains("https://example.com/about"));
        assert!(links.contains("https://example.com/contact"));
    }

    #[test]
    fn test_skips_anchors_js_mailto_tel() {
        let html = r##"
            <a href="#section">Anchor</a>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="tel:+1555">Call</a>
        "##;
        let links = extract_links(&base(), html);
        assert!(links.is_empty());
    }

    #[test]
    fn test_extracts_button_like_hrefs() {
        let html = r#"<div class="cta primary" href="/signup">Sign up</div>"#;
        let links = extract_links(&base(), html);
        assert!(links.contains("https://example.com/signup"));
    }

    #[test]
    fn test_extracts_nav_and_footer_regions() {
        let html = r#"
            <nav><a href="/pricing">Pricing</a></nav>
            <footer><a href="/terms">Terms</a></footer>
        "#;
        let links = extract_links(&base(), html);
        assert!(links.contains("https://example.com/pricing"));
        assert!(links.contains("https://example.com/terms"));
    }

    #[test]
    fn test_filters_asset_links() {
        let html = r#"<a href="/logo.png">Logo</a><a href="/pricing">Pricing</a>"#;
        let links = extract_links(&base(), html);
        assert!(!links.iter().any(|l| l.ends_with(".png")));
        assert!(links.contains("https://example.com/pricing"));
    }

    #[test]
    fn test_dedup_across_strategies() {
        // The same link in body, nav, and a button collapses to one entry
        let html = r#"
            <a href="/pricing">Pricing</a>
            <nav><a href="/pricing">Pricing</a></nav>
            <a class="btn" href="/pricing">Pricing</a>
        "#;
        let links = extract_links(&base(), html);
        assert_eq!(links.len(), 1);
    }
}
