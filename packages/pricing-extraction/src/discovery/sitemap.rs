//! Sitemap traversal with index expansion.
//!
//! Sitemaps can reference other sitemaps, and malicious or broken sites can
//! make that graph cyclic or arbitrarily deep. Traversal is an explicit
//! worklist of `(url, depth)` pairs with a processed set and two independent
//! bounds: a total-iteration cap and a nested-index depth cap. Both must
//! hold for the loop to keep going.

use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::discovery::existence::ExistenceCheck;
use crate::discovery::robots::fetch_robots_txt;
use crate::discovery::validator::is_candidate_url;
use crate::traits::fetcher::PageFetcher;
use crate::types::config::DiscoveryConfig;

/// Well-known sitemap locations relative to the site root.
const WELL_KNOWN_PATHS: &[&str] = &[
    "sitemap.xml",
    "sitemap_index.xml",
    "sitemap/sitemap.xml",
    "sitemap.xml.gz",
    "sitemap/sitemap_index.xml",
    "wp-sitemap.xml",
    "sitemap-index.xml",
];

/// URL substrings that mark a sitemap index without reading its body.
const INDEX_URL_PATTERNS: &[&str] = &[
    "sitemap_index",
    "sitemap-index",
    "sitemap.index",
    "index.xml",
    "sitemap.xml/index",
];

/// Body tokens that mark a sitemap index.
const INDEX_BODY_MARKERS: &[&str] = &["<sitemapindex", "sitemapindex", "sitemap_index", "sitemap-type=\"index\""];

static RE_LOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<loc[^>]*>\s*([^<]+?)\s*</loc>").unwrap());
static RE_SITEMAP_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<sitemap\b[^>]*>(.*?)</sitemap>").unwrap());

/// Traverses a site's sitemaps into a flat URL set.
pub struct SitemapCrawler {
    fetcher: Arc<dyn PageFetcher>,
    existence: Arc<dyn ExistenceCheck>,
    config: DiscoveryConfig,
}

impl SitemapCrawler {
    /// Create a crawler over the given fetch and liveness capabilities.
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

    /// Collect every `<loc>` URL from the site's sitemaps.
    ///
    /// The set includes locs from index sitemaps as well as leaves; child
    /// sitemaps found in indexes are enqueued for their own pass.
    pub async fn collect(&self, site_url: &str) -> HashSet<String> {
        let mut urls: HashSet<String> = HashSet::new();
        let mut processed: HashSet<String> = HashSet::new();

        let robots = fetch_robots_txt(self.fetcher.as_ref(), site_url).await;
        let inter_fetch_delay = robots.crawl_delay();

        let mut queue: VecDeque<(String, usize)> = self
            .initial_candidates(site_url, robots.sitemaps())
            .into_iter()
            .map(|url| (url, 0))
            .collect();

        info!(site = %site_url, candidates = queue.len(), "Sitemap traversal starting");

        let mut iterations = 0;
        while let Some((sitemap_url, depth)) = queue.pop_front() {
            if iterations >= self.config.max_sitemap_iterations {
                warn!(site = %site_url, "Sitemap iteration cap reached");
                break;
            }
            iterations += 1;

            if processed.contains(&sitemap_url) {
                continue;
            }

            if !self.existence.exists(&sitemap_url).await {
                continue;
            }

            if let Some(delay) = inter_fetch_delay {
                tokio::time::sleep(delay).await;
            }

            debug!(url = %sitemap_url, depth = depth, "Processing sitemap");
            processed.insert(sitemap_url.clone());

            let page = match self.fetcher.fetch_page(&sitemap_url).await {
                Ok(page) if page.is_success() => page,
                Ok(page) => {
                    debug!(url = %sitemap_url, status = page.status, "Sitemap fetch not successful");
                    continue;
                }
                Err(e) => {
                    warn!(url = %sitemap_url, error = %e, "Sitemap fetch failed");
                    continue;
                }
            };

            let locs = extract_locs(&page.body);
            debug!(url = %sitemap_url, count = locs.len(), "Locs found in sitemap");
            urls.extend(locs.iter().filter(|u| is_candidate_url(u)).cloned());

            if is_sitemap_index(&sitemap_url, page.content_type.as_deref(), &page.body) {
                if depth >= self.config.max_sitemap_depth {
                    warn!(url = %sitemap_url, depth = depth, "Sitemap depth cap reached");
                    continue;
                }

                for child in extract_child_sitemaps(&sitemap_url, &page.body) {
                    if !processed.contains(&child) && !queue.iter().any(|(u, _)| u == &child) {
                        queue.push_back((child, depth + 1));
                    }
                }
            }
        }

        info!(
            site = %site_url,
            urls = urls.len(),
            sitemaps_processed = processed.len(),
            "Sitemap traversal finished"
        );
        urls
    }

    /// Build the initial candidate list: well-known paths plus robots.txt
    /// directives.
    fn initial_candidates(&self, site_url: &str, robots_sitemaps: &[String]) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Ok(base) = Url::parse(site_url) {
            for path in WELL_KNOWN_PATHS {
                if let Ok(joined) = base.join(path) {
                    candidates.push(joined.to_string());
                }
            }
        }

        for sitemap in robots_sitemaps {
            if !candidates.contains(sitemap) {
                debug!(url = %sitemap, "Sitemap found in robots.txt");
                candidates.push(sitemap.clone());
            }
        }

        candidates
    }
}

/// Pull every `<loc>` value out of a sitemap body.
fn extract_locs(body: &str) -> Vec<String> {
    RE_LOC
        .captures_iter(body)
        .map(|cap| cap[1].trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Whether a sitemap is an index of other sitemaps.
///
/// Fast path: common index naming in the URL. Slow path: the content type
/// must look like XML, then the body is scanned for index-marker tokens.
fn is_sitemap_index(url: &str, content_type: Option<&str>, body: &str) -> bool {
    let url_lower = url.to_lowercase();
    if INDEX_URL_PATTERNS.iter().any(|p| url_lower.contains(p)) {
        return true;
    }

    if let Some(ct) = content_type {
        if !ct.to_lowercase().contains("xml") {
            return false;
        }
    }

    let body_lower = body.to_lowercase();
    INDEX_BODY_MARKERS.iter().any(|m| body_lower.contains(m))
}

/// Extract child sitemap URLs from an index.
///
/// Prefers `<sitemap><loc>` entries; if the index has none (malformed or
/// non-standard), falls back to any `<loc>` that differs from the parent and
/// looks sitemap-like.
fn extract_child_sitemaps(parent_url: &str, body: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut children = Vec::new();

    for entry in RE_SITEMAP_ENTRY.captures_iter(body) {
        for cap in RE_LOC.captures_iter(&entry[1]) {
            let url = cap[1].trim().to_string();
            if !url.is_empty() && seen.insert(url.clone()) {
                children.push(url);
            }
        }
    }

    if children.is_empty() {
        for cap in RE_LOC.captures_iter(body) {
            let url = cap[1].trim().to_string();
            let lower = url.to_lowercase();
            if url != parent_url
                && (lower.contains("sitemap") || lower.ends_with(".xml"))
                && seen.insert(url.clone())
            {
                children.push(url);
            }
        }
    }

    children
}
