//! Page-content extraction for pricing analysis.
//!
//! Returns the full body text whether or not pricing indicators are
//! detected - detection is logged only. Filtering upstream would trade
//! recall for precision; the analysis stage is the one trusted to reject
//! non-pricing content.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::error::{CrawlError, ExtractionError, Result};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::SiteConfig;

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static RE_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static RE_NAV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<nav\b[^>]*>.*?</nav>").unwrap());
static RE_FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<footer\b[^>]*>.*?</footer>").unwrap());
static RE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<header\b[^>]*>.*?</header>").unwrap());
static RE_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)</body>").unwrap());
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static RE_PRICING_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)class\s*=\s*["'][^"']*(?:pricing|price|plan|subscription|billing|package|tier|offer)[^"']*["']"#)
        .unwrap()
});
static RE_BORDER_CARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*class\s*=\s*["'][^"']*border-[^"']*["'][^>]*>"#).unwrap()
});
static RE_PRICE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[.,]?\d*\s?(?:PLN|\$|€|£)").unwrap());

const CURRENCY_SYMBOLS: &[&str] = &["PLN", "$", "€", "£"];

/// Window after a card-like container scanned for currency symbols.
const CARD_SCAN_WINDOW: usize = 600;

/// Extracts analyzable body text from a page.
pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    config: SiteConfig,
}

impl ContentExtractor {
    /// Create an extractor over the given fetch capability.
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: SiteConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch a page and return its body text, capped in length.
    ///
    /// Non-success statuses and missing body markup are typed errors; the
    /// orchestrator treats any error as "skip this candidate".
    pub async fn extract(&self, url: &str) -> Result<String> {
        debug!(url = %url, fetcher = self.fetcher.name(), "Extracting content");

        let page = self.fetcher.fetch_page(url).await?;
        if !page.is_success() {
            return Err(ExtractionError::Crawl(CrawlError::Status {
                url: url.to_string(),
                status: page.status,
            }));
        }

        let stripped = strip_non_content(&page.body);
        let body = match RE_BODY.captures(&stripped) {
            Some(cap) => cap[1].to_string(),
            None => {
                return Err(ExtractionError::UnusableContent {
                    url: url.to_string(),
                    reason: "no body element".to_string(),
                })
            }
        };

        let text = to_text(&body);

        // Detection informs the logs only; the full text is returned either way
        if detect_pricing_indicators(&stripped, &text) {
            info!(url = %url, chars = text.len(), "Pricing indicators detected");
        } else {
            warn!(url = %url, chars = text.len(), "No obvious pricing indicators, returning body text anyway");
        }

        Ok(truncate_chars(text, self.config.max_content_length))
    }
}

/// Remove elements that never hold page content.
fn strip_non_content(html: &str) -> String {
    let html = RE_SCRIPT.replace_all(html, "");
    let html = RE_STYLE.replace_all(&html, "");
    let html = RE_NAV.replace_all(&html, "");
    let html = RE_FOOTER.replace_all(&html, "");
    RE_HEADER.replace_all(&html, "").into_owned()
}

/// Flatten markup to whitespace-normalized text.
fn to_text(html: &str) -> String {
    let text = RE_TAG.replace_all(html, " ");
    let text = decode_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Whether the page looks like it carries pricing.
///
/// Three signals, cheapest first: pricing-flavored class names anywhere in
/// the markup, a currency symbol near a card-like bordered container, or a
/// number adjacent to a currency token in the text.
fn detect_pricing_indicators(html: &str, text: &str) -> bool {
    if RE_PRICING_CLASS.is_match(html) {
        return true;
    }

    for m in RE_BORDER_CARD.find_iter(html) {
        let window_end = (m.end() + CARD_SCAN_WINDOW).min(html.len());
        let window = &html[m.end()..ceil_char_boundary(html, window_end)];
        if CURRENCY_SYMBOLS.iter().any(|c| window.contains(c)) {
            return true;
        }
    }

    RE_PRICE_TOKEN.is_match(text)
}

fn truncate_chars(text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;
    use crate::traits::fetcher::FetchedPage;

    fn extractor(fetcher: MockFetcher) -> ContentExtractor {
        ContentExtractor::new(Arc::new(fetcher), SiteConfig::default())
    }

    #[tokio::test]
    async fn test_extracts_body_text() {
        let html = r#"<html><head><title>T</title></head>
            <body><h1>Pro plan</h1><p>Only $9 per month</p></body></html>"#;
        let fetcher =
            MockFetcher::new().with_page(FetchedPage::ok("https://acme.test/pricing", html));

        let text = extractor(fetcher)
            .extract("https://acme.test/pricing")
            .await
            .unwrap();
        assert_eq!(text, "Pro plan Only $9 per month");
    }

    #[tokio::test]
    async fn test_strips_non_content_elements() {
        let html = r#"<body>
            <script>var x = 1;</script>
            <style>.a { color: red }</style>
            <nav><a href="/">Home</a></nav>
            <header>Site header</header>
            <p>Real content</p>
            <footer>Copyright</footer>
        </body>"#;
        let fetcher = MockFetcher::new().with_page(FetchedPage::ok("https://acme.test", html));

        let text = extractor(fetcher).extract("https://acme.test").await.unwrap();
        assert_eq!(text, "Real content");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut page = FetchedPage::ok("https://acme.test/gone", "not found");
        page.status = 404;
        let fetcher = MockFetcher::new().with_page(page);

        let err = extractor(fetcher)
            .extract("https://acme.test/gone")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Crawl(CrawlError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_body_is_error() {
        let fetcher = MockFetcher::new()
            .with_page(FetchedPage::ok("https://acme.test", "<html><div>no body tag</div></html>"));

        let err = extractor(fetcher).extract("https://acme.test").await.unwrap_err();
        assert!(matches!(err, ExtractionError::UnusableContent { .. }));
    }

    #[tokio::test]
    async fn test_truncates_to_cap() {
        let long = format!("<body>{}</body>", "word ".repeat(20_000));
        let fetcher = MockFetcher::new().with_page(FetchedPage::ok("https://acme.test", long));

        let text = extractor(fetcher).extract("https://acme.test").await.unwrap();
        assert!(text.len() <= 50_000);
    }

    #[test]
    fn test_detects_pricing_class() {
        let html = r#"<div class="pricing-table">...</div>"#;
        assert!(detect_pricing_indicators(html, ""));
    }

    #[test]
    fn test_detects_currency_in_bordered_card() {
        let html = r#"<div class="border-2 rounded"><span>49 €</span></div>"#;
        assert!(detect_pricing_indicators(html, ""));
    }

    #[test]
    fn test_detects_price_token_in_text() {
        assert!(detect_pricing_indicators("", "Starts at 9.99 $ per seat"));
        assert!(detect_pricing_indicators("", "Od 99 PLN miesięcznie"));
    }

    #[test]
    fn test_no_indicators() {
        assert!(!detect_pricing_indicators(
            "<div class=\"hero\">Welcome</div>",
            "We build great software"
        ));
    }

    #[test]
    fn test_entity_decoding() {
        assert_eq!(decode_entities("A &amp; B &lt;3"), "A & B <3");
    }
}
