//! robots.txt parsing, limited to what discovery needs: `Sitemap:`
//! directives and crawl-delay.

use std::time::Duration;

use crate::traits::fetcher::PageFetcher;

/// Parsed robots.txt, reduced to sitemap locations and crawl delay.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    /// Sitemaps listed via `Sitemap:` directives
    sitemaps: Vec<String>,

    /// First crawl-delay seen, seconds
    crawl_delay: Option<f64>,
}

impl RobotsTxt {
    /// Parse robots.txt content.
    pub fn parse(content: &str) -> Self {
        let mut robots = Self::default();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((directive, value)) = line.split_once(':') {
                let directive = directive.trim().to_lowercase();
                let value = value.trim();

                match directive.as_str() {
                    "sitemap" => {
                        if !value.is_empty() {
                            robots.sitemaps.push(value.to_string());
                        }
                    }
                    "crawl-delay" => {
                        if robots.crawl_delay.is_none() {
                            if let Ok(delay) = value.parse::<f64>() {
                                robots.crawl_delay = Some(delay);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        robots
    }

    /// Sitemap URLs listed in the file.
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Requested crawl delay, if any.
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay.map(Duration::from_secs_f64)
    }
}

/// Fetch and parse robots.txt for a site root.
///
/// A missing or unreadable robots.txt yields the empty default - absence of
/// the file never blocks discovery.
pub async fn fetch_robots_txt(fetcher: &dyn PageFetcher, site_url: &str) -> RobotsTxt {
    let url = format!("{}/robots.txt", site_url.trim_end_matches('/'));

    match fetcher.fetch_page(&url).await {
        Ok(page) if page.is_success() => RobotsTxt::parse(&page.body),
        _ => RobotsTxt::default(),
    }
}
