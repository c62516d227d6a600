//! Candidate-URL discovery: validation, liveness, link collection, sitemaps.

pub mod existence;
pub mod links;
pub mod robots;
pub mod sitemap;
pub mod validator;

pub use existence::{ExistenceCheck, ExistenceChecker, HttpProbe, ProbeTransport};
pub use links::LinkCollector;
pub use robots::{fetch_robots_txt, RobotsTxt};
pub use sitemap::SitemapCrawler;
pub use validator::is_candidate_url;
