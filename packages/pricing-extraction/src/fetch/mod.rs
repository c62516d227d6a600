//! Fetch-strategy implementations.
//!
//! - `HttpFetcher` - plain HTTP with browser-like headers
//! - `RenderedFetcher` - rendering service that executes page scripts

pub mod http;
pub mod rendered;

pub use http::HttpFetcher;
pub use rendered::RenderedFetcher;
