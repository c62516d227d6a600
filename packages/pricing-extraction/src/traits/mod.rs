//! Core trait abstractions.

pub mod fetcher;
pub mod model;

pub use fetcher::{FetchedPage, PageFetcher};
pub use model::LanguageModel;
