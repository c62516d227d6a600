//! Language-model implementations.

pub mod openrouter;

pub use openrouter::OpenRouterModel;
