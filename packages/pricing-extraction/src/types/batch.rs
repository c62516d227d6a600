//! Batch input and checkpoint types.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::pricing::PricingResult;

/// One input row: a site name and its website URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Unique item name within the batch
    pub name: String,

    /// Website URL; may be empty, which fails the item without network access
    pub website: String,
}

impl BatchItem {
    /// Create a new batch item.
    pub fn new(name: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: website.into(),
        }
    }
}

/// Durable snapshot of batch progress.
///
/// This is the sole recovery point: the final results file is only a copy of
/// `results` written at normal completion. `processed_count` is
/// non-decreasing across saves within one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCheckpoint {
    /// Results keyed by item name, in processing order
    pub results: IndexMap<String, PricingResult>,

    /// Items processed so far, including skipped and errored ones
    pub processed_count: usize,

    /// Total items in the batch
    pub total_count: usize,

    /// When this snapshot was written
    pub timestamp: DateTime<Utc>,
}

impl BatchCheckpoint {
    /// Create a checkpoint for the given progress.
    pub fn new(
        results: IndexMap<String, PricingResult>,
        processed_count: usize,
        total_count: usize,
    ) -> Self {
        Self {
            results,
            processed_count,
            total_count,
            timestamp: Utc::now(),
        }
    }
}

/// End-of-run accounting for user-visible reporting.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Total items in the batch
    pub total: usize,

    /// Items with a result (success or failure)
    pub processed: usize,

    /// Items with `success = true`
    pub successful: usize,

    /// Failed item names with their reasons
    pub failed: Vec<(String, String)>,

    /// Whether the run was stopped early by cancellation
    pub cancelled: bool,
}

impl BatchSummary {
    /// Build a summary from a results map.
    pub fn from_results(
        results: &IndexMap<String, PricingResult>,
        total: usize,
        cancelled: bool,
    ) -> Self {
        let successful = results.values().filter(|r| r.success).count();
        let failed = results
            .iter()
            .filter(|(_, r)| !r.success)
            .map(|(name, r)| {
                (
                    name.clone(),
                    r.error.clone().unwrap_or_else(|| "Unknown error".to_string()),
                )
            })
            .collect();

        Self {
            total,
            processed: results.len(),
            successful,
            failed,
            cancelled,
        }
    }
}
