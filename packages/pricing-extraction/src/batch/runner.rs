//! Resumable batch processing over a list of sites.
//!
//! One site at a time, strictly sequential. The runner is the single writer
//! of the results map; the checkpoint is written after every item (including
//! skipped and errored ones), so a crash or interrupt at any point resumes
//! without reprocessing completed names.

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::batch::checkpoint::CheckpointStore;
use crate::pipeline::site::SitePipeline;
use crate::types::batch::{BatchCheckpoint, BatchItem, BatchSummary};
use crate::types::config::BatchConfig;
use crate::types::pricing::PricingResult;

/// Drives a batch of sites through the pipeline with checkpointed progress.
pub struct BatchRunner {
    pipeline: Arc<SitePipeline>,
    store: CheckpointStore,
    config: BatchConfig,
    cancel: CancellationToken,
}

impl BatchRunner {
    /// Create a runner with default configuration.
    pub fn new(pipeline: SitePipeline, store: CheckpointStore) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            store,
            config: BatchConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the batch configuration.
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Token that stops the run between sites when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Process every item that does not already have a result.
    ///
    /// Returns the end-of-run summary. The final results file is written and
    /// the checkpoint removed only on a full, uncancelled pass.
    pub async fn run(&self, items: &[BatchItem]) -> crate::error::Result<BatchSummary> {
        let total = items.len();

        let (mut results, mut processed_count) = match self.store.load() {
            Some(checkpoint) => (checkpoint.results, checkpoint.processed_count),
            None => {
                let existing = self.store.load_existing_results();
                let count = existing.len();
                (existing, count)
            }
        };

        let remaining: Vec<&BatchItem> = items
            .iter()
            .filter(|item| !results.contains_key(&item.name))
            .collect();

        info!(
            total = total,
            already_processed = results.len(),
            remaining = remaining.len(),
            "Batch run starting"
        );

        let mut cancelled = false;
        for item in remaining {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            processed_count += 1;
            info!(
                name = %item.name,
                position = processed_count,
                total = total,
                "Processing item"
            );

            if item.website.trim().is_empty() {
                warn!(name = %item.name, "Empty website, skipping without network access");
                results.insert(
                    item.name.clone(),
                    PricingResult::failure(&item.name, "", "Empty URL"),
                );
                self.save_checkpoint(&results, processed_count, total)?;
                continue;
            }

            let domain = normalize_website(&item.website);

            let result = tokio::select! {
                result = self.process_with_timeout(&item.name, &domain) => result,
                _ = self.cancel.cancelled() => {
                    // Interrupted mid-site: nothing recorded for this item, so
                    // the next run picks it up again
                    cancelled = true;
                    break;
                }
            };

            if result.success {
                info!(name = %item.name, "SUCCESS");
            } else {
                error!(
                    name = %item.name,
                    reason = result.error.as_deref().unwrap_or("unknown"),
                    "FAILED"
                );
            }

            results.insert(item.name.clone(), result);
            self.save_checkpoint(&results, processed_count, total)?;

            tokio::time::sleep(Duration::from_millis(self.config.inter_site_delay_ms)).await;
        }

        if !cancelled {
            self.store.write_final(&results)?;
            self.store.clear();
        } else {
            info!("Run cancelled; checkpoint kept for resume");
        }

        self.pipeline.close().await;

        Ok(BatchSummary::from_results(&results, total, cancelled))
    }

    /// Process one site, bounded by the configured wall-clock timeout.
    async fn process_with_timeout(&self, name: &str, domain: &str) -> PricingResult {
        match self.config.site_timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(
                    Duration::from_secs(secs),
                    self.pipeline.process(name, domain),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(name = %name, secs = secs, "Site processing timed out");
                        let timeout = crate::error::ExtractionError::SiteTimeout { secs };
                        PricingResult::failure(name, domain, timeout.to_string())
                    }
                }
            }
            None => self.pipeline.process(name, domain).await,
        }
    }

    fn save_checkpoint(
        &self,
        results: &IndexMap<String, PricingResult>,
        processed_count: usize,
        total: usize,
    ) -> crate::error::Result<()> {
        let checkpoint = BatchCheckpoint::new(results.clone(), processed_count, total);
        self.store.save(&checkpoint)
    }
}

/// Default bare hosts to https.
fn normalize_website(website: &str) -> String {
    let website = website.trim();
    if website.starts_with("http://") || website.starts_with("https://") {
        website.to_string()
    } else {
        format!("https://{website}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_website() {
        assert_eq!(normalize_website("acme.test"), "https://acme.test");
        assert_eq!(normalize_website("http://acme.test"), "http://acme.test");
        assert_eq!(normalize_website("https://acme.test"), "https://acme.test");
        assert_eq!(normalize_website("  acme.test  "), "https://acme.test");
    }
}
