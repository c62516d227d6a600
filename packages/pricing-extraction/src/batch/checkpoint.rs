//! Durable checkpointing of batch progress.
//!
//! The checkpoint file sits next to the final results file (same name with a
//! `_checkpoint` suffix before the extension), is overwritten after every
//! processed item, and is deleted only when the batch completes normally.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{ExtractionError, Result};
use crate::types::batch::BatchCheckpoint;
use crate::types::pricing::PricingResult;

/// Serialization boundary between the batch loop and disk.
///
/// The runner owns the in-memory results map; this type only reads it at
/// startup and writes it after every item.
pub struct CheckpointStore {
    output_path: PathBuf,
    checkpoint_path: PathBuf,
}

impl CheckpointStore {
    /// Create a store for the given final-results path.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        let output_path = output_path.into();
        let checkpoint_path = derive_checkpoint_path(&output_path);
        Self {
            output_path,
            checkpoint_path,
        }
    }

    /// Path of the checkpoint file.
    pub fn checkpoint_path(&self) -> &Path {
        &self.checkpoint_path
    }

    /// Path of the final results file.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Load the checkpoint if one exists.
    ///
    /// A corrupted checkpoint is treated as absent (with a warning) rather
    /// than aborting the run - the batch starts over in that case.
    pub fn load(&self) -> Option<BatchCheckpoint> {
        if !self.checkpoint_path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&self.checkpoint_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.checkpoint_path.display(), error = %e, "Could not read checkpoint");
                return None;
            }
        };

        match serde_json::from_str::<BatchCheckpoint>(&content) {
            Ok(checkpoint) => {
                info!(
                    processed = checkpoint.processed_count,
                    total = checkpoint.total_count,
                    "Resuming from checkpoint"
                );
                Some(checkpoint)
            }
            Err(e) => {
                warn!(path = %self.checkpoint_path.display(), error = %e, "Corrupted checkpoint, starting fresh");
                None
            }
        }
    }

    /// Load results from a previous completed run's final file, if any.
    pub fn load_existing_results(&self) -> IndexMap<String, PricingResult> {
        if !self.output_path.exists() {
            return IndexMap::new();
        }

        let content = match fs::read_to_string(&self.output_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.output_path.display(), error = %e, "Could not read existing results");
                return IndexMap::new();
            }
        };

        match serde_json::from_str::<IndexMap<String, PricingResult>>(&content) {
            Ok(results) => {
                info!(count = results.len(), "Loaded existing results");
                results
            }
            Err(e) => {
                warn!(path = %self.output_path.display(), error = %e, "Could not parse existing results");
                IndexMap::new()
            }
        }
    }

    /// Overwrite the checkpoint with the current progress.
    pub fn save(&self, checkpoint: &BatchCheckpoint) -> Result<()> {
        let json = serde_json::to_string_pretty(checkpoint)?;
        fs::write(&self.checkpoint_path, json).map_err(ExtractionError::Checkpoint)?;
        info!(
            processed = checkpoint.processed_count,
            total = checkpoint.total_count,
            "Checkpoint saved"
        );
        Ok(())
    }

    /// Write the final results file.
    pub fn write_final(&self, results: &IndexMap<String, PricingResult>) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        fs::write(&self.output_path, json).map_err(ExtractionError::Checkpoint)?;
        info!(path = %self.output_path.display(), count = results.len(), "Final results written");
        Ok(())
    }

    /// Remove the checkpoint file after successful completion.
    pub fn clear(&self) {
        if self.checkpoint_path.exists() {
            if let Err(e) = fs::remove_file(&self.checkpoint_path) {
                warn!(path = %self.checkpoint_path.display(), error = %e, "Could not remove checkpoint");
            } else {
                info!("Checkpoint file cleaned up");
            }
        }
    }
}

/// Insert `_checkpoint` before the extension of the output path.
fn derive_checkpoint_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("results");

    let name = match output_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_checkpoint.{ext}"),
        None => format!("{stem}_checkpoint"),
    };

    output_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_path_derivation() {
        let store = CheckpointStore::new("/tmp/pricing_results.json");
        assert_eq!(
            store.checkpoint_path(),
            Path::new("/tmp/pricing_results_checkpoint.json")
        );

        let no_ext = CheckpointStore::new("/tmp/results");
        assert_eq!(no_ext.checkpoint_path(), Path::new("/tmp/results_checkpoint"));
    }

    #[test]
    fn test_save_load_clear_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("results.json"));

        assert!(store.load().is_none());

        let mut results = IndexMap::new();
        results.insert(
            "Acme".to_string(),
            PricingResult::failure("Acme", "https://acme.test", "Empty URL"),
        );
        let checkpoint = BatchCheckpoint::new(results, 1, 2);

        store.save(&checkpoint).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.processed_count, 1);
        assert_eq!(loaded.total_count, 2);
        assert!(loaded.results.contains_key("Acme"));

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupted_checkpoint_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("results.json"));

        fs::write(store.checkpoint_path(), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_final_write_is_results_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("results.json"));

        let mut results = IndexMap::new();
        results.insert(
            "Acme".to_string(),
            PricingResult::failure("Acme", "https://acme.test", "boom"),
        );
        store.write_final(&results).unwrap();

        let loaded = store.load_existing_results();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("Acme"));
    }
}
