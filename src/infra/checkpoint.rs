// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Keeps everything a later run needs to reproduce the pipeline:
//
//   artifacts/
//     pipeline_config.json   ← batch size, seed, split, paths
//     vocabulary.json        ← written by VocabStore
//     vocab_stats.json       ← vocab size, max_length, counts
//     sampling_metrics.csv   ← written by SamplingLogger
//
// `prepare` writes the config and the vocabulary; `sample`
// reads them back so it streams batches with exactly the
// padding length and vocabulary the prepare step fixed.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::application::prepare_use_case::PipelineConfig;
use crate::data::vocabulary::VocabularyStats;

pub const CONFIG_FILE: &str = "pipeline_config.json";
pub const STATS_FILE: &str = "vocab_stats.json";

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create the store, creating its directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create artefact directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn save_config(&self, cfg: &PipelineConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<PipelineConfig> {
        self.read_json(CONFIG_FILE)
    }

    pub fn save_stats(&self, stats: &VocabularyStats) -> Result<()> {
        self.write_json(STATS_FILE, stats)
    }

    pub fn load_stats(&self) -> Result<VocabularyStats> {
        self.read_json(STATS_FILE)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'prepare' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid JSON in '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts")).unwrap();

        let cfg = PipelineConfig { batch_size: 3, seed: 9, ..PipelineConfig::default() };
        store.save_config(&cfg).unwrap();
        let back = store.load_config().unwrap();
        assert_eq!(back.batch_size, 3);
        assert_eq!(back.seed, 9);
    }

    #[test]
    fn test_missing_stats_is_an_error() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let err   = store.load_stats().unwrap_err();
        assert!(err.to_string().contains("prepare"));
    }
}
