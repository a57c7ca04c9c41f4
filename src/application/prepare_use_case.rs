// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Fixes everything the training stream depends on:
//
//   Step 1: Load the caption file          (Layer 4 - data)
//   Step 2: Split images train/validation  (Layer 4 - data)
//   Step 3: Build or load the vocabulary   (Layer 6 - infra)
//   Step 4: Save config and stats          (Layer 6 - infra)
//
// The vocabulary is built from the TRAINING side only, and its
// max_length becomes the fixed sequence width for every later
// run. Re-running prepare reuses the stored vocabulary unless
// `rebuild` is set.

use std::path::Path;

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{loader::load_corpus, splitter::split_corpus, vocabulary::VocabularyStats};
use crate::domain::caption::CaptionCorpus;
use crate::infra::{checkpoint::ArtifactStore, vocab_store::VocabStore};

// ─── Pipeline Configuration ──────────────────────────────────────────────────
// Saved as JSON by `prepare` and read back by `sample`, so both
// commands agree on the corpus, the split and the batch shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub captions_path:  String,
    pub artifact_dir:   String,
    pub train_fraction: f64,
    pub seed:           u64,
    pub batch_size:     usize,
    pub max_retries:    usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            captions_path:  "data/Flickr8k_Dataset/captions.txt".to_string(),
            artifact_dir:   "artifacts".to_string(),
            train_fraction: 0.9,
            seed:           42,
            batch_size:     64,
            max_retries:    crate::data::generator::DEFAULT_MAX_RETRIES,
        }
    }
}

impl PipelineConfig {
    /// Load the caption file and split it by image with the
    /// configured seed. Deterministic for a given config.
    pub fn load_split(&self) -> Result<(CaptionCorpus, CaptionCorpus)> {
        let corpus = load_corpus(Path::new(&self.captions_path))
            .with_context(|| format!("Cannot load captions from '{}'", self.captions_path))?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok(split_corpus(&corpus, self.train_fraction, &mut rng))
    }
}

pub struct PrepareUseCase {
    config:  PipelineConfig,
    rebuild: bool,
}

impl PrepareUseCase {
    pub fn new(config: PipelineConfig, rebuild: bool) -> Self {
        Self { config, rebuild }
    }

    pub fn execute(&self) -> Result<VocabularyStats> {
        let cfg = &self.config;

        // ── Steps 1–2: Load and split ─────────────────────────────────────────
        tracing::info!("Loading captions from '{}'", cfg.captions_path);
        let (train, val) = cfg.load_split()?;
        tracing::info!(
            "Split: {} training images, {} validation images",
            train.len(),
            val.len()
        );

        // ── Step 3: Vocabulary ────────────────────────────────────────────────
        let vocab_store = VocabStore::new(&cfg.artifact_dir);
        let vocab = if self.rebuild {
            let vocab = crate::data::vocabulary::Vocabulary::from_corpus(&train);
            vocab_store.save(&vocab)?;
            vocab
        } else {
            vocab_store.load_or_build(&train)?
        };

        // ── Step 4: Persist config and stats ──────────────────────────────────
        let stats = vocab.stats(&train);
        let store = ArtifactStore::new(&cfg.artifact_dir)?;
        store.save_config(cfg)?;
        store.save_stats(&stats)?;

        tracing::info!(
            "Vocabulary: {} entries, max_length={}, {} captions over {} images",
            stats.vocab_size,
            stats.max_length,
            stats.caption_count,
            stats.image_count
        );
        Ok(stats)
    }
}
