// ============================================================
// Layer 2 — SampleUseCase
// ============================================================
// Runs the training-side data path end to end without a model:
//
//   Step 1: Reload config + vocabulary      (Layer 6 - infra)
//   Step 2: Reload and split the corpus     (Layer 4 - data)
//   Step 3: Load the feature table          (Layer 6 - infra)
//   Step 4: Stream N batches → tensors      (Layer 4 - data)
//   Step 5: Enumerate validation windows    (Layer 4 - data)
//
// This is what a training loop would see, so it doubles as a
// smoke test of the whole pipeline on real data. Per-batch
// statistics go to sampling_metrics.csv.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use burn::data::dataloader::DataLoaderBuilder;

use crate::data::{
    batcher::{CaptionBatch, CaptionBatcher},
    dataset::CaptionWindowDataset,
    generator::{BatchGenerator, GeneratorConfig},
};
use crate::infra::{
    checkpoint::ArtifactStore,
    feature_store::FeatureStore,
    metrics::{BatchMetrics, SamplingLogger},
    vocab_store::VocabStore,
};

type SampleBackend = burn::backend::NdArray;

/// What a sampling run produced
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReport {
    pub batches:             usize,
    pub feature_shape:       [usize; 2],
    pub sequence_shape:      [usize; 2],
    pub target_shape:        [usize; 2],
    pub validation_examples: usize,
    pub validation_batches:  usize,
}

pub struct SampleUseCase {
    artifact_dir:  String,
    features_path: String,
    batches:       usize,
}

impl SampleUseCase {
    pub fn new(
        artifact_dir:  impl Into<String>,
        features_path: impl Into<String>,
        batches:       usize,
    ) -> Self {
        Self {
            artifact_dir:  artifact_dir.into(),
            features_path: features_path.into(),
            batches,
        }
    }

    pub fn execute(&self) -> Result<SampleReport> {
        // ── Step 1: Config and vocabulary ─────────────────────────────────────
        let store = ArtifactStore::new(&self.artifact_dir)?;
        let cfg   = store.load_config()?;
        let vocab = VocabStore::new(&self.artifact_dir).load()?;

        // ── Step 2: Same split as prepare ─────────────────────────────────────
        let (train, val) = cfg.load_split()?;

        // ── Step 3: Features ──────────────────────────────────────────────────
        let features = Arc::new(FeatureStore::load(Path::new(&self.features_path))?);

        // ── Step 4: Training stream ───────────────────────────────────────────
        let device    = Default::default();
        let gen_cfg   = GeneratorConfig::new(cfg.batch_size).with_max_retries(cfg.max_retries);
        let generator = BatchGenerator::with_seed(&train, &vocab, &features, gen_cfg, cfg.seed)
            .context("Cannot start the batch generator")?;
        let mut logger = SamplingLogger::new(store.dir())?;

        let mut shapes = ([0; 2], [0; 2], [0; 2]);
        for (i, batch) in generator.take(self.batches).enumerate() {
            let batch   = batch.with_context(|| format!("Batch {} failed", i + 1))?;
            let tensors = CaptionBatch::<SampleBackend>::from_batch(&batch, &device);

            shapes = (
                tensors.image_features.dims(),
                tensors.input_sequences.dims(),
                tensors.targets.dims(),
            );
            logger.log(&BatchMetrics::from_batch(i + 1, &batch))?;
        }
        tracing::info!(
            "Streamed {} batches: features={:?} sequences={:?} targets={:?}",
            self.batches,
            shapes.0,
            shapes.1,
            shapes.2
        );

        // ── Step 5: Validation windows ────────────────────────────────────────
        let val_dataset = CaptionWindowDataset::from_corpus(&val, &vocab, Arc::clone(&features));
        let validation_examples = val_dataset.example_count();

        let val_loader = DataLoaderBuilder::new(CaptionBatcher::<SampleBackend>::new(device))
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(val_dataset);
        let validation_batches = val_loader.iter().count();

        tracing::info!(
            "Validation: {} windows in {} batches",
            validation_examples,
            validation_batches
        );

        Ok(SampleReport {
            batches: self.batches,
            feature_shape: shapes.0,
            sequence_shape: shapes.1,
            target_shape: shapes.2,
            validation_examples,
            validation_batches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::prepare_use_case::{PipelineConfig, PrepareUseCase};
    use crate::infra::metrics::METRICS_FILE;
    use std::{collections::HashMap, fs};

    #[test]
    fn test_prepare_then_sample() {
        let dir      = tempfile::tempdir().unwrap();
        let captions = dir.path().join("captions.csv");
        fs::write(
            &captions,
            "image,caption\n\
             1.jpg,A cat sat on the mat.\n\
             1.jpg,A cat sleeps.\n\
             2.jpg,A dog ran home.\n\
             3.jpg,Birds fly high.\n\
             4.jpg,A red car.\n",
        )
        .unwrap();

        let features_path = dir.path().join("features.json");
        let vectors: HashMap<String, Vec<f32>> = ["1", "2", "3", "4"]
            .iter()
            .map(|id| (id.to_string(), vec![0.1; 8]))
            .collect();
        FeatureStore::save(&features_path, &vectors).unwrap();

        let artifacts = dir.path().join("artifacts");
        let cfg = PipelineConfig {
            captions_path:  captions.display().to_string(),
            artifact_dir:   artifacts.display().to_string(),
            train_fraction: 0.5,
            batch_size:     4,
            ..PipelineConfig::default()
        };
        let stats = PrepareUseCase::new(cfg, false).execute().unwrap();

        let report = SampleUseCase::new(
            artifacts.display().to_string(),
            features_path.display().to_string(),
            3,
        )
        .execute()
        .unwrap();

        assert_eq!(report.batches, 3);
        assert_eq!(report.feature_shape, [4, 8]);
        assert_eq!(report.sequence_shape, [4, stats.max_length]);
        assert_eq!(report.target_shape, [4, stats.vocab_size]);
        assert!(report.validation_examples > 0);
        assert_eq!(
            report.validation_batches,
            report.validation_examples.div_ceil(4)
        );

        let metrics = fs::read_to_string(artifacts.join(METRICS_FILE)).unwrap();
        assert_eq!(metrics.lines().count(), 4);
    }
}
