// ============================================================
// Layer 6 — Sampling Metrics Logger
// ============================================================
// Records one CSV row per generated batch so the sampling
// distribution can be inspected after a run:
//
//   batch,distinct_images,mean_prefix_len,max_prefix_len,distinct_targets
//   1,31,5.406250,17,24
//   2,32,5.812500,19,27
//
// A healthy stream has distinct_images close to the batch size
// and a mean prefix length around half the typical caption.
//
// Output file: <artifact_dir>/sampling_metrics.csv

use std::{collections::HashSet, fs::File, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::example::Batch;

pub const METRICS_FILE: &str = "sampling_metrics.csv";

/// Summary of one generated batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub batch: usize,
    pub distinct_images: usize,
    pub mean_prefix_len: f64,
    pub max_prefix_len: usize,
    pub distinct_targets: usize,
}

impl BatchMetrics {
    pub fn from_batch(number: usize, batch: &Batch) -> Self {
        let prefix_lens: Vec<usize> = (0..batch.len())
            .map(|row| batch.sequence_row(row).iter().take_while(|&&x| x != 0).count())
            .collect();

        let distinct_images: HashSet<&str> =
            batch.image_ids.iter().map(String::as_str).collect();
        let distinct_targets: HashSet<usize> = batch.target_indices.iter().copied().collect();

        Self {
            batch: number,
            distinct_images: distinct_images.len(),
            mean_prefix_len: prefix_lens.iter().sum::<usize>() as f64
                / prefix_lens.len().max(1) as f64,
            max_prefix_len: prefix_lens.iter().copied().max().unwrap_or(0),
            distinct_targets: distinct_targets.len(),
        }
    }
}

/// Writes BatchMetrics rows to a CSV file, header first.
pub struct SamplingLogger {
    csv_path: PathBuf,
    writer:   csv::Writer<File>,
}

impl SamplingLogger {
    /// Create (or truncate) the metrics file in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let csv_path = dir.join(METRICS_FILE);
        let writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;

        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { csv_path, writer })
    }

    pub fn log(&mut self, m: &BatchMetrics) -> Result<()> {
        self.writer.serialize(m)?;
        self.writer.flush()?;

        tracing::debug!(
            "Batch {}: {} images, mean prefix {:.2}",
            m.batch,
            m.distinct_images,
            m.mean_prefix_len,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
