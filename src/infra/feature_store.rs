// ============================================================
// Layer 6 — Feature Store
// ============================================================
// Reads a pre-computed feature table from JSON:
//
//   {
//     "1000268201_693b08cb0e": [0.12, 0.0, ...],      ← (F,)
//     "1001773457_577c3a7d70": [[0.05, 0.31, ...]]    ← (1, F)
//   }
//
// Extractors often emit one-row matrices; those are squeezed to
// a plain vector so every entry has the canonical 1-D shape.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::domain::error::PipelineError;
use crate::domain::features::FeatureTable;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFeature {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

impl RawFeature {
    fn squeeze(self, image_id: &str) -> Result<Vec<f32>> {
        match self {
            RawFeature::Flat(v) => Ok(v),
            RawFeature::Nested(mut rows) if rows.len() == 1 => Ok(rows.remove(0)),
            RawFeature::Nested(rows) => bail!(
                "feature for '{}' has {} rows; expected a vector or a single row",
                image_id,
                rows.len()
            ),
        }
    }
}

pub struct FeatureStore;

impl FeatureStore {
    pub fn load(path: &Path) -> Result<FeatureTable> {
        if !path.exists() {
            return Err(PipelineError::NotFound { path: path.to_path_buf() }.into());
        }

        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read features from '{}'", path.display()))?;
        let raw: HashMap<String, RawFeature> = serde_json::from_str(&json)
            .with_context(|| format!("Invalid feature file '{}'", path.display()))?;

        let vectors = raw
            .into_iter()
            .map(|(id, f)| {
                let v = f.squeeze(&id)?;
                Ok((id, v))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let table = FeatureTable::new(vectors)?;
        tracing::info!(
            "Loaded {} feature vectors of width {} from '{}'",
            table.len(),
            table.width(),
            path.display()
        );
        Ok(table)
    }

    pub fn save(path: &Path, vectors: &HashMap<String, Vec<f32>>) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        fs::write(path, serde_json::to_string(vectors)?)
            .with_context(|| format!("Cannot write features to '{}'", path.display()))
    }
}
