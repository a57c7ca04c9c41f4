// ============================================================
// Layer 3 — Feature Table
// ============================================================
// Pre-computed image features, one fixed-width vector per image.
//
// Feature extraction happens elsewhere (a CNN run ahead of time).
// The pipeline only reads the table: the batch generator borrows
// it and looks vectors up by image id. Images missing from the
// table are simply never used for training.

use std::collections::HashMap;

use crate::domain::error::{PipelineError, PipelineResult};

/// Width of the reference extractor's pooled output
pub const DEFAULT_FEATURE_WIDTH: usize = 2048;

#[derive(Debug, Clone)]
pub struct FeatureTable {
    vectors: HashMap<String, Vec<f32>>,
    width:   usize,
}

impl FeatureTable {
    /// Build a table, checking every vector has the same width.
    /// An empty map produces a table of width 0.
    pub fn new(vectors: HashMap<String, Vec<f32>>) -> PipelineResult<Self> {
        let width = vectors.values().next().map(Vec::len).unwrap_or(0);

        for (image_id, v) in &vectors {
            if v.len() != width {
                return Err(PipelineError::FeatureWidth {
                    image_id: image_id.clone(),
                    expected: width,
                    actual:   v.len(),
                });
            }
        }

        Ok(Self { vectors, width })
    }

    /// Feature vector for an image, if it was extracted
    pub fn get(&self, image_id: &str) -> Option<&[f32]> {
        self.vectors.get(image_id).map(Vec::as_slice)
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.vectors.contains_key(image_id)
    }

    /// Length F of every vector in the table
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

// Unvalidated collect for in-crate test fixtures only. Everything
// else goes through `new`, so a ragged table is caught at load.
#[cfg(test)]
impl FromIterator<(String, Vec<f32>)> for FeatureTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f32>)>>(iter: I) -> Self {
        let vectors: HashMap<String, Vec<f32>> = iter.into_iter().collect();
        let width = vectors.values().next().map(Vec::len).unwrap_or(0);
        Self { vectors, width }
    }
}
