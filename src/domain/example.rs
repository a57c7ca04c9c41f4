// ============================================================
// Layer 3 — Training Examples and Batches
// ============================================================
// A TrainingExample is the atomic training unit:
//
//   image feature  [F]           what the picture looks like
//   input sequence [max_length]  caption prefix, post-padded with 0
//   target         [vocab_size]  one-hot of the token that follows
//
// A Batch stacks B examples row by row into flat buffers so the
// three tensors can be built with a single copy each:
//
//   image_features  [B, F]
//   input_sequences [B, max_length]
//   targets         [B, vocab_size]
//
// Both are produced by the generator and consumed by the training
// loop. Neither is persisted.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Image the example was drawn from
    pub image_id: String,

    /// Flattened feature vector of that image
    pub image_feature: Vec<f32>,

    /// Padded caption prefix
    pub input_sequence: Vec<i32>,

    /// One-hot distribution over the vocabulary
    pub target: Vec<f32>,

    /// Vocabulary index of the hot entry in `target`
    pub target_index: usize,
}

/// B stacked training examples in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub image_ids:       Vec<String>,
    pub image_features:  Vec<f32>,
    pub input_sequences: Vec<i32>,
    pub targets:         Vec<f32>,
    pub target_indices:  Vec<usize>,

    batch_size:    usize,
    feature_width: usize,
    max_length:    usize,
    vocab_size:    usize,
}

impl Batch {
    /// Stack examples into a batch.
    ///
    /// Fails if there are no examples or if any example's fields
    /// disagree in length with the first one.
    pub fn stack(examples: Vec<TrainingExample>) -> PipelineResult<Self> {
        let first = examples
            .first()
            .ok_or_else(|| PipelineError::InvalidConfig("cannot stack an empty batch".into()))?;

        let feature_width = first.image_feature.len();
        let max_length    = first.input_sequence.len();
        let vocab_size    = first.target.len();
        let batch_size    = examples.len();

        let mut batch = Self {
            image_ids:       Vec::with_capacity(batch_size),
            image_features:  Vec::with_capacity(batch_size * feature_width),
            input_sequences: Vec::with_capacity(batch_size * max_length),
            targets:         Vec::with_capacity(batch_size * vocab_size),
            target_indices:  Vec::with_capacity(batch_size),
            batch_size,
            feature_width,
            max_length,
            vocab_size,
        };

        for ex in examples {
            if ex.image_feature.len() != feature_width
                || ex.input_sequence.len() != max_length
                || ex.target.len() != vocab_size
            {
                return Err(PipelineError::InvalidConfig(format!(
                    "example from '{}' has shape ({}, {}, {}), expected ({}, {}, {})",
                    ex.image_id,
                    ex.image_feature.len(),
                    ex.input_sequence.len(),
                    ex.target.len(),
                    feature_width,
                    max_length,
                    vocab_size,
                )));
            }
            batch.image_features.extend_from_slice(&ex.image_feature);
            batch.input_sequences.extend_from_slice(&ex.input_sequence);
            batch.targets.extend_from_slice(&ex.target);
            batch.target_indices.push(ex.target_index);
            batch.image_ids.push(ex.image_id);
        }

        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.batch_size == 0
    }

    /// [B, F]
    pub fn feature_shape(&self) -> [usize; 2] {
        [self.batch_size, self.feature_width]
    }

    /// [B, max_length]
    pub fn sequence_shape(&self) -> [usize; 2] {
        [self.batch_size, self.max_length]
    }

    /// [B, vocab_size]
    pub fn target_shape(&self) -> [usize; 2] {
        [self.batch_size, self.vocab_size]
    }

    pub fn feature_row(&self, row: usize) -> &[f32] {
        &self.image_features[row * self.feature_width..(row + 1) * self.feature_width]
    }

    pub fn sequence_row(&self, row: usize) -> &[i32] {
        &self.input_sequences[row * self.max_length..(row + 1) * self.max_length]
    }

    pub fn target_row(&self, row: usize) -> &[f32] {
        &self.targets[row * self.vocab_size..(row + 1) * self.vocab_size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(id: &str, target_index: usize) -> TrainingExample {
        let mut target = vec![0.0; 5];
        target[target_index] = 1.0;
        TrainingExample {
            image_id:       id.to_string(),
            image_feature:  vec![0.5; 3],
            input_sequence: vec![2, 3, 0, 0],
            target,
            target_index,
        }
    }

    #[test]
    fn test_stack_shapes_and_rows() {
        let batch = Batch::stack(vec![example("a", 1), example("b", 4)]).unwrap();
        assert_eq!(batch.feature_shape(),  [2, 3]);
        assert_eq!(batch.sequence_shape(), [2, 4]);
        assert_eq!(batch.target_shape(),   [2, 5]);
        assert_eq!(batch.target_row(1), &[0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(batch.sequence_row(0), &[2, 3, 0, 0]);
        assert_eq!(batch.image_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_stack_rejects_empty() {
        assert!(Batch::stack(Vec::new()).is_err());
    }

    #[test]
    fn test_stack_rejects_ragged_rows() {
        let mut bad = example("b", 0);
        bad.input_sequence.push(0);
        assert!(Batch::stack(vec![example("a", 1), bad]).is_err());
    }
}
