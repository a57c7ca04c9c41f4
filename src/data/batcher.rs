// ============================================================
// Layer 4 — Caption Batcher
// ============================================================
// Implements Burn's Batcher trait to turn training examples into
// tensors on a device.
//
//   Input:  Vec of B TrainingExamples
//   Output: CaptionBatch with
//             image_features  [B, F]           float
//             input_sequences [B, max_length]  int
//             targets         [B, vocab_size]  float (one-hot)
//             target_indices  [B]              int
//
// Every field is flattened row by row into one Vec and wrapped
// in TensorData with its 2D shape. No dynamic padding is needed
// because every example was padded to max_length when built.
//
// CaptionBatch::from_batch does the same for a Batch that the
// generator has already stacked.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*, tensor::TensorData};

use crate::domain::example::{Batch, TrainingExample};

#[derive(Debug, Clone)]
pub struct CaptionBatch<B: Backend> {
    /// [batch_size, feature_width]
    pub image_features: Tensor<B, 2>,

    /// [batch_size, max_length]
    pub input_sequences: Tensor<B, 2, Int>,

    /// [batch_size, vocab_size]
    pub targets: Tensor<B, 2>,

    /// [batch_size] class indices, for losses that want them
    pub target_indices: Tensor<B, 1, Int>,
}

impl<B: Backend> CaptionBatch<B> {
    /// Copy a stacked Batch onto `device`
    pub fn from_batch(batch: &Batch, device: &B::Device) -> Self {
        let [rows, width]   = batch.feature_shape();
        let [_, max_length] = batch.sequence_shape();
        let [_, vocab_size] = batch.target_shape();

        let indices: Vec<i32> = batch.target_indices.iter().map(|&i| i as i32).collect();

        Self::from_flat(
            batch.image_features.clone(),
            batch.input_sequences.clone(),
            batch.targets.clone(),
            indices,
            [rows, width, max_length, vocab_size],
            device,
        )
    }

    fn from_flat(
        features:  Vec<f32>,
        sequences: Vec<i32>,
        targets:   Vec<f32>,
        indices:   Vec<i32>,
        [rows, width, max_length, vocab_size]: [usize; 4],
        device:    &B::Device,
    ) -> Self {
        let image_features = Tensor::<B, 2>::from_data(
            TensorData::new(features, [rows, width]), device,
        );

        let input_sequences = Tensor::<B, 2, Int>::from_data(
            TensorData::new(sequences, [rows, max_length]), device,
        );

        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(targets, [rows, vocab_size]), device,
        );

        let target_indices = Tensor::<B, 1, Int>::from_data(
            TensorData::new(indices, [rows]), device,
        );

        Self { image_features, input_sequences, targets, target_indices }
    }
}

/// Holds the target device so tensors land on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct CaptionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> CaptionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TrainingExample, CaptionBatch<B>> for CaptionBatcher<B> {
    fn batch(&self, items: Vec<TrainingExample>) -> CaptionBatch<B> {
        let rows       = items.len();
        let width      = items.first().map_or(0, |e| e.image_feature.len());
        let max_length = items.first().map_or(0, |e| e.input_sequence.len());
        let vocab_size = items.first().map_or(0, |e| e.target.len());

        let features: Vec<f32> = items
            .iter()
            .flat_map(|e| e.image_feature.iter().copied())
            .collect();
        let sequences: Vec<i32> = items
            .iter()
            .flat_map(|e| e.input_sequence.iter().copied())
            .collect();
        let targets: Vec<f32> = items
            .iter()
            .flat_map(|e| e.target.iter().copied())
            .collect();
        let indices: Vec<i32> = items.iter().map(|e| e.target_index as i32).collect();

        CaptionBatch::from_flat(
            features,
            sequences,
            targets,
            indices,
            [rows, width, max_length, vocab_size],
            &self.device,
        )
    }
}
