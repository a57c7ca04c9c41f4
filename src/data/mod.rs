// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a caption file on disk and a tensor batch.
//
//   captions.csv / captions.txt
//       │
//       ▼
//   CsvCaptionLoader / TextCaptionLoader  → CaptionCorpus
//       │        (Preprocessor normalises every caption)
//       ▼
//   Vocabulary         → token ⇄ index, vocab_size, max_length
//       │
//       ▼
//   SequenceEncoder    → encode, pad, one_hot
//       │
//       ├──────────────────────────────┐
//       ▼                              ▼
//   BatchGenerator (+ FeatureTable)   CaptionWindowDataset
//       │   unbounded, random          │   finite, for validation
//       ▼                              ▼
//   CaptionBatcher / CaptionBatch  → burn tensors
//
// Each module owns exactly one step and is tested on its own.

/// Caption file parsing (CSV and raw lines)
pub mod loader;

/// Caption normalisation and lemma-based text cleaning
pub mod preprocessor;

/// Word-level vocabulary with padding and OOV slots
pub mod vocabulary;

/// Caption encoding, padding and one-hot targets
pub mod encoder;

/// Unbounded random batch generator and single-example stream
pub mod generator;

/// Finite dataset of every prefix/target window
pub mod dataset;

/// Burn Batcher producing tensor batches
pub mod batcher;

/// Image-level train/validation split
pub mod splitter;
