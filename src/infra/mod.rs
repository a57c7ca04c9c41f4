// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-backed concerns shared by the use cases:
//
//   checkpoint.rs     — ArtifactStore: pipeline config and
//                       vocabulary stats as JSON
//   vocab_store.rs    — saves/loads the vocabulary so training
//                       and inference agree on every index
//   feature_store.rs  — reads pre-computed image features
//   metrics.rs        — per-batch sampling metrics as CSV
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Pipeline config and stats persistence
pub mod checkpoint;

/// Vocabulary persistence
pub mod vocab_store;

/// Feature table loading
pub mod feature_store;

/// Sampling metrics CSV logger
pub mod metrics;
