// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that define what the pipeline
// works with. No tensors, no file formats, no randomness here.
//
//   caption.rs   — CaptionCorpus and the reserved markers
//   features.rs  — FeatureTable (pre-computed image features)
//   example.rs   — TrainingExample and Batch
//   error.rs     — PipelineError
//   traits.rs    — collaborator seams
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod caption;

pub mod features;

pub mod example;

pub mod error;

pub mod traits;
