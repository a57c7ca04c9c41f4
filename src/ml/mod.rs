// ============================================================
// Layer 5 — Inference
// ============================================================
// The model itself lives outside this crate. This layer only
// drives a trained model, seen through the CaptionPredictor
// trait, to turn an image feature vector into a caption.

/// Greedy token-by-token caption decoder
pub mod decoder;
