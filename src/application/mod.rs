// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one command each:
//
//   prepare → load, split, build vocabulary, save artifacts
//   sample  → reload artifacts, stream batches as tensors
//   clean   → reduce a text file to content lemmas
//
// No tensor math and no printing here. Only workflow.

// Corpus → vocabulary → artifacts
pub mod prepare_use_case;

// Artifacts + features → batches
pub mod sample_use_case;

// Free text → lemmas
pub mod clean_use_case;
