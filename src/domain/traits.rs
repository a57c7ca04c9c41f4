// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams where the pipeline meets its collaborators:
//
//   CaptionSource     — anything that yields a CaptionCorpus
//                       (CSV loader, raw-text loader, ...)
//   Lemmatizer        — the external NLP model used by the
//                       text cleaner; passed in explicitly,
//                       never held in a global
//   CaptionPredictor  — the trained captioning model as seen
//                       by the greedy decoder
//
// The data and ml layers are written against these traits so
// the heavy collaborators (a spaCy-like lemmatizer, a neural
// network) can be swapped for small fakes in tests.

use std::path::Path;

use crate::domain::caption::CaptionCorpus;
use crate::domain::error::PipelineResult;

// ─── CaptionSource ────────────────────────────────────────────────────────────
/// Any component that can parse a caption file into a corpus.
///
/// Implementations:
///   - CsvCaptionLoader  → header-based CSV (`image,caption`)
///   - TextCaptionLoader → raw `image_file,caption` lines
pub trait CaptionSource {
    /// Parse the file at `path`. Fails with NotFound if it is missing.
    fn load(&self, path: &Path) -> PipelineResult<CaptionCorpus>;
}

// ─── Lemmatizer ───────────────────────────────────────────────────────────────
/// One analysed token as reported by a lemmatizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lemma {
    pub lemma:    String,
    pub is_stop:  bool,
    pub is_punct: bool,
    pub like_num: bool,
}

impl Lemma {
    /// A content word worth keeping after cleaning
    pub fn is_content(&self) -> bool {
        !self.is_stop && !self.is_punct && !self.like_num
    }
}

/// External tokenizer/lemmatizer collaborator.
pub trait Lemmatizer {
    /// Analyse already lower-cased text into lemmas.
    fn lemmas(&self, text: &str) -> Vec<Lemma>;
}

// ─── CaptionPredictor ─────────────────────────────────────────────────────────
/// The captioning model as a callable:
/// (image feature, padded partial sequence) → probability over vocabulary.
pub trait CaptionPredictor {
    fn predict(&self, feature: &[f32], sequence: &[i32]) -> anyhow::Result<Vec<f32>>;
}

/// Any matching closure is a predictor, which keeps tests and
/// framework adapters free of boilerplate wrapper types.
impl<F> CaptionPredictor for F
where
    F: Fn(&[f32], &[i32]) -> anyhow::Result<Vec<f32>>,
{
    fn predict(&self, feature: &[f32], sequence: &[i32]) -> anyhow::Result<Vec<f32>> {
        self(feature, sequence)
    }
}
