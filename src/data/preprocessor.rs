// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Two cleaning paths live here.
//
// 1. Caption normalisation (used by both caption loaders):
//      raw  "A dog runs across the grass ."
//      out  "startseq a dog runs across the grass endseq"
//
//    Steps, applied in order:
//      1. Map tabs, NBSP, zero-width spaces, BOM and control
//         characters to plain spaces
//      2. Lower-case
//      3. Remove every '.'
//      4. Collapse runs of whitespace, trim the ends
//      5. Wrap with the start/end markers
//
//    An empty body still produces "startseq endseq", so every
//    stored caption has at least two tokens.
//
//    Why drop periods?
//      Flickr captions end with " ." or "." inconsistently. Left
//      in, "grass" and "grass." would be two vocabulary entries
//      and "." would be the most common target after "endseq".
//
// 2. Free-text cleaning through a Lemmatizer collaborator:
//    read a file, lower-case it, keep only content lemmas
//    (no stop words, punctuation or numbers), join with spaces.
//    The lemmatizer is handed in by the caller; nothing here
//    loads or caches a model.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use std::{fs, path::Path};

use crate::domain::caption::{END_TOKEN, START_TOKEN};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::{Lemma, Lemmatizer};

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalise one raw caption and wrap it with the markers.
    pub fn normalize_caption(&self, raw: &str) -> String {
        let body = self.clean_body(raw);
        if body.is_empty() {
            format!("{START_TOKEN} {END_TOKEN}")
        } else {
            format!("{START_TOKEN} {body} {END_TOKEN}")
        }
    }

    /// Steps 1–4: character mapping, lower-casing, period removal
    /// and whitespace collapsing, without the markers.
    pub fn clean_body(&self, raw: &str) -> String {
        let mapped: String = raw
            .chars()
            .filter(|&c| c != '.')
            .map(|c| match c {
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect::<String>()
            .to_lowercase();

        mapped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Read a text file and reduce it to its content lemmas.
    pub fn clean_text(&self, path: &Path, lemmatizer: &dyn Lemmatizer) -> PipelineResult<String> {
        if !path.exists() {
            return Err(PipelineError::NotFound { path: path.to_path_buf() });
        }

        let text = fs::read_to_string(path)?;
        let kept: Vec<String> = lemmatizer
            .lemmas(&text.to_lowercase())
            .into_iter()
            .filter(Lemma::is_content)
            .map(|l| l.lemma)
            .collect();

        tracing::debug!("Cleaned '{}' down to {} lemmas", path.display(), kept.len());
        Ok(kept.join(" "))
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── StopWordLemmatizer ───────────────────────────────────────────────────────
// A dependency-free stand-in for a real NLP lemmatizer.
// Lemmas are the surface forms themselves; the flags come from
// a short English stop list and simple character classes.

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he",
    "in", "is", "it", "its", "of", "on", "or", "she", "that", "the", "their",
    "them", "there", "they", "this", "to", "was", "were", "while", "will", "with",
];

#[derive(Debug, Clone, Default)]
pub struct StopWordLemmatizer;

impl StopWordLemmatizer {
    pub fn new() -> Self {
        Self
    }
}

impl Lemmatizer for StopWordLemmatizer {
    fn lemmas(&self, text: &str) -> Vec<Lemma> {
        let mut out = Vec::new();

        for word in text.split_whitespace() {
            // Split leading/trailing punctuation into their own tokens
            // so "dog," yields "dog" and ","
            let core = word.trim_matches(|c: char| c.is_ascii_punctuation());
            let lead = &word[..word.find(core).unwrap_or(0)];

            for p in lead.chars() {
                out.push(punct(p));
            }

            if !core.is_empty() {
                out.push(Lemma {
                    lemma:    core.to_string(),
                    is_stop:  STOP_WORDS.contains(&core),
                    is_punct: false,
                    like_num: core.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.'),
                });
            }

            let trail_start = lead.len() + core.len();
            for p in word[trail_start..].chars() {
                out.push(punct(p));
            }
        }

        out
    }
}

fn punct(c: char) -> Lemma {
    Lemma {
        lemma:    c.to_string(),
        is_stop:  false,
        is_punct: true,
        like_num: false,
    }
}
