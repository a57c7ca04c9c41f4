// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the vocabulary next to the other run artefacts.
//
// The same vocabulary must be used for training and inference:
// its indices are the model's output classes and its max_length
// is the model's input width. Rebuilding it from a slightly
// different corpus silently shifts every index, so once a
// vocabulary is saved it is loaded, never rebuilt.
//
// Why compare against a fresh build on load?
//   A stored vocabulary from an older caption file (or another
//   seed/split) would keep its old max_length. Longer captions
//   would then be cut by padding, and the cut prefixes would no
//   longer predict their targets. Building is deterministic, so
//   the stored file must equal a build from the current
//   training corpus; anything else is a stale artefact.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};

use crate::data::vocabulary::Vocabulary;
use crate::domain::caption::CaptionCorpus;

pub const VOCAB_FILE: &str = "vocabulary.json";

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(VOCAB_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load the saved vocabulary, or build one from `corpus` and save it.
    ///
    /// # Arguments
    /// * `corpus` - The TRAINING side of the split the vocabulary belongs to
    ///
    /// # Returns
    /// The stored vocabulary when it matches `corpus`, otherwise an
    /// error asking for a rebuild (the stored file is left untouched).
    pub fn load_or_build(&self, corpus: &CaptionCorpus) -> Result<Vocabulary> {
        let built = Vocabulary::from_corpus(corpus);

        if !self.exists() {
            tracing::info!("Building vocabulary from {} captions", corpus.caption_count());
            self.save(&built)?;
            return Ok(built);
        }

        tracing::info!("Loading existing vocabulary from '{}'", self.path().display());
        let stored = self.load()?;
        if stored != built {
            bail!(
                "'{}' was built from a different training corpus \
                 (stored: {} entries, max_length {}; current: {} entries, max_length {}). \
                 Re-run 'prepare' with --rebuild.",
                self.path().display(),
                stored.vocab_size(),
                stored.max_length(),
                built.vocab_size(),
                built.max_length()
            );
        }
        Ok(stored)
    }

    pub fn load(&self) -> Result<Vocabulary> {
        let path = self.path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read vocabulary from '{}'. Run 'prepare' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid vocabulary file '{}'", path.display()))
    }

    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.path();
        fs::write(&path, serde_json::to_string(vocab)?)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;

        tracing::debug!(
            "Saved vocabulary ({} entries) to '{}'",
            vocab.vocab_size(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_vocabulary_is_reused() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());

        let mut corpus = CaptionCorpus::new();
        corpus.push("a", "startseq a cat endseq");
        let built = store.load_or_build(&corpus).unwrap();
        assert!(store.exists());

        assert_eq!(store.load_or_build(&corpus).unwrap(), built);
    }

    #[test]
    fn test_stale_vocabulary_is_refused() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());

        let mut first = CaptionCorpus::new();
        first.push("a", "startseq a cat endseq");
        let built = store.load_or_build(&first).unwrap();

        let mut second = CaptionCorpus::new();
        second.push("b", "startseq zebra zebra zebra endseq");
        let err = store.load_or_build(&second).unwrap_err();
        assert!(err.to_string().contains("--rebuild"));

        // The stored file is not overwritten
        assert_eq!(store.load().unwrap(), built);
    }

    #[test]
    fn test_load_without_save_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VocabStore::new(dir.path()).load().is_err());
    }
}
