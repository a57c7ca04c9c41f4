// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Word-level vocabulary built from the full caption corpus.
//
// Index layout:
//   0        padding (never mapped to a token)
//   1        "<unk>" — every token not seen during build
//   2..      corpus tokens, most frequent first; ties keep the
//            order in which the tokens first appeared
//
// vocab_size counts the padding slot, so it is the width of a
// one-hot target and the size of the model's output layer.
//
// max_length is the token count of the longest caption. It is
// computed once here, over the whole training corpus, and every
// encoded sequence in the system is padded to it. It is a
// fixed tensor dimension the model is built around.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::caption::{CaptionCorpus, END_TOKEN, START_TOKEN};

pub const PAD_INDEX: usize = 0;
pub const OOV_TOKEN: &str = "<unk>";
pub const OOV_INDEX: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// token → index
    word_index: HashMap<String, usize>,

    /// index → token; slot 0 (padding) is None
    index_word: Vec<Option<String>>,

    max_length: usize,
}

/// Summary of a vocabulary and the corpus it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyStats {
    pub vocab_size:    usize,
    pub max_length:    usize,
    pub caption_count: usize,
    pub image_count:   usize,
}

/// Token count of the longest caption (0 for no captions)
pub fn max_length<S: AsRef<str>>(captions: &[S]) -> usize {
    captions
        .iter()
        .map(|c| c.as_ref().split_whitespace().count())
        .max()
        .unwrap_or(0)
}

impl Vocabulary {
    /// Build from every caption of the training corpus.
    ///
    /// # Arguments
    /// * `captions` - Normalised captions ("startseq ... endseq")
    ///
    /// # Returns
    /// A vocabulary whose indices depend only on token counts and
    /// first-seen order, so the same captions always give the same
    /// vocabulary. `VocabStore` relies on that to detect stale files.
    ///
    /// # Example
    /// ```
    /// use caption_pipeline::data::vocabulary::Vocabulary;
    ///
    /// let vocab = Vocabulary::build(&["startseq a cat endseq"]);
    /// assert_eq!(vocab.vocab_size(), 6); // padding + <unk> + 4 tokens
    /// assert_eq!(vocab.max_length(), 4);
    /// ```
    pub fn build<S: AsRef<str>>(captions: &[S]) -> Self {
        // Count frequencies, remembering first-seen order for ties
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for caption in captions {
            for token in caption.as_ref().split_whitespace() {
                let next = counts.len();
                counts.entry(token).or_insert((0, next)).0 += 1;
            }
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(tok, (count, first))| (tok, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let mut word_index = HashMap::with_capacity(ranked.len() + 1);
        let mut index_word = Vec::with_capacity(ranked.len() + 2);

        index_word.push(None);
        word_index.insert(OOV_TOKEN.to_string(), OOV_INDEX);
        index_word.push(Some(OOV_TOKEN.to_string()));

        for (token, _, _) in ranked {
            if token == OOV_TOKEN {
                continue;
            }
            word_index.insert(token.to_string(), index_word.len());
            index_word.push(Some(token.to_string()));
        }

        let vocab = Self {
            word_index,
            index_word,
            max_length: max_length(captions),
        };

        tracing::debug!(
            "Built vocabulary: {} entries, max_length={}",
            vocab.vocab_size(),
            vocab.max_length
        );
        vocab
    }

    /// Build from a corpus' flat caption list
    pub fn from_corpus(corpus: &CaptionCorpus) -> Self {
        Self::build(&corpus.to_caption_list())
    }

    /// Number of indices including the padding slot
    pub fn vocab_size(&self) -> usize {
        self.index_word.len()
    }

    /// Fixed padding length for every encoded sequence
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Index of a token, falling back to the OOV index
    pub fn index_of(&self, token: &str) -> usize {
        self.word_index.get(token).copied().unwrap_or(OOV_INDEX)
    }

    /// Index of a token only if it was seen during build
    pub fn lookup(&self, token: &str) -> Option<usize> {
        self.word_index.get(token).copied()
    }

    /// Token for an index; None for padding or out-of-range indices
    pub fn token_of(&self, index: usize) -> Option<&str> {
        self.index_word.get(index).and_then(|t| t.as_deref())
    }

    /// Index every unseen token maps to
    pub fn oov_index(&self) -> usize {
        OOV_INDEX
    }

    /// Index of the start marker. Every training prefix and every
    /// decoding run begins with it.
    pub fn start_index(&self) -> usize {
        self.index_of(START_TOKEN)
    }

    /// Index of the end marker, the decoder's stop signal
    pub fn end_index(&self) -> usize {
        self.index_of(END_TOKEN)
    }

    /// Summary saved next to the vocabulary by `prepare`.
    ///
    /// # Arguments
    /// * `corpus` - The corpus this vocabulary was built from; only its
    ///   caption and image counts are read
    pub fn stats(&self, corpus: &CaptionCorpus) -> VocabularyStats {
        VocabularyStats {
            vocab_size:    self.vocab_size(),
            max_length:    self.max_length,
            caption_count: corpus.caption_count(),
            image_count:   corpus.len(),
        }
    }
}
