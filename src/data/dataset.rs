use std::sync::Arc;

use burn::data::dataset::Dataset;

use crate::data::encoder::{one_hot, pad, windows, SequenceEncoder};
use crate::data::vocabulary::Vocabulary;
use crate::domain::caption::CaptionCorpus;
use crate::domain::example::TrainingExample;
use crate::domain::features::FeatureTable;

/// One (caption, split point) pair of the corpus
#[derive(Debug, Clone)]
struct Window {
    image_id: Arc<str>,
    sequence: Arc<[usize]>,
    split:    usize,
}

/// Every prefix/target window of every usable caption, in corpus
/// order. Finite and deterministic, so it suits validation where
/// the random generator does not.
///
/// Examples are built on `get`; only index sequences are held.
pub struct CaptionWindowDataset {
    windows:    Vec<Window>,
    features:   Arc<FeatureTable>,
    max_length: usize,
    vocab_size: usize,
}

impl CaptionWindowDataset {
    /// Images without features and captions under two tokens are
    /// left out, exactly as the generator skips them.
    ///
    /// Validation captions may be longer than the training
    /// `max_length`. A window whose prefix would not fit is dropped:
    /// padding would cut it, and the cut input would then stand for
    /// several different targets.
    pub fn from_corpus(
        corpus:   &CaptionCorpus,
        vocab:    &Vocabulary,
        features: Arc<FeatureTable>,
    ) -> Self {
        let encoder    = SequenceEncoder::new(vocab);
        let max_length = vocab.max_length();
        let mut out    = Vec::new();
        let mut too_long = 0usize;

        for (image_id, captions) in corpus.iter() {
            if !features.contains(image_id) {
                continue;
            }
            let image_id: Arc<str> = Arc::from(image_id);

            for caption in captions {
                let sequence: Arc<[usize]> = encoder.encode(caption).into();
                for (prefix, _) in windows(&sequence) {
                    if prefix.len() > max_length {
                        too_long += 1;
                        continue;
                    }
                    out.push(Window {
                        image_id: Arc::clone(&image_id),
                        sequence: Arc::clone(&sequence),
                        split:    prefix.len(),
                    });
                }
            }
        }

        tracing::debug!(
            "Window dataset holds {} examples ({} skipped: prefix longer than max_length {})",
            out.len(),
            too_long,
            max_length
        );

        Self {
            windows: out,
            features,
            max_length,
            vocab_size: vocab.vocab_size(),
        }
    }

    pub fn example_count(&self) -> usize {
        self.windows.len()
    }
}

impl Dataset<TrainingExample> for CaptionWindowDataset {
    fn get(&self, index: usize) -> Option<TrainingExample> {
        let w            = self.windows.get(index)?;
        let target_index = w.sequence[w.split];

        Some(TrainingExample {
            image_id:       w.image_id.to_string(),
            image_feature:  self.features.get(&w.image_id)?.to_vec(),
            input_sequence: pad(&w.sequence[..w.split], self.max_length),
            target:         one_hot(target_index, self.vocab_size).ok()?,
            target_index,
        })
    }

    fn len(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_window_is_enumerated() {
        let mut corpus = CaptionCorpus::new();
        corpus.push("a", "startseq a cat sat endseq"); // 4 windows
        corpus.push("a", "startseq cat endseq");       // 2 windows
        corpus.push("b", "startseq a dog endseq");     // no features
        let vocab = Vocabulary::from_corpus(&corpus);
        let feats: FeatureTable = [("a".to_string(), vec![1.0, 2.0])].into_iter().collect();

        let ds = CaptionWindowDataset::from_corpus(&corpus, &vocab, Arc::new(feats));
        assert_eq!(ds.len(), 6);

        let first = ds.get(0).unwrap();
        assert_eq!(first.input_sequence[0] as usize, vocab.start_index());
        assert!(first.input_sequence[1..].iter().all(|&x| x == 0));
        assert_eq!(first.target_index, vocab.index_of("a"));

        let last = ds.get(5).unwrap();
        assert_eq!(last.target_index, vocab.end_index());
        assert_eq!(last.image_feature, vec![1.0, 2.0]);

        assert!(ds.get(6).is_none());
    }

    #[test]
    fn test_windows_longer_than_training_max_length_are_dropped() {
        let mut train = CaptionCorpus::new();
        train.push("t", "startseq a cat endseq");
        let vocab = Vocabulary::from_corpus(&train);
        assert_eq!(vocab.max_length(), 4);

        // 7 tokens → 6 windows, prefixes of length 1..=6
        let mut val = CaptionCorpus::new();
        val.push("v", "startseq a cat a cat a endseq");
        let feats: FeatureTable = [("v".to_string(), vec![0.5])].into_iter().collect();

        let ds = CaptionWindowDataset::from_corpus(&val, &vocab, Arc::new(feats));
        assert_eq!(ds.len(), 4);

        let seq = SequenceEncoder::new(&vocab).encode("startseq a cat a cat a endseq");
        let mut inputs = Vec::new();
        for i in 0..ds.len() {
            let ex = ds.get(i).unwrap();
            let prefix_len = ex.input_sequence.iter().take_while(|&&x| x != 0).count();
            let prefix: Vec<usize> = ex.input_sequence[..prefix_len].iter().map(|&x| x as usize).collect();

            assert_eq!(prefix, seq[..prefix_len]);
            assert_eq!(ex.target_index, seq[prefix_len]);
            inputs.push(ex.input_sequence);
        }
        inputs.dedup();
        assert_eq!(inputs.len(), 4);
    }
}
