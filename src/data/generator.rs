// ============================================================
// Layer 4 — Batch Generator
// ============================================================
// Streams training batches straight from the caption corpus,
// without materialising every (prefix, next-token) window first.
//
// One example is drawn like this:
//
//   a. pick an image id uniformly from the corpus
//   b. no feature vector for it?       → reject, draw again
//   c. pick one of its captions uniformly
//   d. encode the caption
//   e. fewer than 2 tokens?            → reject, draw again
//   f. pick a split point i uniformly in [1, len - 1]
//   g. input  = seq[..i] padded to max_length
//      target = one_hot(seq[i])
//   h. attach the image's (1-D) feature vector
//
// batch_size examples are stacked into one Batch per pull.
//
// The stream never ends on its own: the training loop stops
// when it stops pulling. Rejections are the only retry path and
// they are bounded: after `max_retries` consecutive rejected
// draws the generator yields DataExhausted instead of spinning.
// Construction also fails fast if no image could ever produce
// an example.
//
// The RNG is injected, so a seeded StdRng gives a reproducible
// stream in tests.
//
// Reference: Rust Book §13 (Iterators)
//            rand crate documentation (Rng, SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::encoder::{pad, SequenceEncoder};
use crate::data::vocabulary::Vocabulary;
use crate::domain::caption::CaptionCorpus;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::example::{Batch, TrainingExample};
use crate::domain::features::FeatureTable;

/// Default bound on consecutive rejected draws
pub const DEFAULT_MAX_RETRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Examples per batch
    pub batch_size: usize,

    /// Consecutive rejected draws tolerated before DataExhausted
    pub max_retries: usize,
}

impl GeneratorConfig {
    /// Config with the default retry bound
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size, max_retries: DEFAULT_MAX_RETRIES }
    }

    /// Override the retry bound. A small bound makes a sparse
    /// feature table fail quickly instead of resampling for long.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(64)
    }
}

// ─── Sampler ──────────────────────────────────────────────────────────────────
// Steps a–e, shared by the batch generator and the example stream.

/// A caption that passed steps a–e
struct Draw<'a> {
    image_id: &'a str,
    feature:  &'a [f32],
    sequence: Vec<usize>,
}

struct Sampler<'a, R> {
    corpus:      &'a CaptionCorpus,
    features:    &'a FeatureTable,
    encoder:     SequenceEncoder<'a>,
    rng:         R,
    max_retries: usize,
}

impl<'a, R: Rng> Sampler<'a, R> {
    fn new(
        corpus:      &'a CaptionCorpus,
        vocab:       &'a Vocabulary,
        features:    &'a FeatureTable,
        max_retries: usize,
        rng:         R,
    ) -> PipelineResult<Self> {
        if max_retries == 0 {
            return Err(PipelineError::InvalidConfig("max_retries must be at least 1".into()));
        }
        if vocab.max_length() == 0 {
            return Err(PipelineError::InvalidConfig("vocabulary max_length is 0".into()));
        }

        // Every caption must fit the padding width, or pad() would
        // cut prefixes and break the prefix → next-token pairing
        let encoder = SequenceEncoder::new(vocab);
        if let Some((image_id, len)) = corpus
            .iter()
            .flat_map(|(id, caps)| caps.iter().map(move |c| (id, c)))
            .map(|(id, c)| (id, encoder.encode(c).len()))
            .find(|&(_, len)| len > vocab.max_length())
        {
            return Err(PipelineError::InvalidConfig(format!(
                "caption of '{}' has {} tokens but the vocabulary max_length is {}; \
                 rebuild the vocabulary from this corpus",
                image_id,
                len,
                vocab.max_length()
            )));
        }

        let sampler = Self {
            corpus,
            features,
            encoder,
            rng,
            max_retries,
        };

        if !sampler.has_usable_image() {
            tracing::warn!(
                "None of the {} corpus images has both features and a caption of 2+ tokens",
                corpus.len()
            );
            return Err(PipelineError::DataExhausted { attempts: 0 });
        }
        Ok(sampler)
    }

    /// True if at least one draw can ever be accepted
    fn has_usable_image(&self) -> bool {
        self.corpus.iter().any(|(id, caps)| {
            self.features.contains(id)
                && caps.iter().any(|c| self.encoder.encode(c).len() >= 2)
        })
    }

    fn draw(&mut self) -> PipelineResult<Draw<'a>> {
        let corpus   = self.corpus;
        let features = self.features;

        for _ in 0..self.max_retries {
            let pos = self.rng.gen_range(0..corpus.len());
            let Some((image_id, captions)) = corpus.get(pos) else {
                continue;
            };

            let Some(feature) = features.get(image_id) else {
                tracing::trace!("Skipping '{}': no feature vector", image_id);
                continue;
            };

            let Some(caption) = captions.choose(&mut self.rng) else {
                continue;
            };

            let sequence = self.encoder.encode(caption);
            if sequence.len() < 2 {
                tracing::trace!("Skipping caption of '{}': {} token(s)", image_id, sequence.len());
                continue;
            }

            return Ok(Draw { image_id, feature, sequence });
        }

        Err(PipelineError::DataExhausted { attempts: self.max_retries })
    }

    /// Steps g–h for a chosen split point
    fn example(&self, draw: &Draw<'a>, split: usize) -> PipelineResult<TrainingExample> {
        let target_index = draw.sequence[split];
        Ok(TrainingExample {
            image_id:       draw.image_id.to_string(),
            image_feature:  draw.feature.to_vec(),
            input_sequence: pad(&draw.sequence[..split], self.encoder.vocabulary().max_length()),
            target:         self.encoder.one_hot(target_index)?,
            target_index,
        })
    }
}

// ─── BatchGenerator ───────────────────────────────────────────────────────────
/// Unbounded stream of training batches.
///
/// `next()` always returns `Some`: either a full batch or the
/// error that stopped this pull.
pub struct BatchGenerator<'a, R> {
    sampler:    Sampler<'a, R>,
    batch_size: usize,
    emitted:    usize,
}

impl<'a> BatchGenerator<'a, StdRng> {
    /// Generator with a seeded StdRng, for reproducible streams
    pub fn with_seed(
        corpus:   &'a CaptionCorpus,
        vocab:    &'a Vocabulary,
        features: &'a FeatureTable,
        config:   GeneratorConfig,
        seed:     u64,
    ) -> PipelineResult<Self> {
        Self::new(corpus, vocab, features, config, StdRng::seed_from_u64(seed))
    }
}

impl<'a, R: Rng> BatchGenerator<'a, R> {
    /// Create a generator over borrowed, read-only inputs.
    ///
    /// # Arguments
    /// * `corpus`   - Captions to sample from (usually the training split)
    /// * `vocab`    - Vocabulary built from that same corpus
    /// * `features` - Pre-computed feature vectors by image id
    /// * `config`   - Batch size and retry bound
    /// * `rng`      - Any `Rng`; pass a seeded one for a repeatable stream
    ///
    /// # Errors
    /// * `InvalidConfig` for a zero batch size or retry bound, or a
    ///   caption longer than the vocabulary's max_length
    /// * `DataExhausted { attempts: 0 }` when no image could ever
    ///   yield an example
    pub fn new(
        corpus:   &'a CaptionCorpus,
        vocab:    &'a Vocabulary,
        features: &'a FeatureTable,
        config:   GeneratorConfig,
        rng:      R,
    ) -> PipelineResult<Self> {
        if config.batch_size == 0 {
            return Err(PipelineError::InvalidConfig("batch_size must be at least 1".into()));
        }

        let sampler = Sampler::new(corpus, vocab, features, config.max_retries, rng)?;

        tracing::debug!(
            "Batch generator ready: batch_size={}, max_length={}, vocab_size={}, feature_width={}",
            config.batch_size,
            vocab.max_length(),
            vocab.vocab_size(),
            features.width(),
        );

        Ok(Self { sampler, batch_size: config.batch_size, emitted: 0 })
    }

    /// Draw one training example at a random split point
    pub fn sample_example(&mut self) -> PipelineResult<TrainingExample> {
        let draw  = self.sampler.draw()?;
        let split = self.sampler.rng.gen_range(1..draw.sequence.len());
        self.sampler.example(&draw, split)
    }

    /// Assemble the next batch
    pub fn next_batch(&mut self) -> PipelineResult<Batch> {
        let examples = (0..self.batch_size)
            .map(|_| self.sample_example())
            .collect::<PipelineResult<Vec<_>>>()?;

        let batch = Batch::stack(examples)?;
        self.emitted += 1;
        tracing::trace!("Emitted batch {}", self.emitted);
        Ok(batch)
    }

    /// Batches emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Rows in every emitted batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<R: Rng> Iterator for BatchGenerator<'_, R> {
    type Item = PipelineResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_batch())
    }
}

// ─── ExampleStream ────────────────────────────────────────────────────────────
/// Single-example variant: draws a caption the same way, then
/// yields every (prefix, next-token) window of it in order
/// before drawing the next caption. Also unbounded.
pub struct ExampleStream<'a, R> {
    sampler: Sampler<'a, R>,
    current: Option<(Draw<'a>, usize)>,
}

impl<'a> ExampleStream<'a, StdRng> {
    pub fn with_seed(
        corpus:      &'a CaptionCorpus,
        vocab:       &'a Vocabulary,
        features:    &'a FeatureTable,
        max_retries: usize,
        seed:        u64,
    ) -> PipelineResult<Self> {
        Self::new(corpus, vocab, features, max_retries, StdRng::seed_from_u64(seed))
    }
}

impl<'a, R: Rng> ExampleStream<'a, R> {
    pub fn new(
        corpus:      &'a CaptionCorpus,
        vocab:       &'a Vocabulary,
        features:    &'a FeatureTable,
        max_retries: usize,
        rng:         R,
    ) -> PipelineResult<Self> {
        let sampler = Sampler::new(corpus, vocab, features, max_retries, rng)?;
        Ok(Self { sampler, current: None })
    }

    fn next_example(&mut self) -> PipelineResult<TrainingExample> {
        let (draw, split) = match self.current.take() {
            Some(state) => state,
            None => (self.sampler.draw()?, 1),
        };

        let example = self.sampler.example(&draw, split)?;

        // Split points run 1..len; keep the draw until the last one
        if split + 1 < draw.sequence.len() {
            self.current = Some((draw, split + 1));
        }
        Ok(example)
    }
}

impl<R: Rng> Iterator for ExampleStream<'_, R> {
    type Item = PipelineResult<TrainingExample>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_example())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::DEFAULT_FEATURE_WIDTH;

    fn corpus(entries: &[(&str, &str)]) -> CaptionCorpus {
        let mut c = CaptionCorpus::new();
        for (id, cap) in entries {
            c.push(*id, *cap);
        }
        c
    }

    fn features(ids: &[&str], width: usize) -> FeatureTable {
        ids.iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), vec![i as f32; width]))
            .collect()
    }

    fn is_one_hot(row: &[f32]) -> bool {
        row.iter().filter(|&&x| x == 1.0).count() == 1
            && row.iter().all(|&x| x == 0.0 || x == 1.0)
    }

    #[test]
    fn test_single_caption_examples_are_prefix_and_next_token() {
        let corpus = corpus(&[("img1", "startseq a cat sat endseq")]);
        let vocab  = Vocabulary::from_corpus(&corpus);
        let feats  = features(&["img1"], DEFAULT_FEATURE_WIDTH);
        let seq    = SequenceEncoder::new(&vocab).encode("startseq a cat sat endseq");

        let mut gen =
            BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(8), 7).unwrap();

        for _ in 0..20 {
            let ex = gen.sample_example().unwrap();
            let prefix_len = ex.input_sequence.iter().take_while(|&&x| x != 0).count();

            assert!((1..seq.len()).contains(&prefix_len));
            let prefix: Vec<usize> = ex.input_sequence[..prefix_len]
                .iter()
                .map(|&x| x as usize)
                .collect();
            assert_eq!(prefix, seq[..prefix_len]);
            assert!(ex.input_sequence[prefix_len..].iter().all(|&x| x == 0));
            assert_eq!(ex.target_index, seq[prefix_len]);
            assert!(is_one_hot(&ex.target));
            assert_eq!(ex.target[seq[prefix_len]], 1.0);
        }
    }

    #[test]
    fn test_batch_shapes() {
        let corpus = corpus(&[
            ("img1", "startseq a cat sat endseq"),
            ("img2", "startseq a dog ran far away endseq"),
            ("img2", "startseq dog endseq"),
        ]);
        let vocab = Vocabulary::from_corpus(&corpus);
        let feats = features(&["img1", "img2"], 16);

        let mut gen =
            BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(5), 1).unwrap();
        let batch = gen.next().unwrap().unwrap();

        assert_eq!(batch.feature_shape(),  [5, 16]);
        assert_eq!(batch.sequence_shape(), [5, vocab.max_length()]);
        assert_eq!(batch.target_shape(),   [5, vocab.vocab_size()]);
        for row in 0..batch.len() {
            assert!(is_one_hot(batch.target_row(row)));
        }
        assert_eq!(gen.emitted(), 1);
    }

    #[test]
    fn test_images_without_features_never_appear() {
        let corpus = corpus(&[
            ("kept", "startseq a cat sat endseq"),
            ("dropped", "startseq a dog ran endseq"),
        ]);
        let vocab = Vocabulary::from_corpus(&corpus);
        let feats = features(&["kept"], 4);

        let gen =
            BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(4), 3).unwrap();
        for batch in gen.take(10) {
            let batch = batch.unwrap();
            assert!(batch.image_ids.iter().all(|id| id == "kept"));
        }
    }

    #[test]
    fn test_only_image_missing_features_fails_instead_of_hanging() {
        let corpus = corpus(&[("img1", "startseq a cat sat endseq")]);
        let vocab  = Vocabulary::from_corpus(&corpus);
        let feats  = features(&["other"], 4);

        let err = BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(2), 0)
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::DataExhausted { .. }));
    }

    #[test]
    fn test_caption_longer_than_max_length_is_rejected() {
        let small = corpus(&[("img1", "startseq a cat endseq")]);
        let vocab = Vocabulary::from_corpus(&small);

        let long  = corpus(&[
            ("img1", "startseq a cat endseq"),
            ("img2", "startseq a cat a cat a endseq"),
        ]);
        let feats = features(&["img1", "img2"], 2);

        let err = BatchGenerator::with_seed(&long, &vocab, &feats, GeneratorConfig::new(4), 0)
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::InvalidConfig(ref msg) if msg.contains("img2")));

        assert!(ExampleStream::with_seed(&long, &vocab, &feats, 10, 0).is_err());
    }

    #[test]
    fn test_retry_bound_is_reported() {
        // One usable image among many unusable ones, with a bound of 1:
        // some draw is bound to land on an unusable image.
        let mut entries: Vec<(String, &str)> = (0..50)
            .map(|i| (format!("missing{i}"), "startseq a cat endseq"))
            .collect();
        entries.push(("ok".to_string(), "startseq a cat endseq"));
        let mut corpus = CaptionCorpus::new();
        for (id, cap) in &entries {
            corpus.push(id.as_str(), *cap);
        }
        let vocab = Vocabulary::from_corpus(&corpus);
        let feats = features(&["ok"], 2);

        let config = GeneratorConfig::new(64).with_max_retries(1);
        let mut gen = BatchGenerator::with_seed(&corpus, &vocab, &feats, config, 11).unwrap();
        let err = gen.next_batch().unwrap_err();
        assert!(matches!(err, PipelineError::DataExhausted { attempts: 1 }));
    }

    #[test]
    fn test_short_captions_are_skipped() {
        let mut corpus = corpus(&[("img1", "startseq a cat endseq")]);
        corpus.push("img1", "lonely");
        let vocab = Vocabulary::from_corpus(&corpus);
        let feats = features(&["img1"], 2);

        let mut gen =
            BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(32), 5).unwrap();
        let batch = gen.next_batch().unwrap();
        let lonely = vocab.index_of("lonely") as i32;
        for row in 0..batch.len() {
            assert_ne!(batch.sequence_row(row)[0], lonely);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let corpus = corpus(&[
            ("a", "startseq one two three endseq"),
            ("b", "startseq four five endseq"),
        ]);
        let vocab = Vocabulary::from_corpus(&corpus);
        let feats = features(&["a", "b"], 3);

        let first: Vec<Batch> =
            BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(4), 42)
                .unwrap()
                .take(3)
                .collect::<PipelineResult<_>>()
                .unwrap();
        let second: Vec<Batch> =
            BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(4), 42)
                .unwrap()
                .take(3)
                .collect::<PipelineResult<_>>()
                .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let corpus = corpus(&[("a", "startseq x endseq")]);
        let vocab  = Vocabulary::from_corpus(&corpus);
        let feats  = features(&["a"], 1);
        let err = BatchGenerator::with_seed(&corpus, &vocab, &feats, GeneratorConfig::new(0), 0)
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_example_stream_walks_every_window() {
        let corpus = corpus(&[("img1", "startseq a cat sat endseq")]);
        let vocab  = Vocabulary::from_corpus(&corpus);
        let feats  = features(&["img1"], 2);
        let seq    = SequenceEncoder::new(&vocab).encode("startseq a cat sat endseq");

        let stream = ExampleStream::with_seed(&corpus, &vocab, &feats, 100, 9).unwrap();
        let targets: Vec<usize> = stream
            .take(2 * (seq.len() - 1))
            .map(|ex| ex.unwrap().target_index)
            .collect();

        let one_pass: Vec<usize> = seq[1..].to_vec();
        assert_eq!(targets[..seq.len() - 1], one_pass[..]);
        assert_eq!(targets[seq.len() - 1..], one_pass[..]);
    }
}
