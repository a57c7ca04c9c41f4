// ============================================================
// Layer 4 — Sequence Encoder
// ============================================================
// Turns captions into the integer and one-hot arrays the model
// consumes.
//
//   encode   "startseq a cat endseq"  →  [2, 3, 4, 5]
//   pad      [2, 3], 5                →  [2, 3, 0, 0, 0]
//   one_hot  4, 6                     →  [0, 0, 0, 0, 1, 0]
//   windows  [2, 3, 4, 5]             →  ([2], 3), ([2, 3], 4), ([2, 3, 4], 5)
//
// Padding is always on the right (post-padding). A sequence
// longer than the target length loses its tail, so padding and
// truncation act on the same side and the prefix a model sees
// always starts at the start marker.

use crate::data::vocabulary::{Vocabulary, PAD_INDEX};
use crate::domain::error::{PipelineError, PipelineResult};

/// Right-pad with 0 (or right-truncate) to exactly `max_length`.
pub fn pad(sequence: &[usize], max_length: usize) -> Vec<i32> {
    let mut out: Vec<i32> = sequence
        .iter()
        .take(max_length)
        .map(|&idx| idx as i32)
        .collect();
    out.resize(max_length, PAD_INDEX as i32);
    out
}

/// Vector of `vocab_size` zeros with a single 1.0 at `index`.
pub fn one_hot(index: usize, vocab_size: usize) -> PipelineResult<Vec<f32>> {
    if index >= vocab_size {
        return Err(PipelineError::IndexOutOfRange { index, len: vocab_size });
    }
    let mut out = vec![0.0f32; vocab_size];
    out[index] = 1.0;
    Ok(out)
}

/// Every (prefix, next-token) pair of a sequence, shortest first.
pub fn windows(sequence: &[usize]) -> impl Iterator<Item = (&[usize], usize)> + '_ {
    (1..sequence.len()).map(move |i| (&sequence[..i], sequence[i]))
}

/// Caption ⇄ index conversion bound to one vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct SequenceEncoder<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> SequenceEncoder<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    pub fn vocabulary(&self) -> &'a Vocabulary {
        self.vocab
    }

    /// Whitespace split + lookup; unseen tokens become the OOV index
    pub fn encode(&self, caption: &str) -> Vec<usize> {
        caption
            .split_whitespace()
            .map(|tok| self.vocab.index_of(tok))
            .collect()
    }

    /// Encode and pad to the vocabulary's max_length
    pub fn encode_padded(&self, caption: &str) -> Vec<i32> {
        pad(&self.encode(caption), self.vocab.max_length())
    }

    /// One-hot over this vocabulary
    pub fn one_hot(&self, index: usize) -> PipelineResult<Vec<f32>> {
        one_hot(index, self.vocab.vocab_size())
    }

    /// Indices back to text, skipping padding and unknown indices
    pub fn decode(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .filter(|&&idx| idx != PAD_INDEX)
            .filter_map(|&idx| self.vocab.token_of(idx))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocabulary::OOV_INDEX;
    use rstest::rstest;

    fn vocab() -> Vocabulary {
        Vocabulary::build(&["startseq a cat sat endseq"])
    }

    #[test]
    fn test_encode_uses_vocabulary_indices() {
        let v   = vocab();
        let enc = SequenceEncoder::new(&v);
        assert_eq!(enc.encode("startseq a cat sat endseq"), vec![2, 3, 4, 5, 6]);
        assert_eq!(enc.encode("startseq a dog endseq"), vec![2, 3, OOV_INDEX, 6]);
        assert!(enc.encode("   ").is_empty());
    }

    #[rstest]
    #[case(&[2, 3], 5, vec![2, 3, 0, 0, 0])]
    #[case(&[2, 3, 4], 3, vec![2, 3, 4])]
    #[case(&[2, 3, 4, 5], 2, vec![2, 3])]
    #[case(&[], 1, vec![0])]
    fn test_pad(#[case] seq: &[usize], #[case] len: usize, #[case] expected: Vec<i32>) {
        let out = pad(seq, len);
        assert_eq!(out.len(), len);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_pad_tail_is_zero_for_every_length() {
        let v   = vocab();
        let enc = SequenceEncoder::new(&v);
        let seq = enc.encode("startseq a cat endseq");
        for len in 1..10 {
            let padded = pad(&seq, len);
            assert_eq!(padded.len(), len);
            assert!(padded.iter().skip(seq.len()).all(|&x| x == 0));
        }
    }

    #[rstest]
    #[case(0, 1)]
    #[case(3, 7)]
    #[case(6, 7)]
    fn test_one_hot_sums_to_one(#[case] index: usize, #[case] size: usize) {
        let v = one_hot(index, size).unwrap();
        assert_eq!(v.len(), size);
        assert_eq!(v.iter().sum::<f32>(), 1.0);
        assert_eq!(v[index], 1.0);
    }

    #[test]
    fn test_one_hot_out_of_range() {
        assert!(matches!(
            one_hot(7, 7),
            Err(PipelineError::IndexOutOfRange { index: 7, len: 7 })
        ));
    }

    #[test]
    fn test_windows_cover_every_split() {
        let seq = [2, 3, 4, 5];
        let pairs: Vec<(Vec<usize>, usize)> =
            windows(&seq).map(|(p, t)| (p.to_vec(), t)).collect();
        assert_eq!(
            pairs,
            vec![(vec![2], 3), (vec![2, 3], 4), (vec![2, 3, 4], 5)]
        );
        assert_eq!(windows(&[2]).count(), 0);
    }

    #[test]
    fn test_decode_skips_padding() {
        let v   = vocab();
        let enc = SequenceEncoder::new(&v);
        assert_eq!(enc.decode(&[2, 3, 4, 0, 0]), "startseq a cat");
    }
}
