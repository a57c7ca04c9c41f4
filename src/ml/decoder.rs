// ============================================================
// Layer 5 — Greedy Caption Decoder
// ============================================================
// Generates a caption for one image, one token at a time.
//
//   text = "startseq"
//   repeat up to max_length times:
//       seq   = pad(encode(text), max_length)
//       probs = predictor(feature, seq)
//       word  = vocabulary[argmax(probs)]     ← stop if unmapped
//       text += " " + word
//       stop if word == "endseq"
//
// The result drops the leading "startseq" and a trailing
// "endseq", then joins the remaining words with single spaces.
//
// Strictly greedy: no beam search, no temperature. Given the
// same predictor the output is deterministic. Padding is on the
// right, the same side the training examples were padded on.

use anyhow::Result;

use crate::data::encoder::{pad, SequenceEncoder};
use crate::data::vocabulary::Vocabulary;
use crate::domain::caption::{END_TOKEN, START_TOKEN};
use crate::domain::error::PipelineError;
use crate::domain::traits::CaptionPredictor;

/// Index of the largest probability; the first one wins ties
fn argmax(probs: &[f32]) -> Option<usize> {
    probs
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
            Some((_, bp)) if bp.total_cmp(&p).is_ge() => best,
            _ => Some((i, p)),
        })
        .map(|(i, _)| i)
}

pub struct CaptionDecoder<'a> {
    encoder:    SequenceEncoder<'a>,
    max_length: usize,
}

impl<'a> CaptionDecoder<'a> {
    /// Decoder bounded by the vocabulary's max_length
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self::with_max_length(vocab, vocab.max_length())
    }

    pub fn with_max_length(vocab: &'a Vocabulary, max_length: usize) -> Self {
        Self { encoder: SequenceEncoder::new(vocab), max_length }
    }

    pub fn decode(&self, predictor: &dyn CaptionPredictor, feature: &[f32]) -> Result<String> {
        let vocab = self.encoder.vocabulary();
        let mut words: Vec<String> = vec![START_TOKEN.to_string()];

        for step in 0..self.max_length {
            let sequence = pad(&self.encoder.encode(&words.join(" ")), self.max_length);
            let probs    = predictor.predict(feature, &sequence)?;

            let best = argmax(&probs).ok_or(PipelineError::EmptyDistribution)?;
            let Some(word) = vocab.token_of(best) else {
                tracing::debug!("Index {} has no token, stopping at step {}", best, step);
                break;
            };

            words.push(word.to_string());
            if word == END_TOKEN {
                break;
            }
        }

        if words.last().map(String::as_str) == Some(END_TOKEN) {
            words.pop();
        }

        Ok(words[1..].join(" "))
    }
}

/// Greedy decode with the vocabulary bound to `max_length` steps
pub fn decode(
    predictor:  &dyn CaptionPredictor,
    vocab:      &Vocabulary,
    feature:    &[f32],
    max_length: usize,
) -> Result<String> {
    CaptionDecoder::with_max_length(vocab, max_length).decode(predictor, feature)
}
