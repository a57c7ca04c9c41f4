// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles and splits data into two sets:
//   - Training set:   streamed through the batch generator
//   - Validation set: enumerated by the window dataset
//
// The corpus is split by IMAGE, not by caption. All captions of
// an image land on the same side, so the validation images are
// pictures the model has never been trained on.
//
// Why split by image?
//   Flickr-style corpora carry about five captions per picture.
//   Splitting captions would put the same picture on both sides,
//   and validation would score captions for images the model
//   has already been trained on.
//
// Why an injected RNG?
//   `prepare` and `sample` each re-split the corpus. They must
//   land on the same training side, because the stored vocabulary
//   is checked against a fresh build from it. A StdRng seeded
//   from the config makes that split identical on every run.
//
// Split ratio: 90% training, 10% validation by default
// (`--train-fraction`).
//
// Reference: rand crate documentation (SliceRandom)

use rand::{seq::SliceRandom, Rng};

use crate::domain::caption::CaptionCorpus;

/// Shuffle `samples` and split into (train, validation).
///
/// # Arguments
/// * `samples`        - Everything to split (consumed)
/// * `train_fraction` - Share for training, clamped to [0, 1]
/// * `rng`            - Source of the shuffle; seed it for a repeatable split
///
/// # Returns
/// A tuple (train, validation). The training side gets
/// `round(len * train_fraction)` items.
pub fn split_train_val<T, R: Rng>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    rng:            &mut R,
) -> (Vec<T>, Vec<T>) {
    // Fisher-Yates: every permutation equally likely
    samples.shuffle(rng);

    let total    = samples.len();
    let fraction = train_fraction.clamp(0.0, 1.0);
    let split_at = ((total as f64) * fraction).round() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}

/// Split a caption corpus by image id.
///
/// Every caption of an image follows the image, so
/// `train.caption_count() + val.caption_count()` equals the
/// corpus' caption count and no image id appears on both sides.
pub fn split_corpus<R: Rng>(
    corpus:         &CaptionCorpus,
    train_fraction: f64,
    rng:            &mut R,
) -> (CaptionCorpus, CaptionCorpus) {
    let ids: Vec<&str> = corpus.image_ids().collect();
    let (train_ids, val_ids) = split_train_val(ids, train_fraction, rng);
    (corpus.subset(train_ids), corpus.subset(val_ids))
}
