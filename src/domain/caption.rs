// ============================================================
// Layer 3 — Caption Corpus
// ============================================================
// The parsed caption file: every image identifier mapped to the
// captions written for it.
//
// Iteration order matters. Image ids keep the order in which
// they were first seen in the source file, and each image's
// captions keep file order, so the flat caption list (and with
// it the vocabulary's frequency tie-breaking) is reproducible.
//
// The corpus is built once by a CaptionSource and then only
// read. Vocabulary construction and the batch generator both
// borrow it.

use std::collections::HashMap;

/// Marker prepended to every caption
pub const START_TOKEN: &str = "startseq";

/// Marker appended to every caption
pub const END_TOKEN: &str = "endseq";

/// Ordered mapping from image id to its normalised captions.
#[derive(Debug, Clone, Default)]
pub struct CaptionCorpus {
    /// (image_id, captions) in first-seen order
    entries: Vec<(String, Vec<String>)>,

    /// image_id → position in `entries`
    index: HashMap<String, usize>,
}

impl CaptionCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a caption to an image's list, creating the entry
    /// on first sight. No de-duplication is performed.
    pub fn push(&mut self, image_id: impl Into<String>, caption: impl Into<String>) {
        let image_id = image_id.into();
        let caption  = caption.into();

        match self.index.get(&image_id) {
            Some(&pos) => self.entries[pos].1.push(caption),
            None => {
                self.index.insert(image_id.clone(), self.entries.len());
                self.entries.push((image_id, vec![caption]));
            }
        }
    }

    /// Captions recorded for one image, if any
    pub fn captions(&self, image_id: &str) -> Option<&[String]> {
        self.index
            .get(image_id)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.index.contains_key(image_id)
    }

    /// Image ids in first-seen order
    pub fn image_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// (image_id, captions) pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(id, caps)| (id.as_str(), caps.as_slice()))
    }

    /// Entry at a position in first-seen order.
    /// Used by the generator to draw images uniformly by index.
    pub fn get(&self, pos: usize) -> Option<(&str, &[String])> {
        self.entries
            .get(pos)
            .map(|(id, caps)| (id.as_str(), caps.as_slice()))
    }

    /// Number of distinct images
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of captions across all images
    pub fn caption_count(&self) -> usize {
        self.entries.iter().map(|(_, caps)| caps.len()).sum()
    }

    /// Flatten into one caption list, image by image.
    /// This is the input to vocabulary construction.
    pub fn to_caption_list(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(_, caps)| caps.iter().cloned())
            .collect()
    }

    /// Build a sub-corpus containing only the given image ids,
    /// in the order they are supplied. Unknown ids are ignored.
    pub fn subset<'a, I>(&self, image_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Self::new();
        for id in image_ids {
            if let Some(caps) = self.captions(id) {
                for cap in caps {
                    out.push(id, cap.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_accumulates_in_order() {
        let mut corpus = CaptionCorpus::new();
        corpus.push("b", "startseq one endseq");
        corpus.push("a", "startseq two endseq");
        corpus.push("b", "startseq three endseq");

        let ids: Vec<&str> = corpus.image_ids().collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(
            corpus.captions("b").unwrap(),
            &["startseq one endseq".to_string(), "startseq three endseq".to_string()]
        );
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.caption_count(), 3);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut corpus = CaptionCorpus::new();
        corpus.push("a", "startseq dog endseq");
        corpus.push("a", "startseq dog endseq");
        assert_eq!(corpus.captions("a").unwrap().len(), 2);
    }

    #[test]
    fn test_to_caption_list_flattens_image_by_image() {
        let mut corpus = CaptionCorpus::new();
        corpus.push("x", "c1");
        corpus.push("y", "c2");
        corpus.push("x", "c3");
        assert_eq!(corpus.to_caption_list(), vec!["c1", "c3", "c2"]);
    }

    #[test]
    fn test_subset_keeps_requested_images() {
        let mut corpus = CaptionCorpus::new();
        corpus.push("x", "c1");
        corpus.push("y", "c2");
        corpus.push("z", "c3");

        let sub = corpus.subset(["z", "x", "missing"]);
        let ids: Vec<&str> = sub.image_ids().collect();
        assert_eq!(ids, vec!["z", "x"]);
        assert!(!sub.contains("y"));
    }
}
