// ============================================================
// Layer 4 — Caption Loaders
// ============================================================
// Parses a caption file into a CaptionCorpus.
//
// Two on-disk layouts are supported, as in the Flickr8k
// distributions:
//
//   captions.csv (header-based, parsed with the csv crate)
//     image,caption
//     1000268201_693b08cb0e.jpg,A child in a pink dress .
//
//   captions.txt (raw lines, first comma splits the fields)
//     Image,Caption                         ← header, skipped
//     1000268201_693b08cb0e.jpg,A child ...
//
// In both cases the image id is the file name up to the first
// '.', and the caption goes through Preprocessor::normalize_caption.
//
// A file without an image or caption column, a row with fewer
// fields than the header, or an empty image id is reported as
// MalformedRecord with its line number. An empty caption VALUE is
// fine: it normalises to "startseq endseq" in both layouts.
//
// Reference: csv crate documentation (ReaderBuilder, StringRecord)
//            Rust Book §9 (Error Handling)

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use serde::Deserialize;

use crate::data::preprocessor::Preprocessor;
use crate::domain::caption::CaptionCorpus;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::CaptionSource;

/// Column names the header-based layout must carry
pub const IMAGE_COLUMN: &str = "image";
pub const CAPTION_COLUMN: &str = "caption";

/// One row of the header-based caption file.
///
/// Column presence is checked once against the header, so an
/// empty field here is a real empty value, never a missing column.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionRecord {
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub caption: String,
}

/// Image id = file name up to the first '.'
///
/// # Returns
/// `None` when the stem is empty (e.g. `".jpg"` or `""`), which
/// both loaders report as a MalformedRecord.
pub fn image_id_from_filename(filename: &str) -> Option<&str> {
    filename
        .split('.')
        .next()
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
}

fn ensure_exists(path: &Path) -> PipelineResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::NotFound { path: path.to_path_buf() })
    }
}

// ─── CsvCaptionLoader ─────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct CsvCaptionLoader {
    delimiter: u8,
}

impl CsvCaptionLoader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Use a different field delimiter (e.g. b'\t' or b'|')
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvCaptionLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionSource for CsvCaptionLoader {
    fn load(&self, path: &Path) -> PipelineResult<CaptionCorpus> {
        ensure_exists(path)?;

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = rdr.headers()?.clone();
        for column in [IMAGE_COLUMN, CAPTION_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(PipelineError::MalformedRecord {
                    path:   path.to_path_buf(),
                    line:   1,
                    reason: format!("header has no '{column}' column"),
                });
            }
        }

        let preprocessor = Preprocessor::new();
        let mut corpus   = CaptionCorpus::new();

        for result in rdr.records() {
            let record = result?;
            let line   = record.position().map(|p| p.line()).unwrap_or(0);

            let malformed = |reason: &str| PipelineError::MalformedRecord {
                path:   path.to_path_buf(),
                line,
                reason: reason.to_string(),
            };

            // Flexible rows may stop short of the header
            if record.len() < headers.len() {
                let missing = headers.get(record.len()).unwrap_or_default();
                return Err(malformed(&format!("missing '{missing}' field")));
            }

            let row: CaptionRecord = record
                .deserialize(Some(&headers))
                .map_err(|e| malformed(&e.to_string()))?;

            let image_id = image_id_from_filename(&row.image)
                .ok_or_else(|| malformed("empty image id"))?;

            corpus.push(image_id, preprocessor.normalize_caption(&row.caption));
        }

        tracing::info!(
            "Loaded {} captions for {} images from '{}'",
            corpus.caption_count(),
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }
}

// ─── TextCaptionLoader ────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct TextCaptionLoader;

impl TextCaptionLoader {
    pub fn new() -> Self {
        Self
    }
}

impl CaptionSource for TextCaptionLoader {
    fn load(&self, path: &Path) -> PipelineResult<CaptionCorpus> {
        ensure_exists(path)?;

        let reader       = BufReader::new(File::open(path)?);
        let preprocessor = Preprocessor::new();
        let mut corpus   = CaptionCorpus::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line.to_lowercase().starts_with("image") {
                tracing::debug!("Skipping header line: {}", line);
                continue;
            }

            let malformed = |reason: &str| PipelineError::MalformedRecord {
                path:   path.to_path_buf(),
                line:   idx as u64 + 1,
                reason: reason.to_string(),
            };

            let (image, caption) = line
                .split_once(',')
                .ok_or_else(|| malformed("expected 'image_file,caption'"))?;
            let image_id = image_id_from_filename(image)
                .ok_or_else(|| malformed("empty image id"))?;

            corpus.push(image_id, preprocessor.normalize_caption(caption));
        }

        tracing::info!(
            "Loaded {} captions for {} images from '{}'",
            corpus.caption_count(),
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }
}

/// Pick a loader from the file extension: `.csv` is header-based,
/// anything else is read as raw lines.
pub fn load_corpus(path: &Path) -> PipelineResult<CaptionCorpus> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        CsvCaptionLoader::new().load(path)
    } else {
        TextCaptionLoader::new().load(path)
    }
}
