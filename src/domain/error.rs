// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// One error type for every fallible operation below the
// application layer. The application and CLI layers wrap it in
// anyhow with extra context; library callers can match on it.
//
// Transient per-example problems (an image without features,
// a caption too short to split) never surface here. The batch
// generator absorbs them by resampling and only reports
// DataExhausted once its retry bound is spent.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A caption file, text file or feature table does not exist
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A caption record is missing a required field
    #[error("malformed record at {}:{line}: {reason}", path.display())]
    MalformedRecord {
        path:   PathBuf,
        line:   u64,
        reason: String,
    },

    /// The generator rejected too many consecutive draws
    #[error("no usable training example after {attempts} consecutive draws")]
    DataExhausted { attempts: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Feature vectors in one table must all share a width
    #[error("feature vector for '{image_id}' has width {actual}, expected {expected}")]
    FeatureWidth {
        image_id: String,
        expected: usize,
        actual:   usize,
    },

    /// The predictor returned no probabilities
    #[error("predictor returned an empty distribution")]
    EmptyDistribution,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
