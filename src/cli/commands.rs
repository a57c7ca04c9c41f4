// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::prepare_use_case::PipelineConfig;
use crate::data::generator::DEFAULT_MAX_RETRIES;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load captions, split images and build the vocabulary
    Prepare(PrepareArgs),

    /// Stream training batches using prepared artifacts
    Sample(SampleArgs),

    /// Reduce a text file to its content lemmas
    Clean(CleanArgs),
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Caption file (`.csv` with an image,caption header, or
    /// one `image,caption` pair per line)
    #[arg(long, default_value = "data/Flickr8k_Dataset/captions.txt")]
    pub captions: String,

    /// Where the vocabulary, config and metrics are written
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Share of images used for training
    #[arg(long, default_value_t = 0.9)]
    pub train_fraction: f64,

    /// Seed for the split and the batch stream
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Draws allowed per example before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// Rebuild the vocabulary even if one is stored
    #[arg(long)]
    pub rebuild: bool,
}

/// The application layer never sees clap types.
impl From<PrepareArgs> for PipelineConfig {
    fn from(a: PrepareArgs) -> Self {
        PipelineConfig {
            captions_path:  a.captions,
            artifact_dir:   a.artifact_dir,
            train_fraction: a.train_fraction,
            seed:           a.seed,
            batch_size:     a.batch_size,
            max_retries:    a.max_retries,
        }
    }
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// JSON map of image id → feature vector
    #[arg(long, default_value = "features.json")]
    pub features: String,

    /// Number of batches to pull
    #[arg(long, default_value_t = 10)]
    pub batches: usize,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Text file to clean
    #[arg(long)]
    pub input: PathBuf,

    /// Write here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_prepare_args_become_config() {
        let cli = Cli::try_parse_from([
            "caption-pipeline", "prepare", "--captions", "caps.csv", "--seed", "7", "--rebuild",
        ])
        .unwrap();

        let Commands::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };
        assert!(args.rebuild);

        let cfg: PipelineConfig = args.into();
        assert_eq!(cfg.captions_path, "caps.csv");
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_clean_requires_input() {
        assert!(Cli::try_parse_from(["caption-pipeline", "clean"]).is_err());
    }
}
