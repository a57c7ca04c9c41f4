// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with `clap` and hands each command to
// its Layer 2 use case.
//
// Three commands are supported:
//   1. `prepare` — load captions, split, build the vocabulary
//   2. `sample`  — stream training batches from the artifacts
//   3. `clean`   — strip a text file down to content lemmas

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CleanArgs, Commands, PrepareArgs, SampleArgs};

#[derive(Parser, Debug)]
#[command(
    name = "caption-pipeline",
    version,
    about = "Prepare image-caption data and stream (image, prefix) → next-word batches."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => run_prepare(args),
            Commands::Sample(args)  => run_sample(args),
            Commands::Clean(args)   => run_clean(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    let rebuild = args.rebuild;
    let stats   = PrepareUseCase::new(args.into(), rebuild).execute()?;

    println!(
        "Vocabulary: {} words, max caption length {} ({} captions over {} images)",
        stats.vocab_size, stats.max_length, stats.caption_count, stats.image_count
    );
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    use crate::application::sample_use_case::SampleUseCase;

    let report = SampleUseCase::new(args.artifact_dir, args.features, args.batches).execute()?;

    println!(
        "Streamed {} batches: features {:?}, sequences {:?}, targets {:?}",
        report.batches, report.feature_shape, report.sequence_shape, report.target_shape
    );
    println!(
        "Validation: {} examples in {} batches",
        report.validation_examples, report.validation_batches
    );
    Ok(())
}

fn run_clean(args: CleanArgs) -> Result<()> {
    use crate::application::clean_use_case::CleanUseCase;

    let to_stdout = args.output.is_none();
    let cleaned   = CleanUseCase::new(args.input, args.output).execute()?;
    if to_stdout {
        println!("{cleaned}");
    }
    Ok(())
}
