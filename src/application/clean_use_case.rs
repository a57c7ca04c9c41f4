// ============================================================
// Layer 2 — CleanUseCase
// ============================================================
// Reduces a free-text file to its content lemmas: stop words,
// punctuation and numbers are dropped. The result goes to
// `output` when given, otherwise it is returned to the CLI
// for printing.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::data::preprocessor::{Preprocessor, StopWordLemmatizer};

pub struct CleanUseCase {
    input:  PathBuf,
    output: Option<PathBuf>,
}

impl CleanUseCase {
    pub fn new(input: impl Into<PathBuf>, output: Option<PathBuf>) -> Self {
        Self { input: input.into(), output }
    }

    pub fn execute(&self) -> Result<String> {
        let cleaned = Preprocessor::new()
            .clean_text(&self.input, &StopWordLemmatizer::new())
            .with_context(|| format!("Cannot clean '{}'", self.input.display()))?;

        if let Some(out) = &self.output {
            fs::write(out, &cleaned)
                .with_context(|| format!("Cannot write '{}'", out.display()))?;
            tracing::info!("Wrote cleaned text to '{}'", out.display());
        }

        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_writes_output() {
        let dir   = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        let out   = dir.path().join("clean.txt");
        fs::write(&input, "The dog is running in the park, 3 times!").unwrap();

        let cleaned = CleanUseCase::new(&input, Some(out.clone())).execute().unwrap();
        assert_eq!(cleaned, "dog running park times");
        assert_eq!(fs::read_to_string(out).unwrap(), cleaned);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CleanUseCase::new(dir.path().join("nope.txt"), None).execute().is_err());
    }
}
