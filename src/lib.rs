//! Image-caption data pipeline: caption loading and cleaning, a
//! frequency-ranked vocabulary, (image, prefix) → next-word batch
//! streaming, and greedy caption decoding.

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
