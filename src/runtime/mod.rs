//! Batch runtime: directory extraction and the batch runner.

pub mod extractor;
pub mod runner;

// Re-export key types
pub use extractor::GameExtractor;
pub use runner::{process_dir, process_games};
