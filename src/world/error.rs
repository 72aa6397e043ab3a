//! Error types for world generation.

use thiserror::Error;

use super::StageKind;

/// Errors surfaced by grid construction and the generator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenError {
    /// A grid needs at least one row and one column.
    #[error("Invalid grid dimensions {width}x{height}: both must be non-zero")]
    InvalidDimensions { width: usize, height: usize },

    /// `run_to_completion` gave up before the pipeline finished.
    #[error("Generation did not complete after {iterations} steps (stuck in {stage:?})")]
    IterationLimit {
        iterations: usize,
        stage: Option<StageKind>,
    },
}
