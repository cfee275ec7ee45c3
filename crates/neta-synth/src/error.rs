//! Synthesis error types.

use thiserror::Error;

use crate::generator::GenerationError;

/// Reasons category synthesis falls back to the built-in catalog.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("No JSON object in reply")]
    NoJsonObject,

    #[error("Failed to parse categories: {0}")]
    Parse(String),

    #[error("Reply contained no usable categories")]
    EmptyCatalog,

    #[error("No text generator configured")]
    NoGenerator,
}
