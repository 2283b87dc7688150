use thiserror::Error;

use crate::gemini_client::GeminiError;
use crate::generation::models::Platform;

/// Raised before any upstream call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide a prompt and select at least one platform.")]
    EmptyPrompt,

    #[error("Please provide a prompt and select at least one platform.")]
    NoPlatforms,

    #[error("A carousel needs between 2 and 4 slides, got {0}.")]
    InvalidSlideCount(i64),

    #[error("Context image rejected: {0}")]
    InvalidContextImage(String),
}

#[derive(Debug, Error)]
#[error("Failed to generate caption for {platform}. Please check your API key and prompt.")]
pub struct CaptionGenerationError {
    pub platform: Platform,
    #[source]
    pub source: GeminiError,
}

#[derive(Debug, Error)]
#[error("Failed to generate images for {platform}.")]
pub struct ImageGenerationError {
    pub platform: Platform,
    #[source]
    pub source: GeminiError,
}

/// Any failure while producing one platform's post.
/// Display is the user-facing message; the upstream cause is reachable via `source()`.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Caption(#[from] CaptionGenerationError),

    #[error(transparent)]
    Image(#[from] ImageGenerationError),
}
