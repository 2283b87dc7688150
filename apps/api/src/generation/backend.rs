//! The generative backend seam: the two upstream capabilities the generator needs.
//!
//! Production: `GeminiClient`. Tests: a scripted in-memory backend.
//! `AppState` holds an `Arc<dyn GenerativeBackend>`, chosen at startup.

use async_trait::async_trait;
use serde_json::Value;

use crate::gemini_client::GeminiError;
use crate::generation::models::ImagePayload;

/// One input part of a structured-text request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage { mime_type: String, base64: String },
}

/// Text generation constrained to a JSON schema.
#[derive(Debug, Clone)]
pub struct StructuredTextRequest {
    pub system_instruction: String,
    pub parts: Vec<ContentPart>,
    pub response_schema: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// 3:4
    Portrait,
    /// 1:1
    Square,
    /// 16:9
    Landscape,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "3:4",
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
        }
    }
}

/// A batch of images generated from one prompt in a single call.
#[derive(Debug, Clone)]
pub struct ImageBatchRequest {
    pub prompt: String,
    pub count: usize,
    pub aspect_ratio: AspectRatio,
}

/// Implement this to swap the upstream provider without touching the
/// orchestrator, handlers, or requesters.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Returns the model's JSON output. Schema conformance is the caller's check.
    async fn generate_structured(&self, request: &StructuredTextRequest) -> Result<Value, GeminiError>;

    /// Returns the generated images in upstream order. May return fewer than requested.
    async fn generate_images(&self, request: &ImageBatchRequest) -> Result<Vec<ImagePayload>, GeminiError>;
}
