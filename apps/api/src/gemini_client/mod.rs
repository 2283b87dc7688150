/// Gemini client: the single point of entry for all generative API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini REST API directly.
/// Generation code talks to the `GenerativeBackend` trait, which this client implements.
///
/// Models are hardcoded to prevent drift between caption and image behavior.
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::generation::backend::{
    ContentPart, GenerativeBackend, ImageBatchRequest, StructuredTextRequest,
};
use crate::generation::models::ImagePayload;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used for caption/hashtag generation.
pub const TEXT_MODEL: &str = "gemini-2.5-flash";
/// Model used for image generation.
pub const IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gemini returned empty content")]
    EmptyContent,

    #[error("Expected {expected} images, got {actual}")]
    ImageCount { expected: usize, actual: usize },

    #[error("Image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format: generateContent
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: WireContent<'a>,
    contents: Vec<WireContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format: predict (Imagen)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: usize,
    aspect_ratio: &'a str,
    output_mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Gemini `generateContent` and Imagen `predict` endpoints.
/// One attempt per call; callers decide what a failure means.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, GeminiError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    /// Posts a JSON body and returns the raw response text, mapping non-2xx
    /// statuses to `GeminiError::Api` with the upstream message when present.
    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String, GeminiError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GoogleError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_structured(&self, request: &StructuredTextRequest) -> Result<Value, GeminiError> {
        let body = build_generate_content_body(request);
        let raw = self.post(&self.endpoint(TEXT_MODEL, "generateContent"), &body).await?;
        let response: GenerateContentResponse = serde_json::from_str(&raw)?;

        let text = response.text().ok_or(GeminiError::EmptyContent)?;
        debug!("generateContent returned {} chars", text.len());

        serde_json::from_str(strip_json_fences(&text)).map_err(GeminiError::Parse)
    }

    async fn generate_images(&self, request: &ImageBatchRequest) -> Result<Vec<ImagePayload>, GeminiError> {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: &request.prompt,
            }],
            parameters: PredictParameters {
                sample_count: request.count,
                aspect_ratio: request.aspect_ratio.as_str(),
                output_mime_type: IMAGE_MIME_TYPE,
            },
        };
        let raw = self.post(&self.endpoint(IMAGE_MODEL, "predict"), &body).await?;
        let response: PredictResponse = serde_json::from_str(&raw)?;

        debug!(
            "predict returned {} predictions for {} requested",
            response.predictions.len(),
            request.count
        );
        decode_predictions(response.predictions)
    }
}

fn build_generate_content_body(request: &StructuredTextRequest) -> GenerateContentRequest<'_> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => WirePart::Text {
                text: text.as_str(),
            },
            ContentPart::InlineImage { mime_type, base64 } => WirePart::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.as_str(),
                    data: base64.as_str(),
                },
            },
        })
        .collect();

    GenerateContentRequest {
        system_instruction: WireContent {
            role: None,
            parts: vec![WirePart::Text {
                text: &request.system_instruction,
            }],
        },
        contents: vec![WireContent {
            role: Some("user"),
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

/// Decodes base64 predictions. Predictions without bytes (filtered by the
/// upstream safety layer) are skipped, so the result may be shorter than requested.
fn decode_predictions(predictions: Vec<Prediction>) -> Result<Vec<ImagePayload>, GeminiError> {
    predictions
        .into_iter()
        .filter_map(|p| {
            p.bytes_base64_encoded
                .map(|data| (data, p.mime_type.unwrap_or_else(|| IMAGE_MIME_TYPE.to_string())))
        })
        .map(|(data, mime_type)| -> Result<ImagePayload, GeminiError> {
            Ok(ImagePayload {
                mime_type,
                data: Bytes::from(STANDARD.decode(data)?),
            })
        })
        .collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
