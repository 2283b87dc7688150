//! Caption Requester: one structured-text call per platform (or per carousel slide).

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::gemini_client::GeminiError;
use crate::generation::backend::{ContentPart, GenerativeBackend, StructuredTextRequest};
use crate::generation::error::CaptionGenerationError;
use crate::generation::models::{GenerationRequest, Platform};
use crate::generation::prompts::{
    CAPTION_PROMPT_TEMPLATE, CAPTION_SYSTEM_TEMPLATE, CONTEXT_IMAGE_INSTRUCTION,
    SLIDE_CLAUSE_TEMPLATE,
};

/// Position of a caption within a carousel. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub index: usize,
    pub total: usize,
}

/// Structured caption output. Missing or `null` keys fall back to empty
/// values; wrong types are rejected as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub caption: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hashtags: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn caption_response_schema(platform: Platform) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "caption": {
                "type": "STRING",
                "description": format!("The social media caption for {platform}.")
            },
            "hashtags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "An array of 3-5 relevant hashtags."
            }
        },
        "required": ["caption", "hashtags"]
    })
}

/// Builds the structured-text request. The context image, when present, goes
/// before the text part.
pub fn build_caption_request(
    request: &GenerationRequest,
    platform: Platform,
    slide: Option<Slide>,
) -> StructuredTextRequest {
    let slide_clause = slide
        .map(|s| {
            SLIDE_CLAUSE_TEMPLATE
                .replace("{index}", &s.index.to_string())
                .replace("{total}", &s.total.to_string())
        })
        .unwrap_or_default();

    // user text goes in last so braces inside it are never treated as placeholders
    let mut text = CAPTION_PROMPT_TEMPLATE
        .replace("{post_type}", request.post_type.label())
        .replace("{slide_clause}", &slide_clause)
        .replace("{prompt}", &request.prompt);

    let mut parts = Vec::with_capacity(2);
    if let Some(image) = &request.context_image {
        text.push_str(CONTEXT_IMAGE_INSTRUCTION);
        parts.push(ContentPart::InlineImage {
            mime_type: image.mime_type.clone(),
            base64: image.base64.clone(),
        });
    }
    parts.push(ContentPart::Text(text));

    StructuredTextRequest {
        system_instruction: CAPTION_SYSTEM_TEMPLATE.replace("{platform}", platform.as_str()),
        parts,
        response_schema: caption_response_schema(platform),
    }
}

/// Requests one caption. Not retried.
pub async fn request_caption(
    backend: &dyn GenerativeBackend,
    request: &GenerationRequest,
    platform: Platform,
    slide: Option<Slide>,
) -> Result<CaptionResult, CaptionGenerationError> {
    let text_request = build_caption_request(request, platform, slide);

    let value = backend
        .generate_structured(&text_request)
        .await
        .map_err(|source| CaptionGenerationError { platform, source })?;

    parse_caption(value).map_err(|source| CaptionGenerationError { platform, source })
}

fn parse_caption(value: Value) -> Result<CaptionResult, GeminiError> {
    serde_json::from_value(value).map_err(GeminiError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::models::{ContextImage, PostType};
    use crate::generation::testing::ScriptedBackend;

    fn single_request() -> GenerationRequest {
        GenerationRequest::new("eco sneakers", &[Platform::X], PostType::Single, None, None)
            .unwrap()
    }

    fn text_of(request: &StructuredTextRequest) -> &str {
        request
            .parts
            .iter()
            .find_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_single_prompt_text() {
        let built = build_caption_request(&single_request(), Platform::X, None);
        assert_eq!(
            built.system_instruction,
            "You are a world-class social media content strategist. \
             Your task is to generate a post for X."
        );
        assert_eq!(
            text_of(&built),
            "The core idea for the post is: \"eco sneakers\". The post type is a Single Image. \
             Generate a compelling, platform-appropriate caption and a list of 3-5 relevant hashtags."
        );
        assert_eq!(built.parts.len(), 1);
    }

    #[test]
    fn test_slide_clause() {
        let request = GenerationRequest::new(
            "eco sneakers",
            &[Platform::Instagram],
            PostType::Carousel,
            Some(3),
            None,
        )
        .unwrap();
        let built = build_caption_request(
            &request,
            Platform::Instagram,
            Some(Slide { index: 2, total: 3 }),
        );
        assert!(text_of(&built).contains("The post type is a Carousel for slide 2 of a 3-slide carousel."));
    }

    #[test]
    fn test_context_image_is_sent_first() {
        let mut request = single_request();
        request.context_image = Some(ContextImage {
            base64: "aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
        });

        let built = build_caption_request(&request, Platform::X, None);
        assert_eq!(
            built.parts[0],
            ContentPart::InlineImage {
                mime_type: "image/png".to_string(),
                base64: "aGVsbG8=".to_string(),
            }
        );
        assert!(text_of(&built).ends_with("incorporate its themes into your response."));
    }

    #[test]
    fn test_schema_requires_caption_and_hashtags() {
        let schema = caption_response_schema(Platform::LinkedIn);
        assert_eq!(schema["required"], json!(["caption", "hashtags"]));
        assert_eq!(
            schema["properties"]["caption"]["description"],
            "The social media caption for LinkedIn."
        );
    }

    #[test]
    fn test_parse_defaults_missing_keys() {
        let parsed = parse_caption(json!({"caption": "hello"})).unwrap();
        assert_eq!(parsed.caption, "hello");
        assert!(parsed.hashtags.is_empty());
    }

    #[test]
    fn test_parse_treats_null_as_missing() {
        let parsed = parse_caption(json!({"caption": "hi", "hashtags": null})).unwrap();
        assert_eq!(parsed.caption, "hi");
        assert!(parsed.hashtags.is_empty());

        let parsed = parse_caption(json!({"caption": null, "hashtags": ["#a"]})).unwrap();
        assert_eq!(parsed.caption, "");
        assert_eq!(parsed.hashtags, vec!["#a"]);
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(parse_caption(json!({"caption": 42, "hashtags": []})).is_err());
        assert!(parse_caption(json!("just a string")).is_err());
    }

    #[tokio::test]
    async fn test_malformed_output_is_caption_error() {
        let backend = ScriptedBackend::default().malformed_captions_for(Platform::X);
        let err = request_caption(&backend, &single_request(), Platform::X, None)
            .await
            .unwrap_err();
        assert_eq!(err.platform, Platform::X);
        assert!(matches!(err.source, GeminiError::Parse(_)));
        assert_eq!(
            err.to_string(),
            "Failed to generate caption for X. Please check your API key and prompt."
        );
    }
}
