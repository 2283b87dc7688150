//! Scripted in-memory `GenerativeBackend` for tests.
//!
//! Platform and slide are recovered from the prompt text the requesters build,
//! so the fake exercises the real prompt construction.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::gemini_client::GeminiError;
use crate::generation::backend::{
    ContentPart, GenerativeBackend, ImageBatchRequest, StructuredTextRequest,
};
use crate::generation::models::{ImagePayload, Platform};

const ALL_PLATFORMS: [Platform; 3] = [Platform::LinkedIn, Platform::Instagram, Platform::X];

#[derive(Default)]
pub struct ScriptedBackend {
    fail_images: Vec<Platform>,
    short_images: Vec<Platform>,
    fail_captions: Vec<Platform>,
    malformed_captions: Vec<Platform>,
    caption_delay: Option<Duration>,
    image_calls: Mutex<Vec<ImageBatchRequest>>,
    caption_calls: Mutex<Vec<StructuredTextRequest>>,
}

impl ScriptedBackend {
    pub fn fail_images_for(mut self, platform: Platform) -> Self {
        self.fail_images.push(platform);
        self
    }

    /// Returns one image fewer than requested.
    pub fn short_images_for(mut self, platform: Platform) -> Self {
        self.short_images.push(platform);
        self
    }

    pub fn fail_captions_for(mut self, platform: Platform) -> Self {
        self.fail_captions.push(platform);
        self
    }

    /// Returns JSON whose `caption` is not a string.
    pub fn malformed_captions_for(mut self, platform: Platform) -> Self {
        self.malformed_captions.push(platform);
        self
    }

    /// Every caption call sleeps this long before answering.
    pub fn with_caption_delay(mut self, delay: Duration) -> Self {
        self.caption_delay = Some(delay);
        self
    }

    pub fn image_calls(&self) -> Vec<ImageBatchRequest> {
        self.image_calls.lock().unwrap().clone()
    }

    pub fn caption_calls(&self) -> Vec<StructuredTextRequest> {
        self.caption_calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.image_calls.lock().unwrap().len() + self.caption_calls.lock().unwrap().len()
    }
}

fn platform_in(text: &str, marker: impl Fn(Platform) -> String) -> Platform {
    ALL_PLATFORMS
        .into_iter()
        .find(|p| text.contains(&marker(*p)))
        .expect("prompt names a platform")
}

fn slide_in(text: &str) -> Option<usize> {
    let rest = text.split(" for slide ").nth(1)?;
    rest.split_whitespace().next()?.parse().ok()
}

fn upstream_failure() -> GeminiError {
    GeminiError::Api {
        status: 500,
        message: "scripted failure".to_string(),
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate_structured(&self, request: &StructuredTextRequest) -> Result<Value, GeminiError> {
        self.caption_calls.lock().unwrap().push(request.clone());

        if let Some(delay) = self.caption_delay {
            tokio::time::sleep(delay).await;
        }

        let platform = platform_in(&request.system_instruction, |p| format!("a post for {p}."));
        if self.fail_captions.contains(&platform) {
            return Err(upstream_failure());
        }
        if self.malformed_captions.contains(&platform) {
            return Ok(json!({"caption": 42, "hashtags": "nope"}));
        }

        let text = request
            .parts
            .iter()
            .find_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .unwrap_or_default();

        Ok(match slide_in(text) {
            Some(slide) => json!({
                "caption": format!("{platform} slide {slide} caption"),
                "hashtags": ["#shared", format!("#{platform}"), format!("#slide{slide}")]
            }),
            None => json!({
                "caption": format!("{platform} caption"),
                "hashtags": ["#shared", format!("#{platform}")]
            }),
        })
    }

    async fn generate_images(&self, request: &ImageBatchRequest) -> Result<Vec<ImagePayload>, GeminiError> {
        self.image_calls.lock().unwrap().push(request.clone());

        let platform = platform_in(&request.prompt, |p| format!("professional {p} post."));
        if self.fail_images.contains(&platform) {
            return Err(upstream_failure());
        }

        let count = if self.short_images.contains(&platform) {
            request.count.saturating_sub(1)
        } else {
            request.count
        };

        Ok((1..=count)
            .map(|i| ImagePayload {
                mime_type: "image/jpeg".to_string(),
                data: Bytes::from(format!("{platform}-image-{i}")),
            })
            .collect())
    }
}
