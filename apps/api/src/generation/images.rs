//! Image Requester: one batched image call per platform.

use tracing::debug;

use crate::gemini_client::GeminiError;
use crate::generation::backend::{AspectRatio, GenerativeBackend, ImageBatchRequest};
use crate::generation::error::ImageGenerationError;
use crate::generation::models::{ImagePayload, Platform};
use crate::generation::prompts::IMAGE_PROMPT_TEMPLATE;

pub fn aspect_ratio_for(platform: Platform) -> AspectRatio {
    match platform {
        Platform::LinkedIn => AspectRatio::Portrait,
        Platform::Instagram => AspectRatio::Square,
        Platform::X => AspectRatio::Landscape,
    }
}

pub fn build_visual_prompt(prompt: &str, platform: Platform) -> String {
    IMAGE_PROMPT_TEMPLATE
        .replace("{platform}", platform.as_str())
        .replace("{prompt}", prompt)
}

/// Requests `count` images for `platform` in a single upstream call.
/// Anything other than exactly `count` images is a failure.
pub async fn request_images(
    backend: &dyn GenerativeBackend,
    prompt: &str,
    platform: Platform,
    count: usize,
) -> Result<Vec<ImagePayload>, ImageGenerationError> {
    let request = ImageBatchRequest {
        prompt: build_visual_prompt(prompt, platform),
        count,
        aspect_ratio: aspect_ratio_for(platform),
    };
    debug!(
        "Requesting {} image(s) for {} at {}",
        count,
        platform,
        request.aspect_ratio.as_str()
    );

    let images = backend
        .generate_images(&request)
        .await
        .map_err(|source| ImageGenerationError { platform, source })?;

    if images.len() != count {
        return Err(ImageGenerationError {
            platform,
            source: GeminiError::ImageCount {
                expected: count,
                actual: images.len(),
            },
        });
    }

    Ok(images)
}
