//! Post Orchestrator: turns one `GenerationRequest` into one outcome per platform.
//!
//! Flow per platform: images (one batched call) → captions (one call, or one per
//! carousel slide run concurrently) → merge → `PlatformOutcome`.
//!
//! Platforms run strictly one after another so results and logs arrive in
//! selection order. A failing platform never stops the ones after it.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{info, warn};

use crate::generation::backend::GenerativeBackend;
use crate::generation::caption::{request_caption, CaptionResult, Slide};
use crate::generation::error::{GenerationError, ValidationError};
use crate::generation::images::request_images;
use crate::generation::models::{
    GeneratedPost, GenerationRequest, Platform, PlatformOutcome, PostType,
};

/// Generates every requested platform's post.
///
/// Returns `Err` only for validation failures, before any upstream call.
/// Generation failures are reported per platform as `PlatformOutcome::Failed`.
pub async fn generate_posts(
    backend: &dyn GenerativeBackend,
    request: &GenerationRequest,
) -> Result<Vec<PlatformOutcome>, ValidationError> {
    request.validate()?;

    info!(
        "Generating {:?} post ({} image(s)) for {} platform(s)",
        request.post_type,
        request.image_count(),
        request.platforms.len()
    );

    let mut outcomes = Vec::with_capacity(request.platforms.len());
    for &platform in &request.platforms {
        let outcome = match generate_for_platform(backend, request, platform).await {
            Ok(post) => {
                info!(
                    "Generated {} post: {} image(s), {} hashtag(s)",
                    platform,
                    post.images.len(),
                    post.hashtags.len()
                );
                PlatformOutcome::Generated(post)
            }
            Err(e) => {
                let cause = std::error::Error::source(&e)
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                warn!("Failed to generate post for {platform}: {e} ({cause})");
                PlatformOutcome::Failed {
                    platform,
                    message: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }

    let failed: Vec<Platform> = outcomes
        .iter()
        .filter(|o| !o.is_generated())
        .map(|o| o.platform())
        .collect();
    info!(
        "Generation finished: {}/{} platform(s) succeeded, failed: {:?}",
        outcomes.len() - failed.len(),
        outcomes.len(),
        failed
    );

    Ok(outcomes)
}

async fn generate_for_platform(
    backend: &dyn GenerativeBackend,
    request: &GenerationRequest,
    platform: Platform,
) -> Result<GeneratedPost, GenerationError> {
    let count = request.image_count();
    let images = request_images(backend, &request.prompt, platform, count).await?;

    let (caption, hashtags) = match request.post_type {
        PostType::Single => {
            let result = request_caption(backend, request, platform, None).await?;
            (result.caption, result.hashtags)
        }
        PostType::Carousel => {
            let slides = (1..=count).map(|index| {
                request_caption(backend, request, platform, Some(Slide { index, total: count }))
            });
            let results = try_join_all(slides).await?;
            merge_slides(results)
        }
    };

    Ok(GeneratedPost {
        platform,
        caption,
        hashtags,
        images,
    })
}

/// Joins slide captions as `Slide {i}: {caption}` blocks separated by a blank
/// line, and unions their hashtags (first occurrence wins).
pub fn merge_slides(results: Vec<CaptionResult>) -> (String, Vec<String>) {
    let caption = results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Slide {}: {}", i + 1, r.caption))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut seen = HashSet::new();
    let hashtags = results
        .into_iter()
        .flat_map(|r| r.hashtags)
        .filter(|tag| seen.insert(tag.clone()))
        .collect();

    (caption, hashtags)
}
