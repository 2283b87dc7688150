//! Request and result types for one generation run.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::generation::error::ValidationError;
use crate::generation::templates::resolve_prompt;

pub const MIN_CAROUSEL_SLIDES: u8 = 2;
pub const MAX_CAROUSEL_SLIDES: u8 = 4;

/// Target social network. Drives tone framing and image aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    LinkedIn,
    Instagram,
    X,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::Instagram => "Instagram",
            Platform::X => "X",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    #[default]
    Single,
    Carousel,
}

impl PostType {
    /// Human label used when describing the post to the model.
    pub fn label(&self) -> &'static str {
        match self {
            PostType::Single => "Single Image",
            PostType::Carousel => "Carousel",
        }
    }
}

/// Optional user-supplied image that biases captions toward its visual theme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextImage {
    /// Standard base64, without a `data:` URL prefix.
    pub base64: String,
    pub mime_type: String,
}

impl ContextImage {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.mime_type.starts_with("image/") {
            return Err(ValidationError::InvalidContextImage(format!(
                "unsupported mime type '{}'",
                self.mime_type
            )));
        }
        STANDARD.decode(&self.base64).map_err(|e| {
            ValidationError::InvalidContextImage(format!("payload is not valid base64: {e}"))
        })?;
        Ok(())
    }
}

/// One user submission. Immutable for the duration of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Selection order, duplicates removed.
    pub platforms: Vec<Platform>,
    pub post_type: PostType,
    /// 2..=4 for carousels, always 1 for single posts.
    pub num_carousel_slides: u8,
    pub context_image: Option<ContextImage>,
}

impl GenerationRequest {
    /// Builds and validates a request. Duplicate platforms keep their first position.
    pub fn new(
        prompt: impl Into<String>,
        platforms: &[Platform],
        post_type: PostType,
        num_carousel_slides: Option<i64>,
        context_image: Option<ContextImage>,
    ) -> Result<Self, ValidationError> {
        let mut unique = Vec::with_capacity(platforms.len());
        for platform in platforms {
            if !unique.contains(platform) {
                unique.push(*platform);
            }
        }

        let num_carousel_slides = match post_type {
            PostType::Single => 1,
            PostType::Carousel => {
                let requested = num_carousel_slides.unwrap_or(3);
                u8::try_from(requested)
                    .map_err(|_| ValidationError::InvalidSlideCount(requested))?
            }
        };

        let request = Self {
            prompt: prompt.into(),
            platforms: unique,
            post_type,
            num_carousel_slides,
            context_image,
        };
        request.validate()?;
        Ok(request)
    }

    /// Wraps the prompt in a content template. Must run after validation so an
    /// empty raw prompt is never hidden behind template text.
    pub fn with_template(mut self, template_id: Option<&str>) -> Self {
        self.prompt = resolve_prompt(&self.prompt, template_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        if self.platforms.is_empty() {
            return Err(ValidationError::NoPlatforms);
        }
        if self.post_type == PostType::Carousel
            && !(MIN_CAROUSEL_SLIDES..=MAX_CAROUSEL_SLIDES).contains(&self.num_carousel_slides)
        {
            return Err(ValidationError::InvalidSlideCount(i64::from(
                self.num_carousel_slides,
            )));
        }
        if let Some(image) = &self.context_image {
            image.validate()?;
        }
        Ok(())
    }

    /// Number of images (and slides) each platform's post carries.
    pub fn image_count(&self) -> usize {
        match self.post_type {
            PostType::Single => 1,
            PostType::Carousel => self.num_carousel_slides as usize,
        }
    }
}

/// Raw image bytes as returned by the image model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Bytes,
}

impl ImagePayload {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// A fully generated post for one platform. The view layer may edit the
/// caption afterwards; images are only ever replaced whole.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPost {
    pub platform: Platform,
    /// For carousels: `Slide {i}: {caption}` blocks separated by a blank line.
    pub caption: String,
    pub hashtags: Vec<String>,
    pub images: Vec<ImagePayload>,
}

/// Result of generating one platform's post. A platform either fully succeeds
/// or fails as a whole; partial content is never surfaced.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformOutcome {
    Generated(GeneratedPost),
    Failed { platform: Platform, message: String },
}

impl PlatformOutcome {
    pub fn platform(&self) -> Platform {
        match self {
            PlatformOutcome::Generated(post) => post.platform,
            PlatformOutcome::Failed { platform, .. } => *platform,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, PlatformOutcome::Generated(_))
    }

    /// Flattens into the post shape older clients render: a failure becomes a
    /// post with no images, no hashtags and the error text as its caption.
    pub fn into_post(self) -> GeneratedPost {
        match self {
            PlatformOutcome::Generated(post) => post,
            PlatformOutcome::Failed { platform, message } => GeneratedPost {
                platform,
                caption: failure_caption(&message),
                hashtags: Vec::new(),
                images: Vec::new(),
            },
        }
    }
}

pub fn failure_caption(message: &str) -> String {
    format!("Error: Could not generate content. {message}")
}

/// Suggested file name for downloading one image of a post.
/// `index` is 0-based; names are 1-based.
pub fn download_filename(platform: Platform, post_type: PostType, index: usize) -> String {
    match post_type {
        PostType::Carousel => format!("{platform}_post_slide_{}.jpg", index + 1),
        PostType::Single => format!("{platform}_post_{}.jpg", index + 1),
    }
}
