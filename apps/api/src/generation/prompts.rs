// All model prompt text for post generation.
// Templates use `{name}` placeholders filled with `str::replace` before sending.

/// System instruction for caption generation. Replace `{platform}`.
pub const CAPTION_SYSTEM_TEMPLATE: &str = "You are a world-class social media content strategist. \
    Your task is to generate a post for {platform}.";

/// User instruction for caption generation.
/// Replace: {prompt}, {post_type}, {slide_clause}
pub const CAPTION_PROMPT_TEMPLATE: &str = "The core idea for the post is: \"{prompt}\". \
    The post type is a {post_type}{slide_clause}. \
    Generate a compelling, platform-appropriate caption and a list of 3-5 relevant hashtags.";

/// Carousel slide qualifier. Replace: {index}, {total}
pub const SLIDE_CLAUSE_TEMPLATE: &str = " for slide {index} of a {total}-slide carousel";

/// Appended to the caption prompt when the user attached a context image.
pub const CONTEXT_IMAGE_INSTRUCTION: &str = " The user has provided an image for context. \
    Analyze the image and incorporate its themes into your response.";

/// Visual prompt for image generation. Replace: {prompt}, {platform}
pub const IMAGE_PROMPT_TEMPLATE: &str = "A visually stunning, high-resolution, photorealistic image \
    representing the concept: \"{prompt}\". \
    Style it appropriately for a professional {platform} post.";
