//! Axum route handlers for the Generation API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::models::{
    download_filename, ContextImage, GeneratedPost, GenerationRequest, Platform, PlatformOutcome,
    PostType,
};
use crate::generation::orchestrator::generate_posts;
use crate::generation::templates::{templates_in, ContentTemplate, TemplateCategory};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GeneratePostsBody {
    pub prompt: String,
    #[serde(default)]
    pub template_id: Option<String>,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub post_type: PostType,
    /// Range-checked during validation so out-of-range values surface as
    /// `VALIDATION_ERROR` rather than a body rejection.
    #[serde(default)]
    pub num_carousel_slides: Option<i64>,
    #[serde(default)]
    pub context_image: Option<ContextImage>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePostsResponse {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub post_type: PostType,
    pub posts: Vec<OutcomeView>,
}

/// Every outcome carries a renderable `post`; failed ones also carry the message
/// and render as the error-caption post.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeView {
    Generated { post: PostView },
    Failed { message: String, post: PostView },
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub platform: Platform,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub images: Vec<ImageView>,
}

#[derive(Debug, Serialize)]
pub struct ImageView {
    pub filename: String,
    pub mime_type: String,
    /// Standard base64.
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateGroupView {
    pub category: TemplateCategory,
    pub templates: Vec<&'static ContentTemplate>,
}

#[derive(Debug, Serialize)]
pub struct TemplateCatalogResponse {
    pub categories: Vec<TemplateGroupView>,
}

impl PostView {
    fn new(post: GeneratedPost, post_type: PostType) -> Self {
        let images = post
            .images
            .iter()
            .enumerate()
            .map(|(i, image)| ImageView {
                filename: download_filename(post.platform, post_type, i),
                mime_type: image.mime_type.clone(),
                data: image.to_base64(),
            })
            .collect();

        Self {
            platform: post.platform,
            caption: post.caption,
            hashtags: post.hashtags,
            images,
        }
    }
}

impl OutcomeView {
    fn new(outcome: PlatformOutcome, post_type: PostType) -> Self {
        match outcome {
            PlatformOutcome::Generated(post) => OutcomeView::Generated {
                post: PostView::new(post, post_type),
            },
            PlatformOutcome::Failed { platform, message } => {
                let post = PlatformOutcome::Failed {
                    platform,
                    message: message.clone(),
                }
                .into_post();
                OutcomeView::Failed {
                    message,
                    post: PostView::new(post, post_type),
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
///
/// Returns the content template catalog grouped by category.
pub async fn handle_list_templates() -> Json<TemplateCatalogResponse> {
    let categories = TemplateCategory::ALL
        .into_iter()
        .map(|category| TemplateGroupView {
            category,
            templates: templates_in(category).collect(),
        })
        .collect();

    Json(TemplateCatalogResponse { categories })
}

/// POST /api/v1/posts/generate
///
/// Validates the submission, applies the template, then generates one post per
/// platform. Per-platform failures come back in-band with `status: "failed"`.
pub async fn handle_generate_posts(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePostsBody>, JsonRejection>,
) -> Result<Json<GeneratePostsResponse>, AppError> {
    let Json(body) = payload?;

    let request = GenerationRequest::new(
        body.prompt,
        &body.platforms,
        body.post_type,
        body.num_carousel_slides,
        body.context_image,
    )?
    .with_template(body.template_id.as_deref());

    let run_id = Uuid::new_v4();
    let outcomes = generate_posts(state.backend.as_ref(), &request)
        .instrument(info_span!("generation_run", %run_id))
        .await?;

    let posts = outcomes
        .into_iter()
        .map(|outcome| OutcomeView::new(outcome, request.post_type))
        .collect();

    Ok(Json(GeneratePostsResponse {
        run_id,
        generated_at: Utc::now(),
        post_type: request.post_type,
        posts,
    }))
}
