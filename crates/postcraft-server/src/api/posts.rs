use axum::{extract::State, Extension, Json};
use postcraft_llm::LanguageModel;
use postcraft_pipeline::{
    check_compliance, edit_post, extract_post_metadata, heuristic_virality, Compliance,
    EditOutcome, PipelineError, PostMetadata, ViralityScore,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{parse_platform, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EditRequest {
    pub current_content: String,
    pub edit_request: String,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScoreRequest {
    pub content: String,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScoreResponse {
    #[serde(flatten)]
    pub score: ViralityScore,
    pub metadata: PostMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<Compliance>,
}

/// POST /api/v1/posts/edit - revise a post with the editor agent.
pub(super) async fn edit<M: LanguageModel + 'static>(
    State(state): State<AppState<M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<EditRequest>,
) -> Result<Json<ApiResponse<EditOutcome>>, ApiError> {
    let platform = parse_platform(&req_id.0, body.platform.as_deref())?;
    let pipeline = &state.pipeline;

    let outcome = edit_post(
        pipeline.model(),
        &pipeline.config().rules,
        &body.current_content,
        &body.edit_request,
        platform,
    )
    .await
    .map_err(|e| match e {
        PipelineError::Validation(msg) => ApiError::new(req_id.0.clone(), "validation_error", msg),
        other => {
            tracing::error!(request_id = %req_id.0, error = %other, "post edit failed");
            ApiError::new(req_id.0.clone(), "upstream_error", other.to_string())
        }
    })?;

    Ok(Json(ApiResponse::new(req_id.0, outcome)))
}

/// POST /api/v1/posts/score - heuristic score, no model call.
pub(super) async fn score<M: LanguageModel + 'static>(
    State(state): State<AppState<M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScoreRequest>,
) -> Result<Json<ApiResponse<ScoreResponse>>, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "content must not be empty",
        ));
    }
    let platform = parse_platform(&req_id.0, body.platform.as_deref())?;

    let metadata = extract_post_metadata(&body.content);
    let compliance = platform.map(|p| {
        let rules = state.pipeline.config().rules.get(p);
        check_compliance(&body.content, &rules)
    });

    Ok(Json(ApiResponse::new(
        req_id.0,
        ScoreResponse {
            score: heuristic_virality(&metadata),
            metadata,
            compliance,
        },
    )))
}
