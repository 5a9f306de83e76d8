use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::stream::{Stream, StreamExt};
use postcraft_llm::LanguageModel;
use postcraft_pipeline::PipelineResult;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{parse_platforms, require_url, ApiError, ApiResponse, AppState};

/// Final SSE frame after the terminal pipeline event.
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
pub(super) struct PipelineRequest {
    pub url: String,
    #[serde(default)]
    pub platforms: Option<Vec<String>>,
}

/// POST /api/v1/pipeline - stream pipeline events as SSE `data:` frames.
pub(super) async fn stream_pipeline<M: LanguageModel + 'static>(
    State(state): State<AppState<M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<PipelineRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let url = require_url(&req_id.0, &body.url)?;
    let platforms = parse_platforms(&req_id.0, body.platforms.as_deref())?;
    tracing::info!(request_id = %req_id.0, url = %url, "pipeline stream opened");

    let pipeline = Arc::clone(&state.pipeline);
    let request_id = req_id.0;
    let stream = async_stream::stream! {
        let events = pipeline.process_url(url, platforms);
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match serde_json::to_string(&event) {
                Ok(json) => yield Ok(Event::default().data(json)),
                Err(e) => {
                    tracing::warn!(request_id = %request_id, error = %e, "failed to serialize pipeline event");
                }
            }
        }

        tracing::info!(request_id = %request_id, "pipeline stream closed");
        yield Ok(Event::default().data(DONE_SENTINEL));
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

/// POST /api/v1/generate - run the pipeline to completion and return the result.
pub(super) async fn generate<M: LanguageModel + 'static>(
    State(state): State<AppState<M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<PipelineRequest>,
) -> Result<Json<ApiResponse<PipelineResult>>, ApiError> {
    let url = require_url(&req_id.0, &body.url)?;
    let platforms = parse_platforms(&req_id.0, body.platforms.as_deref())?;

    match state.pipeline.run(url, platforms).await {
        Ok(result) => Ok(Json(ApiResponse::new(req_id.0, result))),
        Err(failure) => {
            tracing::warn!(request_id = %req_id.0, stage = %failure.stage, error = %failure.error, "generate failed");
            Err(ApiError::new(req_id.0, "upstream_error", failure.to_string()))
        }
    }
}
