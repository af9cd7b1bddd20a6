use axum::{Json, extract::State, http::StatusCode};
use gl_api_types::{AssistMessageRequest, AssistMessageResponse};
use std::sync::Arc;
use tracing::warn;

use crate::{ApiResult, AppState, ErrorResponse, bad_gateway};

pub(crate) async fn assist_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssistMessageRequest>,
) -> ApiResult<AssistMessageResponse> {
    let Some(assist) = &state.assist else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "message assist is not configured".to_owned(),
                code: Some("assist_unavailable".to_owned()),
            }),
        ));
    };

    let message = assist.generate(&request.prompt).await.map_err(|err| {
        warn!("message generation failed: {err}");
        bad_gateway("message generation failed")
    })?;

    Ok(Json(AssistMessageResponse { message }))
}
