use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{UploadQuestionRequest, UploadQuestionResponse};

const ROUTE: &str = "/api/upload-question";

/// Forwards an already-parsed question list to the question store.
pub async fn upload_question_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<UploadQuestionResponse>> {
    let body = body.map_err(body_error)?;
    let request: UploadQuestionRequest = serde_json::from_slice(&body)?;

    state.guard.verify(&request.access_id, ROUTE)?;

    state
        .store
        .upload_questions(&request.question_list, &request.topic)
        .await?;

    info!(
        topic = %request.topic,
        question_count = request.question_list.len(),
        "Question upload accepted"
    );

    Ok(Json(UploadQuestionResponse::success()))
}

fn body_error(rejection: BytesRejection) -> AppError {
    let message = rejection.body_text();
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { message }
    } else {
        AppError::validation(message)
    }
}
