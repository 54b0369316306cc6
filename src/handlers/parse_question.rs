use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::Json,
    Extension,
};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{ParseQuestionResponse, UploadedFile};

const ROUTE: &str = "/api/parse-question";

/// Fields of the `multipart/form-data` upload.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    access_id: String,
}

pub async fn parse_question_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ParseQuestionResponse>> {
    let start = Instant::now();
    let request_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_else(|| "-".to_string());

    let mut multipart = multipart.map_err(|e| {
        debug!(request_id = %request_id, error = %e, "Rejected non-multipart upload");
        AppError::InvalidContentType
    })?;
    let form = read_upload_form(&mut multipart).await?;

    state.guard.verify(&form.access_id, ROUTE)?;

    let file = form.file.ok_or(AppError::MissingFile)?;
    info!(
        request_id = %request_id,
        file_name = %file.name,
        file_size = file.size,
        mime_type = file.mime_type.as_deref().unwrap_or("-"),
        "File received"
    );

    let extractor = state
        .extractors
        .resolve(&file)
        .ok_or_else(|| AppError::unsupported(file.name.clone()))?;

    if file.content.is_empty() {
        return Err(AppError::InvalidFile {
            message: "File is empty".to_string(),
        });
    }

    let text = match extractor.extract(&file).await {
        Ok(text) => text,
        Err(e) => {
            error!(request_id = %request_id, file_name = %file.name, error = %e, "Text extraction failed");
            return Err(e);
        }
    };

    let question_list = state.parser.parse_questions(&text).await?;

    info!(
        request_id = %request_id,
        extractor = extractor.extension(),
        text_length = text.len(),
        question_count = question_list.len(),
        total_time_ms = start.elapsed().as_millis() as u64,
        "Questions parsed from upload"
    );

    Ok(Json(ParseQuestionResponse { question_list }))
}

async fn read_upload_form(multipart: &mut Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart field", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;

                let mut file = UploadedFile::new(file_name, data);
                if let Some(mime_type) = content_type {
                    file = file.with_mime_type(mime_type);
                }
                form.file = Some(file);
            }
            "access_id" => {
                form.access_id = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read access_id", e))?;
            }
            other => debug!(field = other, "Ignoring unexpected form field"),
        }
    }

    Ok(form)
}

fn multipart_error(context: &str, err: MultipartError) -> AppError {
    let message = format!("{}: {}", context, err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { message }
    } else {
        AppError::InvalidFile { message }
    }
}
