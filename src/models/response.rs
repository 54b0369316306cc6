use serde::{Deserialize, Serialize};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Question uploaded successfully";

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseQuestionResponse {
    pub question_list: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadQuestionResponse {
    pub message: String,
}

impl UploadQuestionResponse {
    pub fn success() -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
