//! Question parsing: turns extracted document text into an ordered list of
//! question strings.
//!
//! The production implementation talks to any OpenAI-compatible
//! chat-completion endpoint through `async-openai`.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait QuestionParser: Send + Sync {
    /// Returns the questions found in `text`, in the order they appear.
    async fn parse_questions(&self, text: &str) -> AppResult<Vec<String>>;
}

const SYSTEM_PROMPT: &str = "You extract interview or exam questions from documents. \
Return ONLY a JSON array of strings, one element per question, in the order the \
questions appear in the document. Keep each question's wording exactly as written, \
including its numbering if present. Do not include answers, explanations or \
headings. If the document contains no questions, return [].";

pub struct OpenAiQuestionParser {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiQuestionParser {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    async fn ask(&self, text: &str) -> AppResult<String> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .map_err(|e| AppError::parsing(format!("Failed to build prompt: {}", e)))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .map_err(|e| AppError::parsing(format!("Failed to build prompt: {}", e)))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .build()
            .map_err(|e| AppError::parsing(format!("Failed to build request: {}", e)))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!(model = %self.model_name, error = %e, "LLM API call failed");
            AppError::parsing(format!("LLM API call failed: {}", e))
        })?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::parsing("LLM returned an empty reply"))
    }
}

#[async_trait]
impl QuestionParser for OpenAiQuestionParser {
    async fn parse_questions(&self, text: &str) -> AppResult<Vec<String>> {
        if text.trim().is_empty() {
            debug!("Extracted text is blank, skipping LLM call");
            return Ok(Vec::new());
        }

        debug!(model = %self.model_name, text_length = text.len(), "Requesting question parsing");
        let reply = self.ask(text).await?;
        let questions = parse_question_reply(&reply)?;

        info!(
            model = %self.model_name,
            question_count = questions.len(),
            "Question parsing completed"
        );
        Ok(questions)
    }
}

/// Decodes the model reply: a JSON array of strings, optionally wrapped in a
/// Markdown code fence. Entries are trimmed and blanks dropped.
pub fn parse_question_reply(reply: &str) -> AppResult<Vec<String>> {
    let body = strip_code_fence(reply.trim());
    let questions: Vec<String> = serde_json::from_str(body)
        .map_err(|e| AppError::parsing(format!("LLM reply is not a JSON string array: {}", e)))?;

    Ok(questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect())
}

fn strip_code_fence(reply: &str) -> &str {
    let Some(rest) = reply.strip_prefix("```") else {
        return reply;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_array() {
        let questions = parse_question_reply(r#"["Q1: Capital of France?", "Q2: 2+2=?"]"#).unwrap();
        assert_eq!(questions, vec!["Q1: Capital of France?", "Q2: 2+2=?"]);
    }

    #[test]
    fn fenced_reply_with_blanks() {
        let reply = "```json\n[\" What is Rust? \", \"\", \"Explain ownership.\"]\n```";
        let questions = parse_question_reply(reply).unwrap();
        assert_eq!(questions, vec!["What is Rust?", "Explain ownership."]);
    }

    #[test]
    fn prose_reply_is_a_parsing_error() {
        let err = parse_question_reply("Here are the questions: 1. foo").unwrap_err();
        assert_eq!(err.error_code(), "PARSING_FAILED");
    }
}
