use std::io::Write;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::UploadedFile;
use crate::services::extractor::TextExtractor;

/// Placeholder in the converter arguments replaced by the temp file path.
pub const INPUT_PLACEHOLDER: &str = "{input}";

const STDERR_EXCERPT_CHARS: usize = 500;

/// Upper bound for the `--version` availability check run by `/health`.
const AVAILABILITY_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Converts `.pages` documents by running an external converter that prints
/// plain text to stdout.
pub struct PagesExtractor {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl PagesExtractor {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pages_converter_command.clone(),
            config.pages_converter_args.clone(),
            config.conversion_timeout(),
        )
    }

    fn command_args(&self, input: &str) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(INPUT_PLACEHOLDER, input))
            .collect();
        if !self.args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
            args.push(input.to_string());
        }
        args
    }

    async fn run_converter(&self, input: &str) -> AppResult<String> {
        let args = self.command_args(input);
        debug!(command = %self.command, args = ?args, "Running document converter");

        let child = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AppError::extraction(format!("Failed to start converter '{}': {}", self.command, e))
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|elapsed| {
                warn!(
                    command = %self.command,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Document converter timed out"
                );
                AppError::from(elapsed)
            })?
            .map_err(|e| AppError::extraction(format!("Converter I/O failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect();
            return Err(AppError::extraction(format!(
                "Converter exited with {}: {}",
                output.status, excerpt
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

#[async_trait]
impl TextExtractor for PagesExtractor {
    fn extension(&self) -> &'static str {
        "pages"
    }

    async fn extract(&self, file: &UploadedFile) -> AppResult<String> {
        let start = Instant::now();

        // Unique per request; removed when dropped, whatever the outcome.
        let mut temp_file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pages")
            .tempfile()
            .map_err(|e| AppError::internal(format!("Failed to create temporary file: {}", e)))?;
        write_payload(&mut temp_file, &file.content)?;

        let input = temp_file.path().to_string_lossy().into_owned();
        let text = self.run_converter(&input).await?;

        info!(
            file_name = %file.name,
            text_length = text.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "Pages conversion completed"
        );
        Ok(text)
    }

    async fn is_available(&self) -> bool {
        let limit = self.timeout.min(AVAILABILITY_CHECK_TIMEOUT);
        let status = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        match tokio::time::timeout(limit, status).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!(command = %self.command, error = %e, "Document converter not found");
                false
            }
            Err(_) => {
                warn!(
                    command = %self.command,
                    timeout_ms = limit.as_millis() as u64,
                    "Document converter availability check timed out"
                );
                false
            }
        }
    }
}

fn write_payload(temp_file: &mut NamedTempFile, content: &[u8]) -> AppResult<()> {
    temp_file
        .write_all(content)
        .and_then(|_| temp_file.flush())
        .map_err(|e| AppError::internal(format!("Failed to write upload to temporary file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_substituted() {
        let extractor = PagesExtractor::new(
            "soffice",
            vec!["--headless".into(), "--cat".into(), "{input}".into()],
            Duration::from_secs(1),
        );
        assert_eq!(
            extractor.command_args("/tmp/upload-x.pages"),
            vec!["--headless", "--cat", "/tmp/upload-x.pages"]
        );
    }

    #[test]
    fn input_is_appended_without_placeholder() {
        let extractor = PagesExtractor::new("cat", Vec::new(), Duration::from_secs(1));
        assert_eq!(extractor.command_args("/tmp/a.pages"), vec!["/tmp/a.pages"]);
    }
}
