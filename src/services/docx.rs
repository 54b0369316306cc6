use std::io::Cursor;
use std::time::Instant;

use async_trait::async_trait;
use docx_rust::document::{BodyContent, Paragraph, ParagraphContent, Run, RunContent};
use docx_rust::DocxFile;

use crate::error::{AppError, AppResult};
use crate::models::UploadedFile;
use crate::services::extractor::TextExtractor;

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for DocxExtractor {
    fn extension(&self) -> &'static str {
        "docx"
    }

    async fn extract(&self, file: &UploadedFile) -> AppResult<String> {
        let start = Instant::now();
        let content = file.content.clone();

        let text = tokio::task::spawn_blocking(move || extract_paragraph_text(&content))
            .await
            .map_err(|e| AppError::internal(format!("docx extraction task failed: {}", e)))??;

        tracing::info!(
            file_name = %file.name,
            text_length = text.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "DOCX text extraction completed"
        );
        Ok(text)
    }
}

/// Joins the text of every top-level body paragraph with `\n`, in document order.
/// Tables and other block content are skipped. Inside a paragraph, tabs become
/// `\t` and line breaks become `\n`; field codes are left out.
pub fn extract_paragraph_text(content: &[u8]) -> AppResult<String> {
    let file = DocxFile::from_reader(Cursor::new(content))
        .map_err(|e| AppError::extraction(format!("Not a readable DOCX archive: {}", e)))?;
    let docx = file
        .parse()
        .map_err(|e| AppError::extraction(format!("Failed to parse DOCX document: {}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .body
        .content
        .iter()
        .filter_map(|block| match block {
            BodyContent::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    tracing::debug!(paragraphs = paragraphs.len(), "Collected DOCX paragraphs");
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for content in &paragraph.content {
        match content {
            ParagraphContent::Run(run) => push_run_text(run, &mut text),
            ParagraphContent::Link(link) => {
                if let Some(run) = &link.content {
                    push_run_text(run, &mut text);
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &Run, out: &mut String) {
    for content in &run.content {
        match content {
            RunContent::Text(t) => out.push_str(&t.text),
            RunContent::Tab(_) => out.push('\t'),
            RunContent::Break(_) | RunContent::CarriageReturn(_) => out.push('\n'),
            // InstrText is field-code markup, not visible text.
            _ => {}
        }
    }
}
