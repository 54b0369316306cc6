use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::UploadedFile;
use crate::services::docx::DocxExtractor;
use crate::services::pages::PagesExtractor;

/// Turns the bytes of one document format into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Lower-case file extension, without the dot, this extractor handles.
    fn extension(&self) -> &'static str;

    async fn extract(&self, file: &UploadedFile) -> AppResult<String>;

    /// Whether the extractor's runtime dependencies are present.
    async fn is_available(&self) -> bool {
        true
    }
}

/// Extractors keyed by normalized file extension.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<&'static str, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `.docx` and `.pages` extractors configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(PagesExtractor::from_config(config)));
        registry
    }

    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) -> &mut Self {
        debug!(extension = extractor.extension(), "Registering text extractor");
        self.extractors.insert(extractor.extension(), extractor);
        self
    }

    pub fn resolve(&self, file: &UploadedFile) -> Option<Arc<dyn TextExtractor>> {
        let extension = file.extension()?;
        self.extractors.get(extension.as_str()).cloned()
    }

    pub async fn availability(&self) -> Vec<(&'static str, bool)> {
        let mut report = Vec::with_capacity(self.extractors.len());
        for extractor in self.extractors.values() {
            report.push((extractor.extension(), extractor.is_available().await));
        }
        report.sort_by_key(|(ext, _)| *ext);
        report
    }
}
