use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentExtractionError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("Sheet '{sheet}' could not be read: {reason}")]
    SheetFailed { sheet: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Text of a paginated document, one entry per page in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPages {
    pub pages: Vec<String>,
    pub info: DocumentInfo,
}

/// One worksheet as text: the first row becomes the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_pages(&self, file_path: &Path) -> Result<ExtractedPages, DocumentExtractionError>;

    fn can_extract(&self, file_path: &Path) -> bool;
}

#[async_trait]
pub trait SpreadsheetReader: Send + Sync {
    async fn sheet_names(&self, file_path: &Path) -> Result<Vec<String>, DocumentExtractionError>;

    async fn read_sheet(
        &self,
        file_path: &Path,
        sheet_name: &str,
    ) -> Result<SheetTable, DocumentExtractionError>;
}
