use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::errors::LoadError;
use crate::application::ports::{DocumentExtractor, SpreadsheetReader, document_extractor::SheetTable};
use crate::domain::entities::{SourceRecord, TextUnit};
use crate::domain::value_objects::{OriginType, SourceMetadata};

/// The two knowledge-base inputs: a multi-sheet workbook and a paginated
/// document.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseSources {
    pub workbook_path: PathBuf,
    pub document_path: PathBuf,
}

pub struct DocumentLoader {
    spreadsheet_reader: Arc<dyn SpreadsheetReader>,
    document_extractor: Arc<dyn DocumentExtractor>,
}

impl DocumentLoader {
    pub fn new(
        spreadsheet_reader: Arc<dyn SpreadsheetReader>,
        document_extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        Self {
            spreadsheet_reader,
            document_extractor,
        }
    }

    /// Loads every sheet row followed by every document page, flattened into
    /// text units. A sheet that fails to load is skipped; an unreadable
    /// workbook or document fails the whole load.
    pub async fn load(&self, sources: &KnowledgeBaseSources) -> Result<Vec<TextUnit>, LoadError> {
        let mut records = self.load_sheets(&sources.workbook_path).await?;
        records.extend(self.load_document(&sources.document_path).await?);

        tracing::info!("Loaded {} source records", records.len());

        Ok(records
            .into_iter()
            .map(SourceRecord::into_text_unit)
            .collect())
    }

    pub async fn load_sheets(&self, workbook_path: &Path) -> Result<Vec<SourceRecord>, LoadError> {
        let sheet_names = self
            .spreadsheet_reader
            .sheet_names(workbook_path)
            .await
            .map_err(|e| LoadError::Workbook {
                path: workbook_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut records = Vec::new();
        for sheet_name in sheet_names {
            tracing::info!("Loading data from sheet: {}", sheet_name);

            match self
                .spreadsheet_reader
                .read_sheet(workbook_path, &sheet_name)
                .await
            {
                Ok(table) => records.extend(Self::sheet_records(&sheet_name, table)),
                Err(e) => {
                    let error = LoadError::Sheet {
                        sheet: sheet_name.clone(),
                        reason: e.to_string(),
                    };
                    tracing::warn!("Skipping sheet: {}", error);
                }
            }
        }

        Ok(records)
    }

    pub async fn load_document(&self, document_path: &Path) -> Result<Vec<SourceRecord>, LoadError> {
        let extracted = self
            .document_extractor
            .extract_pages(document_path)
            .await
            .map_err(|e| LoadError::Document {
                path: document_path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            "The number of pages in {} is {}",
            document_path.display(),
            extracted.pages.len()
        );

        let source_id = document_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| document_path.display().to_string());

        Ok(extracted
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let mut metadata =
                    SourceMetadata::new(source_id.as_str(), OriginType::Document, index as u32 + 1);
                if let Some(title) = &extracted.info.title {
                    metadata.set_title(title.clone());
                }
                if let Some(author) = &extracted.info.author {
                    metadata.set_author(author.clone());
                }
                SourceRecord::page(metadata, text)
            })
            .collect())
    }

    // Header is row 1, so data rows start at 2.
    fn sheet_records(sheet_name: &str, table: SheetTable) -> Vec<SourceRecord> {
        let SheetTable { headers, rows } = table;

        rows.into_iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
            .map(|(index, cells)| SourceRecord::row(sheet_name, index as u32 + 2, &headers, cells))
            .collect()
    }
}
