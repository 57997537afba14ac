use async_trait::async_trait;
use calamine::{Data, Reader, open_workbook_auto};
use std::path::{Path, PathBuf};

use crate::application::ports::document_extractor::{
    DocumentExtractionError, SheetTable, SpreadsheetReader,
};

/// Reads xlsx/xls/ods workbooks with calamine.
#[derive(Debug, Default)]
pub struct CalamineSpreadsheetReader;

impl CalamineSpreadsheetReader {
    pub fn new() -> Self {
        Self
    }

    fn render_cell(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            other => other.to_string().trim().to_string(),
        }
    }

    /// First row is the header; every later row is padded or cut to the
    /// header width.
    fn to_table<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> SheetTable {
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(Self::render_cell).collect(),
            None => return SheetTable::default(),
        };

        let width = headers.len();
        let rows = rows
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(Self::render_cell).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();

        SheetTable { headers, rows }
    }

    async fn blocking<T, F>(task: F) -> Result<T, DocumentExtractionError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, DocumentExtractionError> + Send + 'static,
    {
        tokio::task::spawn_blocking(task)
            .await
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?
    }
}

#[async_trait]
impl SpreadsheetReader for CalamineSpreadsheetReader {
    async fn sheet_names(&self, file_path: &Path) -> Result<Vec<String>, DocumentExtractionError> {
        let path: PathBuf = file_path.to_path_buf();

        Self::blocking(move || {
            let workbook = open_workbook_auto(&path).map_err(|e| {
                DocumentExtractionError::CorruptedFile(format!("{}: {}", path.display(), e))
            })?;
            Ok(workbook.sheet_names())
        })
        .await
    }

    async fn read_sheet(
        &self,
        file_path: &Path,
        sheet_name: &str,
    ) -> Result<SheetTable, DocumentExtractionError> {
        let path: PathBuf = file_path.to_path_buf();
        let sheet = sheet_name.to_string();

        Self::blocking(move || {
            let mut workbook = open_workbook_auto(&path).map_err(|e| {
                DocumentExtractionError::CorruptedFile(format!("{}: {}", path.display(), e))
            })?;
            let range = workbook
                .worksheet_range(&sheet)
                .map_err(|e| DocumentExtractionError::SheetFailed {
                    sheet: sheet.clone(),
                    reason: e.to_string(),
                })?;

            Ok(Self::to_table(range.rows()))
        })
        .await
    }
}
