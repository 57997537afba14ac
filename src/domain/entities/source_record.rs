use serde::{Deserialize, Serialize};

use super::TextUnit;
use crate::domain::value_objects::{OriginType, SourceMetadata};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordContent {
    /// Cell values of one sheet row, in column order.
    Row(Vec<String>),
    /// Extracted text of one document page.
    Page(String),
}

/// One sheet row or one document page, exactly as read from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    metadata: SourceMetadata,
    content: RecordContent,
}

impl SourceRecord {
    /// Builds a tabular record. Every header present for the row is copied
    /// into the metadata as a `column -> value` property.
    pub fn row(sheet_name: &str, row_number: u32, headers: &[String], cells: Vec<String>) -> Self {
        let mut metadata = SourceMetadata::new(sheet_name, OriginType::Tabular, row_number);
        for (header, value) in headers.iter().zip(cells.iter()) {
            if !header.trim().is_empty() {
                metadata.set_property(header.trim(), value.as_str());
            }
        }

        Self {
            metadata,
            content: RecordContent::Row(cells),
        }
    }

    pub fn page(metadata: SourceMetadata, text: String) -> Self {
        Self {
            metadata,
            content: RecordContent::Page(text),
        }
    }

    /// Flattens the record: rows join every cell with a single space, pages
    /// are taken verbatim.
    pub fn into_text_unit(self) -> TextUnit {
        let content = match self.content {
            RecordContent::Row(cells) => cells.join(" "),
            RecordContent::Page(text) => text,
        };
        TextUnit::new(content, self.metadata)
    }
}
