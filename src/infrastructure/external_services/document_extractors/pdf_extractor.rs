use async_trait::async_trait;
use lopdf::Document;
use lopdf::Object;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::path::{Path, PathBuf};

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, DocumentInfo, ExtractedPages,
};

pub struct PdfExtractor {
    password: String,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            password: String::new(),
        }
    }

    fn filter_func(object_id: (u32, u16), object: &mut Object) -> Option<((u32, u16), Object)> {
        static IGNORE: &[&[u8]] = &[
            b"Length",
            b"BBox",
            b"Matrix",
            b"Filter",
            b"ColorSpace",
            b"Width",
            b"Height",
            b"BitsPerComponent",
            b"PTEX.FileName",
            b"PTEX.PageNumber",
            b"PTEX.InfoDict",
            b"FontDescriptor",
            b"ExtGState",
            b"MediaBox",
        ];

        if let Object::Dictionary(dict) = object {
            let keys_to_remove: Vec<_> = dict
                .iter()
                .filter(|(key, _)| IGNORE.contains(&key.as_slice()))
                .map(|(key, _)| key.clone())
                .collect();
            for key in keys_to_remove {
                dict.remove(&key);
            }
        }

        Some((object_id, object.to_owned()))
    }

    fn load(path: &Path, password: &str) -> Result<Document, DocumentExtractionError> {
        let mut doc = Document::load_filtered(path, Self::filter_func)
            .map_err(|e| DocumentExtractionError::CorruptedFile(format!("{}: {}", path.display(), e)))?;

        if doc.is_encrypted() {
            doc.decrypt(password).map_err(|_e| {
                DocumentExtractionError::ExtractionFailed(
                    "Failed to decrypt PDF - invalid password".to_string(),
                )
            })?;
        }

        Ok(doc)
    }

    /// Page texts in page order, as lopdf extracts them. A page whose text
    /// cannot be extracted is kept as an empty page so numbering stays aligned.
    fn extract_page_texts(doc: &Document) -> Vec<String> {
        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();

        page_numbers
            .into_par_iter()
            .map(|page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to extract text from page {}: {}", page_num, e);
                    String::new()
                }
            })
            .collect()
    }

    fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
        let info = doc.trailer.get(b"Info").ok()?;
        let info_dict = match info {
            Object::Reference(id) => doc.get_dictionary(*id).ok()?,
            other => other.as_dict().ok()?,
        };
        let value = info_dict.get(key).ok()?.as_str().ok()?;
        let text = String::from_utf8_lossy(value).trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    fn extract_info(doc: &Document) -> DocumentInfo {
        DocumentInfo {
            title: Self::info_string(doc, b"Title"),
            author: Self::info_string(doc, b"Author"),
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract_pages(&self, file_path: &Path) -> Result<ExtractedPages, DocumentExtractionError> {
        if !self.can_extract(file_path) {
            return Err(DocumentExtractionError::UnsupportedFormat(
                file_path.display().to_string(),
            ));
        }

        let path: PathBuf = file_path.to_path_buf();
        let password = self.password.clone();

        tokio::task::spawn_blocking(move || -> Result<ExtractedPages, DocumentExtractionError> {
            let doc = Self::load(&path, &password)?;
            let pages = Self::extract_page_texts(&doc);

            if pages.iter().all(|page| page.trim().is_empty()) {
                tracing::warn!(
                    "No text could be extracted from {}; it may be a scanned document",
                    path.display()
                );
            }

            Ok(ExtractedPages {
                pages,
                info: Self::extract_info(&doc),
            })
        })
        .await
        .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))?
    }

    fn can_extract(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}
