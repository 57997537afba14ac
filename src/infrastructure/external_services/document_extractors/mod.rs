pub mod pdf_extractor;
pub mod spreadsheet_reader;

pub use pdf_extractor::PdfExtractor;
pub use spreadsheet_reader::CalamineSpreadsheetReader;
