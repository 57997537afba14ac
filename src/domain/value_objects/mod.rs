pub mod entry_id;
pub mod language;
pub mod source_metadata;

pub use entry_id::EntryId;
pub use language::Language;
pub use source_metadata::{OriginType, SourceMetadata};
