pub mod chunk;
pub mod conversation;
pub mod index_entry;
pub mod source_record;
pub mod text_unit;
pub mod vector_index;
pub mod weather;

pub use chunk::Chunk;
pub use conversation::{ConversationLog, ConversationTurn, Role};
pub use index_entry::IndexEntry;
pub use source_record::SourceRecord;
pub use text_unit::TextUnit;
pub use vector_index::{DistanceMetric, SearchHit, VectorIndex};
pub use weather::{Coordinates, DailyForecast, FORECAST_WINDOW_DAYS, WeatherSummary};
