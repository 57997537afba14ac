pub mod google;
pub mod huggingface;

pub use google::GoogleTranslator;
pub use huggingface::HuggingFaceTranslator;
