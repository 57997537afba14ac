use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages a farmer may write in. English is the pivot language used for
/// retrieval and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Swahili,
}

impl Language {
    pub const PIVOT: Language = Language::English;

    /// ISO 639-1 code, as expected by translation services.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Swahili => "sw",
        }
    }

    pub fn is_pivot(&self) -> bool {
        *self == Self::PIVOT
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
