use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginType {
    Tabular,
    Document,
}

impl fmt::Display for OriginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginType::Tabular => write!(f, "tabular"),
            OriginType::Document => write!(f, "document"),
        }
    }
}

/// Where a piece of knowledge-base text came from.
///
/// `position` is the 1-based row number for sheet rows and the 1-based page
/// number for document pages. Properties are kept ordered so persisted
/// entries serialize identically across builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    source_id: String,
    origin: OriginType,
    position: u32,
    properties: BTreeMap<String, String>,
}

impl SourceMetadata {
    pub fn new(source_id: impl Into<String>, origin: OriginType, position: u32) -> Self {
        Self {
            source_id: source_id.into(),
            origin,
            position,
            properties: BTreeMap::new(),
        }
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn origin(&self) -> OriginType {
        self.origin
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    // Common metadata helpers
    pub fn set_title(&mut self, title: String) {
        self.set_property("title", title);
    }

    pub fn set_author(&mut self, author: String) {
        self.set_property("author", author);
    }
}
