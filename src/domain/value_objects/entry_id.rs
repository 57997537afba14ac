use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable identifier of an index entry: a SHA-256 digest over the chunk's
/// provenance and text, so the same chunk always maps to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(String);

impl EntryId {
    pub fn derive(source_id: &str, unit_index: usize, chunk_index: usize, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source_id.as_bytes());
        hasher.update([0u8]);
        hasher.update((unit_index as u64).to_le_bytes());
        hasher.update((chunk_index as u64).to_le_bytes());
        hasher.update(text.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_stable() {
        let a = EntryId::derive("Maize", 0, 1, "plant early");
        let b = EntryId::derive("Maize", 0, 1, "plant early");
        let c = EntryId::derive("Maize", 0, 2, "plant early");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
