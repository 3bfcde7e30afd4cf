pub mod connection;
pub mod dao;
pub mod entities;

use uuid::Uuid;

/// Canonical string form of a store identifier; the only key used for
/// identifier equality and deduplication.
pub fn canonical_id(id: &Uuid) -> String {
    id.hyphenated().to_string()
}

/// Inverse of [`canonical_id`].
pub fn parse_canonical_id(raw: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(raw)
}
