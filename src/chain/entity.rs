//! Entity representation: a person who can occupy a chain slot

use serde::{Deserialize, Serialize};

/// Identifier assigned by the metadata backend
///
/// Serializes as a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the backend's raw id
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// A searchable person
///
/// Immutable once fetched. Two entities are the same person iff their ids match;
/// `popularity` is only used to rank the endpoint pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    pub id: EntityId,
    /// Name shown to the player
    pub display_name: String,
    /// Opaque profile image path, if the backend has one
    pub image_ref: Option<String>,
    /// Backend popularity score
    pub popularity: f64,
}

impl Entity {
    pub fn new(id: u64, display_name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(id),
            display_name: display_name.into(),
            image_ref: None,
            popularity: 0.0,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = popularity;
        self
    }

    /// Whether `other` is the same person
    pub fn same_as(&self, other: &Entity) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name)
    }
}
