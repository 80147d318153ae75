//! Metadata backend contract and an in-memory implementation for tests
//!
//! Wire types mirror the TMDB v3 JSON shapes so the HTTP backend can decode
//! straight into them.

use crate::chain::{Entity, EntityId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One page of a paginated listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    /// A standalone page holding `results`
    pub fn single(results: Vec<T>) -> Self {
        let total_results = results.len() as u64;
        Self {
            page: 1,
            results,
            total_pages: 1,
            total_results,
        }
    }

    /// Whether the backend says there is nothing after this page
    pub fn is_last(&self) -> bool {
        self.total_pages != 0 && self.page >= self.total_pages
    }
}

/// A person as the backend reports them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
}

impl From<PersonRecord> for Entity {
    fn from(record: PersonRecord) -> Self {
        Entity {
            id: EntityId::new(record.id),
            display_name: record.name,
            image_ref: record.profile_path,
            popularity: record.popularity,
        }
    }
}

/// A title crediting people
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Errors from metadata backend calls
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("response decode error: {0}")]
    Decode(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// The three lookups the oracle needs from a movie metadata service.
///
/// Abstracts over transport (HTTP, in-memory) so the oracle does not depend
/// on how the service is reached.
#[async_trait]
pub trait MetadataBackend: Send + Sync {
    /// People whose name matches `query`.
    async fn search_people(&self, query: &str) -> BackendResult<Page<PersonRecord>>;

    /// One page (1-based) of the popular-people listing.
    async fn popular_people(&self, page: u32) -> BackendResult<Page<PersonRecord>>;

    /// Works crediting both `a` and `b`.
    async fn works_with_both(&self, a: EntityId, b: EntityId) -> BackendResult<Page<WorkRecord>>;
}

/// In-memory backend for testing — serves a small preconfigured movie world.
#[derive(Debug, Default)]
pub struct MockBackend {
    available: bool,
    people: Vec<PersonRecord>,
    popular_pages: Vec<Vec<PersonRecord>>,
    works: HashMap<u64, WorkRecord>,
    credits: HashMap<EntityId, HashSet<u64>>,
    search_calls: AtomicUsize,
    popular_calls: AtomicUsize,
    connection_calls: AtomicUsize,
}

impl MockBackend {
    /// An empty backend that answers every call
    pub fn new() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }

    /// A backend where every call fails
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Register a searchable person
    pub fn with_person(mut self, record: PersonRecord) -> Self {
        self.people.push(record);
        self
    }

    /// Append a page to the popular-people listing
    pub fn with_popular_page(mut self, records: Vec<PersonRecord>) -> Self {
        self.popular_pages.push(records);
        self
    }

    /// Credit every listed person on a work
    pub fn with_work(mut self, id: u64, title: &str, cast: &[u64]) -> Self {
        self.works.insert(
            id,
            WorkRecord {
                id,
                title: title.to_string(),
                release_date: None,
            },
        );
        for person in cast {
            self.credits
                .entry(EntityId::new(*person))
                .or_default()
                .insert(id);
        }
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn popular_calls(&self) -> usize {
        self.popular_calls.load(Ordering::SeqCst)
    }

    pub fn connection_calls(&self) -> usize {
        self.connection_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> BackendResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(BackendError::Unavailable(
                "mock backend configured as unavailable".to_string(),
            ))
        }
    }
}

#[async_trait]
impl MetadataBackend for MockBackend {
    async fn search_people(&self, query: &str) -> BackendResult<Page<PersonRecord>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let needle = query.to_lowercase();
        let matches = self
            .people
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(Page::single(matches))
    }

    async fn popular_people(&self, page: u32) -> BackendResult<Page<PersonRecord>> {
        self.popular_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let total_pages = self.popular_pages.len() as u32;
        let results = page
            .checked_sub(1)
            .and_then(|i| self.popular_pages.get(i as usize))
            .cloned()
            .unwrap_or_default();
        Ok(Page {
            page,
            total_results: self.popular_pages.iter().map(Vec::len).sum::<usize>() as u64,
            results,
            total_pages,
        })
    }

    async fn works_with_both(&self, a: EntityId, b: EntityId) -> BackendResult<Page<WorkRecord>> {
        self.connection_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let shared = match (self.credits.get(&a), self.credits.get(&b)) {
            (Some(left), Some(right)) => {
                let mut ids: Vec<u64> = left.intersection(right).copied().collect();
                ids.sort_unstable();
                ids.into_iter()
                    .filter_map(|id| self.works.get(&id).cloned())
                    .collect()
            }
            _ => Vec::new(),
        };
        Ok(Page::single(shared))
    }
}

/// Helper to construct a PersonRecord for testing.
pub fn person(id: u64, name: &str, popularity: f64) -> PersonRecord {
    PersonRecord {
        id,
        name: name.to_string(),
        profile_path: None,
        popularity,
    }
}
