//! Ranked pool of prominent people that puzzle endpoints are drawn from

use super::backend::MetadataBackend;
use crate::chain::{Entity, EntityId};
use std::collections::HashSet;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Popularity-ranked people, fetched once
///
/// The first `get` pages through the backend's popular listing; concurrent
/// first callers wait on that single fetch. The result (even an empty one)
/// stays cached until [`RankedPool::invalidate`] is called.
#[derive(Debug)]
pub struct RankedPool {
    cell: OnceCell<Vec<Entity>>,
    target_size: usize,
    max_pages: u32,
}

impl RankedPool {
    pub fn new(target_size: usize, max_pages: u32) -> Self {
        Self {
            cell: OnceCell::new(),
            target_size,
            max_pages,
        }
    }

    /// The pool, populating it on first use
    pub async fn get(&self, backend: &dyn MetadataBackend) -> &[Entity] {
        self.cell
            .get_or_init(|| fetch_ranked(backend, self.target_size, self.max_pages))
            .await
    }

    /// The pool if it has been populated
    pub fn cached(&self) -> Option<&[Entity]> {
        self.cell.get().map(Vec::as_slice)
    }

    /// Drop the cached pool so the next `get` refetches
    pub fn invalidate(&mut self) {
        if self.cell.take().is_some() {
            debug!("ranked pool invalidated");
        }
    }
}

async fn fetch_ranked(backend: &dyn MetadataBackend, target_size: usize, max_pages: u32) -> Vec<Entity> {
    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut pool: Vec<Entity> = Vec::new();
    let mut page = 1;

    while pool.len() < target_size && page <= max_pages {
        let listing = match backend.popular_people(page).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(page, error = %e, "popular listing failed; keeping what we have");
                break;
            }
        };
        debug!(page, received = listing.results.len(), "popular page fetched");

        if listing.results.is_empty() {
            break;
        }
        let last = listing.is_last();
        for record in listing.results {
            if seen.insert(EntityId::new(record.id)) {
                pool.push(Entity::from(record));
            }
        }
        if last {
            break;
        }
        page += 1;
    }

    pool.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    pool.truncate(target_size);
    info!(size = pool.len(), pages = page, "ranked pool ready");
    pool
}
