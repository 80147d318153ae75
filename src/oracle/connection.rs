//! ConnectionOracle: the production [`ChainOracle`] over a metadata backend

use super::backend::MetadataBackend;
use super::pool::RankedPool;
use super::{ChainOracle, Connection, Endpoints, OracleError};
use crate::chain::Entity;
use crate::config::GameConfig;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Handshake count used with the fallback pair
pub const DEFAULT_HANDSHAKES: usize = 2;

/// Picks puzzles, checks co-appearances and searches people
///
/// Backend failures never escape: searches fall back to no matches,
/// connection checks to [`Connection::Unknown`], and endpoint selection to a
/// fixed placeholder pair.
///
/// Endpoints are drawn without checking that a path of the chosen length
/// exists, so a puzzle may have no solution.
pub struct ConnectionOracle {
    backend: Arc<dyn MetadataBackend>,
    pool: RankedPool,
    config: GameConfig,
    rng: Mutex<StdRng>,
}

impl ConnectionOracle {
    /// `config` is expected to have passed [`GameConfig::validate`].
    pub fn new(backend: Arc<dyn MetadataBackend>, config: GameConfig) -> Self {
        Self::with_rng(backend, config, StdRng::from_entropy())
    }

    /// Deterministic draws, for tests and reproducible puzzles
    pub fn with_seed(backend: Arc<dyn MetadataBackend>, config: GameConfig, seed: u64) -> Self {
        Self::with_rng(backend, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(backend: Arc<dyn MetadataBackend>, config: GameConfig, rng: StdRng) -> Self {
        Self {
            pool: RankedPool::new(config.pool_size, config.max_pool_pages),
            backend,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The popularity-ranked endpoint pool, fetched on first use
    pub async fn ranked_pool(&self) -> &[Entity] {
        self.pool.get(self.backend.as_ref()).await
    }

    /// Forget the ranked pool; the next puzzle refetches it
    pub fn invalidate_pool(&mut self) {
        self.pool.invalidate();
    }

    fn fallback(&self) -> Endpoints {
        Endpoints {
            start: Entity::new(1, "Actor 1"),
            target: Entity::new(2, "Actor 2"),
            handshakes: DEFAULT_HANDSHAKES
                .max(self.config.min_handshakes)
                .min(self.config.max_handshakes),
        }
    }
}

#[async_trait]
impl ChainOracle for ConnectionOracle {
    async fn select_endpoints(&self) -> Result<Endpoints, OracleError> {
        self.config
            .validate()
            .map_err(|e| OracleError::NoEndpoints(e.to_string()))?;

        let pool = self.ranked_pool().await;
        if pool.len() < 2 {
            warn!(size = pool.len(), "ranked pool too small; using fallback pair");
            return Ok(self.fallback());
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let start = &pool[rng.gen_range(0..pool.len())];
        let mut target = &pool[rng.gen_range(0..pool.len())];
        // pool ids are distinct, so this terminates
        while target.same_as(start) {
            target = &pool[rng.gen_range(0..pool.len())];
        }
        let handshakes = rng.gen_range(self.config.handshake_range());

        Ok(Endpoints {
            start: start.clone(),
            target: target.clone(),
            handshakes,
        })
    }

    async fn search_entities(&self, query: &str) -> Vec<Entity> {
        if query.trim().chars().count() < self.config.min_query_len {
            return Vec::new();
        }

        match self.backend.search_people(query).await {
            Ok(page) => page.results.into_iter().map(Entity::from).collect(),
            Err(e) => {
                warn!(query = %query, error = %e, "people search failed");
                Vec::new()
            }
        }
    }

    async fn are_connected(&self, a: &Entity, b: &Entity) -> Connection {
        match self.backend.works_with_both(a.id, b.id).await {
            Ok(page) => match page.results.first() {
                Some(work) => {
                    debug!(a = %a, b = %b, via = %work.title, "connected");
                    Connection::Connected
                }
                None => Connection::NotConnected,
            },
            Err(e) => {
                warn!(a = %a.id, b = %b.id, error = %e, "connection lookup failed");
                Connection::Unknown
            }
        }
    }
}

impl std::fmt::Debug for ConnectionOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionOracle")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
