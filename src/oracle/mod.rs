//! Connection oracle: puzzle selection, co-appearance checks and people search
//!
//! The engine talks to the oracle through [`ChainOracle`]. [`ConnectionOracle`]
//! implements it on top of a [`MetadataBackend`]; backend failures are absorbed
//! here and never reach the engine as errors.

mod backend;
mod connection;
mod pool;
mod tmdb;

pub use backend::{
    person, BackendError, BackendResult, MetadataBackend, MockBackend, Page, PersonRecord,
    WorkRecord,
};
pub use connection::{ConnectionOracle, DEFAULT_HANDSHAKES};
pub use pool::RankedPool;
pub use tmdb::TmdbBackend;

use crate::chain::Entity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A puzzle: who to start from, who to reach, and in how many connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub start: Entity,
    pub target: Entity,
    pub handshakes: usize,
}

/// Answer to "do these two share a credit?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Connected,
    NotConnected,
    /// The backend could not be asked; callers treat this as not connected
    Unknown,
}

impl Connection {
    pub fn is_connected(self) -> bool {
        matches!(self, Connection::Connected)
    }
}

/// Errors an oracle may report to the engine
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no endpoints available: {0}")]
    NoEndpoints(String),
}

/// What the engine needs from the outside world.
///
/// Implementations absorb transport failures: searches degrade to no matches
/// and connection checks to [`Connection::Unknown`].
#[async_trait]
pub trait ChainOracle: Send + Sync {
    /// Pick a start, a distinct target and a handshake count.
    async fn select_endpoints(&self) -> Result<Endpoints, OracleError>;

    /// People whose name matches `query`.
    async fn search_entities(&self, query: &str) -> Vec<Entity>;

    /// Whether `a` and `b` are credited on at least one shared work.
    async fn are_connected(&self, a: &Entity, b: &Entity) -> Connection;
}
