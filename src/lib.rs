//! castchain: Actor-Connection Puzzle Engine
//!
//! Connect a start performer to a target performer through a fixed number of
//! shared screen credits. The player fills the intermediate slots in any order;
//! every placement is checked against its filled neighbors at the moment it is
//! made, so a fully filled chain is valid end to end.
//!
//! # Core Concepts
//!
//! - **Entities**: people fetched from the metadata backend
//! - **Chain**: the ordered slots between the start and target anchors
//! - **Oracle**: picks puzzles, answers "did these two work together?" and
//!   searches people by name
//!
//! # Example
//!
//! ```
//! use castchain::{ChainEngine, ConnectionOracle, GameConfig, MockBackend};
//! use std::sync::Arc;
//!
//! let config = GameConfig::default();
//! let oracle = ConnectionOracle::new(Arc::new(MockBackend::new()), config.clone());
//! let engine = ChainEngine::new(Arc::new(oracle), &config);
//! assert!(engine.chain().is_empty());
//! ```

mod chain;
pub mod config;
pub mod oracle;

pub use chain::{
    Chain, ChainEngine, ChainError, ChainResult, CommitOutcome, CommitPlan, Entity, EntityId,
    GameEvent, GameState, GameStatus, SearchState,
};
pub use config::{BackendConfig, ConfigError, GameConfig};
pub use oracle::{
    BackendError, BackendResult, ChainOracle, Connection, ConnectionOracle, Endpoints,
    MetadataBackend, MockBackend, OracleError, TmdbBackend,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
