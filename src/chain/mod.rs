//! Puzzle chain data structures and the engine that drives them

mod engine;
mod entity;
mod slots;
mod state;


pub use engine::{ChainEngine, ChainError, ChainResult, CommitOutcome};
pub use entity::{Entity, EntityId};
pub use slots::Chain;
pub use state::{CommitPlan, GameEvent, GameState, GameStatus, SearchState};
