//! Game state and its pure transitions
//!
//! Everything here is synchronous and side-effect free: `GameState::apply`
//! folds an event into the state, and `GameState::plan_commit` works out what
//! a selection needs before it can be written. The async engine calls the
//! oracle between those two steps.

use super::engine::ChainError;
use super::entity::Entity;
use super::slots::Chain;
use crate::oracle::Endpoints;
use serde::{Deserialize, Serialize};

/// Where the puzzle stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    /// Reserved for a move or time budget; no transition produces it.
    Lost,
}

/// Current search box contents and the matches shown for it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchState {
    pub query: String,
    /// Matches for `query`, excluding anyone already in the chain
    pub results: Vec<Entity>,
}

impl SearchState {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.results.is_empty()
    }
}

/// Everything the rendering layer reads
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameState {
    pub status: GameStatus,
    pub chain: Chain,
    /// Slot currently being edited
    pub focus: Option<usize>,
    pub search: SearchState,
    /// Message for the player; the front-end decides when to dismiss it
    pub error: Option<String>,
    /// Bumped each time a new chain replaces the old one
    pub generation: u64,
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A fresh puzzle replaces whatever was there
    PuzzleStarted(Endpoints),
    /// The oracle could not produce a puzzle; the old chain stays
    StartFailed(String),
    Focused(usize),
    FocusCleared,
    /// The search box changed; results are left for `ResultsArrived`
    QueryChanged(String),
    /// Matches for `query`; dropped if the box has moved on
    ResultsArrived { query: String, results: Vec<Entity> },
    /// A validated anchor swap
    AnchorReplaced { index: usize, entity: Entity },
    /// A validated intermediate placement
    SlotFilled { index: usize, entity: Entity },
    Rejected(String),
    ErrorCleared,
}

/// What a selection needs before it can be written
#[derive(Debug, Clone, PartialEq)]
pub enum CommitPlan {
    /// Swap an anchor; nothing to validate
    ReplaceAnchor { index: usize },
    /// Fill an intermediate slot once every `(left, right)` pair is connected
    Fill {
        index: usize,
        checks: Vec<(Entity, Entity)>,
    },
}

impl GameState {
    pub fn apply(mut self, event: GameEvent) -> GameState {
        match event {
            GameEvent::PuzzleStarted(endpoints) => GameState {
                status: GameStatus::Playing,
                chain: Chain::new(endpoints.start, endpoints.target, endpoints.handshakes),
                focus: None,
                search: SearchState::default(),
                error: None,
                generation: self.generation + 1,
            },
            GameEvent::StartFailed(message) => {
                self.error = Some(message);
                self
            }
            GameEvent::Focused(index) => {
                self.focus = Some(index);
                self.search = SearchState::default();
                self
            }
            GameEvent::FocusCleared => {
                self.focus = None;
                self
            }
            GameEvent::QueryChanged(query) => {
                self.search.query = query;
                self
            }
            GameEvent::ResultsArrived { query, results } => {
                if query != self.search.query {
                    return self;
                }
                let chain = &self.chain;
                self.search.results = results
                    .into_iter()
                    .filter(|candidate| !chain.contains(candidate.id))
                    .collect();
                self
            }
            GameEvent::AnchorReplaced { index, entity } => {
                let Some(chain) = self.chain.with_anchor(index, entity) else {
                    return self;
                };
                GameState {
                    status: GameStatus::Playing,
                    chain,
                    focus: None,
                    search: SearchState::default(),
                    error: None,
                    generation: self.generation + 1,
                }
            }
            GameEvent::SlotFilled { index, entity } => {
                if self.chain.contains_elsewhere(entity.id, index)
                    || !self.chain.place(index, entity)
                {
                    return self;
                }
                self.focus = None;
                self.search = SearchState::default();
                self.error = None;
                if self.chain.is_complete() {
                    self.status = GameStatus::Won;
                }
                self
            }
            GameEvent::Rejected(message) => {
                self.error = Some(message);
                self
            }
            GameEvent::ErrorCleared => {
                self.error = None;
                self
            }
        }
    }

    /// Work out what committing `entity` into slot `index` requires
    ///
    /// Rejects positions outside the chain and people who already hold a
    /// slot the commit would keep. Neighbor checks are only listed for filled
    /// neighbors; an empty neighbor is checked later, when it gets filled.
    pub fn plan_commit(&self, index: usize, entity: &Entity) -> Result<CommitPlan, ChainError> {
        let len = self.chain.len();
        if len == 0 {
            return Err(ChainError::NoPuzzle);
        }
        if index >= len {
            return Err(ChainError::SlotOutOfRange { index, len });
        }

        if self.chain.is_anchor(index) {
            let opposite = if index == 0 { len - 1 } else { 0 };
            if self.chain.get(opposite).is_some_and(|e| e.same_as(entity)) {
                return Err(ChainError::AlreadyPlaced(entity.display_name.clone()));
            }
            return Ok(CommitPlan::ReplaceAnchor { index });
        }

        if self.chain.contains_elsewhere(entity.id, index) {
            return Err(ChainError::AlreadyPlaced(entity.display_name.clone()));
        }

        let (left, right) = self.chain.neighbors(index);
        let mut checks = Vec::with_capacity(2);
        if let Some(left) = left {
            checks.push((left.clone(), entity.clone()));
        }
        if let Some(right) = right {
            checks.push((entity.clone(), right.clone()));
        }
        Ok(CommitPlan::Fill { index, checks })
    }
}
