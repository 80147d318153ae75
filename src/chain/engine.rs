//! ChainEngine: the puzzle state machine wired to a connection oracle

use super::entity::Entity;
use super::slots::Chain;
use super::state::{CommitPlan, GameEvent, GameState, GameStatus};
use crate::config::{GameConfig, MIN_HANDSHAKES};
use crate::oracle::{ChainOracle, Connection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Message shown when a puzzle cannot be started
pub const START_FAILED_MESSAGE: &str = "Failed to start game";

/// Errors that can occur in engine operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Failed to start game: {0}")]
    StartupFailure(String),

    #[error("No connection found between {from} and {to}.")]
    NotConnected { from: String, to: String },

    #[error("Could not verify a connection between {from} and {to}.")]
    ConnectionUnknown { from: String, to: String },

    #[error("{0} is already in the chain.")]
    AlreadyPlaced(String),

    #[error("Slot {index} is outside a chain of {len} slots")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("No puzzle in progress")]
    NoPuzzle,

    #[error("Another move is still being checked")]
    Busy,
}

/// Result type for engine operations
pub type ChainResult<T> = Result<T, ChainError>;

/// What a `commit_selection` call ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was focused
    NoFocus,
    /// Validation finished after focus moved or the chain was replaced; nothing written
    Stale,
    AnchorReplaced,
    Placed,
    /// Placed, and the chain is now complete
    Won,
}

/// Identifies the slot and chain a commit was issued against
#[derive(Debug, Clone, Copy)]
struct CommitTicket {
    index: usize,
    generation: u64,
}

impl CommitTicket {
    fn is_current(&self, state: &GameState) -> bool {
        state.focus == Some(self.index) && state.generation == self.generation
    }
}

/// Held while a commit or puzzle start is in flight
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The puzzle engine
///
/// Owns the game state and asks the oracle for puzzles, searches and
/// connection checks. All operations take `&self`; the state lock is never
/// held across an oracle call, so focus changes and searches stay responsive
/// while a commit is being validated. Commits and puzzle starts are
/// serialized: a second one issued while the first is in flight is refused
/// with [`ChainError::Busy`].
pub struct ChainEngine {
    oracle: Arc<dyn ChainOracle>,
    state: Mutex<GameState>,
    busy: AtomicBool,
    min_query_len: usize,
}

impl ChainEngine {
    /// Create an engine with no puzzle yet
    pub fn new(oracle: Arc<dyn ChainOracle>, config: &GameConfig) -> Self {
        Self {
            oracle,
            state: Mutex::new(GameState::default()),
            busy: AtomicBool::new(false),
            min_query_len: config.min_query_len,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, event: GameEvent) {
        let mut state = self.lock();
        let current = std::mem::take(&mut *state);
        *state = current.apply(event);
    }

    fn try_acquire(&self) -> ChainResult<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(&self.busy))
            .map_err(|_| ChainError::Busy)
    }

    // === Reads ===

    /// Copy of the whole state
    pub fn snapshot(&self) -> GameState {
        self.lock().clone()
    }

    pub fn status(&self) -> GameStatus {
        self.lock().status
    }

    pub fn chain(&self) -> Chain {
        self.lock().chain.clone()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.lock().focus
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn search_query(&self) -> String {
        self.lock().search.query.clone()
    }

    pub fn search_results(&self) -> Vec<Entity> {
        self.lock().search.results.clone()
    }

    /// Whether a commit or puzzle start is waiting on the oracle
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    // === Operations ===

    /// Ask the oracle for a new puzzle and seed a fresh chain
    ///
    /// On failure the error message is set and the previous chain is kept.
    pub async fn start_new_puzzle(&self) -> ChainResult<()> {
        let _guard = self.try_acquire()?;

        let endpoints = match self.oracle.select_endpoints().await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!(error = %e, "oracle could not select endpoints");
                self.dispatch(GameEvent::StartFailed(START_FAILED_MESSAGE.to_string()));
                return Err(ChainError::StartupFailure(e.to_string()));
            }
        };

        if endpoints.handshakes < MIN_HANDSHAKES || endpoints.start.same_as(&endpoints.target) {
            warn!(
                start = %endpoints.start.id,
                target = %endpoints.target.id,
                handshakes = endpoints.handshakes,
                "oracle returned an unusable puzzle"
            );
            self.dispatch(GameEvent::StartFailed(START_FAILED_MESSAGE.to_string()));
            return Err(ChainError::StartupFailure(
                "unusable endpoints".to_string(),
            ));
        }

        info!(
            start = %endpoints.start,
            target = %endpoints.target,
            handshakes = endpoints.handshakes,
            "starting puzzle"
        );
        self.dispatch(GameEvent::PuzzleStarted(endpoints));
        Ok(())
    }

    /// Mark a slot as being edited; clears the search box
    pub fn focus_slot(&self, index: usize) {
        self.dispatch(GameEvent::Focused(index));
    }

    pub fn clear_focus(&self) {
        self.dispatch(GameEvent::FocusCleared);
    }

    /// Dismiss the current error message
    pub fn clear_error(&self) {
        self.dispatch(GameEvent::ErrorCleared);
    }

    /// Update the search box and, for long enough queries, fetch matches
    ///
    /// Matches already in the chain are filtered out. If the query changes
    /// again before the oracle answers, the answer is dropped.
    pub async fn set_search_query(&self, text: &str) {
        self.dispatch(GameEvent::QueryChanged(text.to_string()));

        if text.chars().count() < self.min_query_len {
            self.dispatch(GameEvent::ResultsArrived {
                query: text.to_string(),
                results: Vec::new(),
            });
            return;
        }

        let results = self.oracle.search_entities(text).await;
        debug!(query = %text, matches = results.len(), "search results");
        self.dispatch(GameEvent::ResultsArrived {
            query: text.to_string(),
            results,
        });
    }

    /// Put `entity` into the focused slot
    ///
    /// Anchors are swapped immediately and reset the chain. Intermediate slots
    /// are written only if the entity is connected to each filled neighbor; a
    /// failed check sets the error message and leaves the chain untouched.
    pub async fn commit_selection(&self, entity: Entity) -> ChainResult<CommitOutcome> {
        let _guard = self.try_acquire()?;

        let planned = {
            let state = self.lock();
            state.focus.map(|index| {
                let ticket = CommitTicket {
                    index,
                    generation: state.generation,
                };
                (ticket, state.plan_commit(index, &entity))
            })
        };

        let Some((ticket, plan)) = planned else {
            return Ok(CommitOutcome::NoFocus);
        };

        let checks = match plan {
            Ok(CommitPlan::ReplaceAnchor { index }) => {
                debug!(index, entity = %entity, "replacing anchor");
                self.dispatch(GameEvent::AnchorReplaced { index, entity });
                return Ok(CommitOutcome::AnchorReplaced);
            }
            Ok(CommitPlan::Fill { checks, .. }) => checks,
            Err(e) => return Err(self.reject(e)),
        };

        self.dispatch(GameEvent::ErrorCleared);

        for (left, right) in &checks {
            let verdict = self.oracle.are_connected(left, right).await;
            let failure = match verdict {
                Connection::Connected => continue,
                Connection::NotConnected => ChainError::NotConnected {
                    from: left.display_name.clone(),
                    to: right.display_name.clone(),
                },
                Connection::Unknown => ChainError::ConnectionUnknown {
                    from: left.display_name.clone(),
                    to: right.display_name.clone(),
                },
            };
            let still_current = ticket.is_current(&self.lock());
            if !still_current {
                debug!(index = ticket.index, "discarding stale rejection");
                return Ok(CommitOutcome::Stale);
            }
            return Err(self.reject(failure));
        }

        let mut state = self.lock();
        if !ticket.is_current(&state) {
            debug!(index = ticket.index, entity = %entity, "discarding stale commit");
            return Ok(CommitOutcome::Stale);
        }
        let current = std::mem::take(&mut *state);
        *state = current.apply(GameEvent::SlotFilled {
            index: ticket.index,
            entity,
        });

        if state.status == GameStatus::Won {
            info!(handshakes = state.chain.handshakes(), "chain complete");
            Ok(CommitOutcome::Won)
        } else {
            Ok(CommitOutcome::Placed)
        }
    }

    fn reject(&self, error: ChainError) -> ChainError {
        debug!(error = %error, "selection rejected");
        self.dispatch(GameEvent::Rejected(error.to_string()));
        error
    }
}

impl std::fmt::Debug for ChainEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEngine")
            .field("state", &*self.lock())
            .field("busy", &self.is_busy())
            .finish()
    }
}
