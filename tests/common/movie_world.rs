//! A small, fixed movie world served by `MockBackend`
//!
//! Credits:
//! - Toy Story (1): Tom Hanks, Tim Allen
//! - Forrest Gump (2): Tom Hanks, Robin Wright, Gary Sinise
//! - Apollo 13 (3): Tom Hanks, Kevin Bacon, Gary Sinise
//! - Mystic River (4): Kevin Bacon, Sean Penn, Laurence Fishburne
//! - The Matrix (5): Keanu Reeves, Laurence Fishburne
//! - Galaxy Quest (6): Tim Allen, Sigourney Weaver

use castchain::oracle::person;
use castchain::{Chain, ChainEngine, ConnectionOracle, GameConfig, MockBackend};
use std::sync::Arc;

pub const HANKS: u64 = 31;
pub const ALLEN: u64 = 12898;
pub const WRIGHT: u64 = 32;
pub const SINISE: u64 = 33;
pub const BACON: u64 = 4724;
pub const PENN: u64 = 2228;
pub const FISHBURNE: u64 = 2975;
pub const REEVES: u64 = 6384;
pub const WEAVER: u64 = 10205;

/// The backend behind a test world, kept for call-count assertions
pub struct World {
    pub backend: Arc<MockBackend>,
}

fn roster() -> Vec<(u64, &'static str, f64)> {
    vec![
        (HANKS, "Tom Hanks", 90.0),
        (ALLEN, "Tim Allen", 40.0),
        (WRIGHT, "Robin Wright", 45.0),
        (SINISE, "Gary Sinise", 30.0),
        (BACON, "Kevin Bacon", 60.0),
        (PENN, "Sean Penn", 50.0),
        (FISHBURNE, "Laurence Fishburne", 55.0),
        (REEVES, "Keanu Reeves", 85.0),
        (WEAVER, "Sigourney Weaver", 35.0),
    ]
}

/// The world above; everyone is listed as popular, over two pages
pub fn movie_world() -> World {
    let everyone: Vec<u64> = roster().into_iter().map(|(id, _, _)| id).collect();
    movie_world_featuring(&everyone)
}

/// The world above, with only `popular` in the popular listing
///
/// Puzzle endpoints are drawn from the popular listing, so this pins down
/// who a new puzzle can start and end with.
pub fn movie_world_featuring(popular: &[u64]) -> World {
    let mut backend = MockBackend::new();
    let mut first_page = Vec::new();
    let mut second_page = Vec::new();
    for (id, name, popularity) in roster() {
        backend = backend.with_person(person(id, name, popularity));
        if !popular.contains(&id) {
            continue;
        }
        if first_page.len() < 5 {
            first_page.push(person(id, name, popularity));
        } else {
            second_page.push(person(id, name, popularity));
        }
    }
    if !first_page.is_empty() {
        backend = backend.with_popular_page(first_page);
    }
    if !second_page.is_empty() {
        backend = backend.with_popular_page(second_page);
    }

    let backend = backend
        .with_work(1, "Toy Story", &[HANKS, ALLEN])
        .with_work(2, "Forrest Gump", &[HANKS, WRIGHT, SINISE])
        .with_work(3, "Apollo 13", &[HANKS, BACON, SINISE])
        .with_work(4, "Mystic River", &[BACON, PENN, FISHBURNE])
        .with_work(5, "The Matrix", &[REEVES, FISHBURNE])
        .with_work(6, "Galaxy Quest", &[ALLEN, WEAVER]);

    World {
        backend: Arc::new(backend),
    }
}

/// An engine over `world` with seeded endpoint draws
pub fn engine_for(world: &World, config: GameConfig, seed: u64) -> ChainEngine {
    let oracle = ConnectionOracle::with_seed(world.backend.clone(), config.clone(), seed);
    ChainEngine::new(Arc::new(oracle), &config)
}

/// Slot contents as raw ids
pub fn ids(chain: &Chain) -> Vec<Option<u64>> {
    chain
        .slots()
        .iter()
        .map(|slot| slot.as_ref().map(|e| e.id.get()))
        .collect()
}
