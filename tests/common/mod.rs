//! Common test utilities for castchain integration tests
//!
//! Builds a small in-memory movie world and wires the engine to it.

pub mod movie_world;

pub use movie_world::{engine_for, ids, movie_world, movie_world_featuring};
