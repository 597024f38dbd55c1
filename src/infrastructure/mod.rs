//! # Infrastructure Layer
//!
//! Adapters connecting the application to the outside world.
//!
//! Currently this is the persistence boundary: repository ports plus
//! in-memory implementations for tests and the default wiring.

pub mod persistence;
