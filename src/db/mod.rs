//! Persistence layer.
//!
//! `handlers` holds the store traits and their PostgreSQL implementations,
//! `memory` the in-process implementations used by tests and dev mode, and
//! `models` the row types shared between them.

pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
