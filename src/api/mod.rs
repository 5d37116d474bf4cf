//! HTTP surface: request/response types in `models`, endpoint
//! implementations in `handlers`.

pub mod handlers;
pub mod models;
