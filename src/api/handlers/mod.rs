pub mod admin;
pub mod auth;
pub mod chirps;
pub mod misc;
pub mod users;
pub mod webhooks;
