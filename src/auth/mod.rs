//! Authentication and authorization core.
//!
//! Credentials come in three shapes: bcrypt password hashes at rest
//! ([`password`]), short-lived signed access tokens on the wire ([`token`]),
//! and long-lived opaque refresh tokens in the store ([`refresh`]). The
//! [`middleware`] chain wires these into the request path and [`privilege`]
//! layers resource-level checks on top.

pub mod context;
pub mod extract;
pub mod middleware;
pub mod password;
pub mod privilege;
pub mod refresh;
pub mod token;
