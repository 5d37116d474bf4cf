pub mod chirps;
pub mod refresh_tokens;
pub mod users;

pub use chirps::{ChirpStore, PgChirps};
pub use refresh_tokens::{PgRefreshTokens, RefreshTokenStore};
pub use users::{PgUsers, UserStore};
