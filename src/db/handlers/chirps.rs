//! Chirp repository: trait contract plus the PostgreSQL implementation.

use sqlx::PgPool;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::chirps::{Chirp, ChirpCreateDBRequest, ChirpFilter, SortOrder},
    },
    types::ChirpId,
};

#[async_trait::async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create(&self, request: &ChirpCreateDBRequest) -> Result<Chirp>;

    async fn get_by_id(&self, id: ChirpId) -> Result<Option<Chirp>>;

    async fn list(&self, filter: &ChirpFilter) -> Result<Vec<Chirp>>;

    /// Returns false when the chirp does not exist.
    async fn delete(&self, id: ChirpId) -> Result<bool>;
}

#[derive(Clone, Debug)]
pub struct PgChirps {
    pool: PgPool,
}

impl PgChirps {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHIRP_COLUMNS: &str = "id, body, user_id, created_at, updated_at";

#[async_trait::async_trait]
impl ChirpStore for PgChirps {
    #[instrument(skip(self, request), err)]
    async fn create(&self, request: &ChirpCreateDBRequest) -> Result<Chirp> {
        let chirp = sqlx::query_as::<_, Chirp>(&format!(
            "INSERT INTO chirps (body, user_id) VALUES ($1, $2) RETURNING {CHIRP_COLUMNS}"
        ))
        .bind(&request.body)
        .bind(request.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&self, id: ChirpId) -> Result<Option<Chirp>> {
        let chirp = sqlx::query_as::<_, Chirp>(&format!("SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(chirp)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&self, filter: &ChirpFilter) -> Result<Vec<Chirp>> {
        let mut query = format!("SELECT {CHIRP_COLUMNS} FROM chirps");

        if filter.author_id.is_some() {
            query.push_str(" WHERE user_id = $1");
        }

        query.push_str(match filter.sort {
            SortOrder::Asc => " ORDER BY created_at ASC",
            SortOrder::Desc => " ORDER BY created_at DESC",
        });

        let mut q = sqlx::query_as::<_, Chirp>(&query);
        if let Some(author_id) = filter.author_id {
            q = q.bind(author_id);
        }

        Ok(q.fetch_all(&self.pool).await?)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: ChirpId) -> Result<bool> {
        let done = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(done.rows_affected() > 0)
    }
}
