//! Postgres-backed [`SearchStore`].

use std::collections::HashSet;

use async_trait::async_trait;
use leadgen_core::{SearchStore, StoreError};
use sqlx::PgPool;

use crate::{searches, DbError};

/// [`SearchStore`] over the `searches` table.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct PgSearchStore {
    pool: PgPool,
}

impl PgSearchStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn unavailable(err: DbError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl SearchStore for PgSearchStore {
    async fn exists_any(&self, searches: &[String]) -> Result<HashSet<String>, StoreError> {
        searches::existing_searches(&self.pool, searches)
            .await
            .map_err(unavailable)
    }

    async fn upsert_ignore_conflict(&self, searches: &[String]) -> Result<u64, StoreError> {
        searches::insert_searches_ignore_conflict(&self.pool, searches)
            .await
            .map_err(unavailable)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        searches::count_searches(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn count_unused(&self) -> Result<i64, StoreError> {
        searches::count_unused_searches(&self.pool)
            .await
            .map_err(unavailable)
    }
}
