//! Database operations for the `searches` table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use leadgen_core::canonicalize;
use sqlx::PgPool;

use crate::DbError;

/// Default batch handed to the scraping job per run.
pub const DEFAULT_UNUSED_LIMIT: i64 = 1000;

/// A row from the `searches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchRow {
    pub id: i64,
    pub search: String,
    pub used: bool,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

/// Return the subset of `searches` already present, in a single query.
///
/// Inputs are matched as given; callers pass canonical strings.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn existing_searches(
    pool: &PgPool,
    searches: &[String],
) -> Result<HashSet<String>, DbError> {
    if searches.is_empty() {
        return Ok(HashSet::new());
    }

    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT search FROM searches \
         WHERE search = ANY($1::text[])",
    )
    .bind(searches)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Insert `searches`, silently skipping any that already exist.
///
/// Uses a single `INSERT … SELECT * FROM UNNEST(…) ON CONFLICT DO NOTHING`
/// so the batch is one round-trip and concurrent writers with overlapping
/// batches never fail or duplicate a row. Returns the number of rows that
/// were actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_searches_ignore_conflict(
    pool: &PgPool,
    searches: &[String],
) -> Result<u64, DbError> {
    if searches.is_empty() {
        return Ok(0);
    }

    let rows_affected = sqlx::query(
        "INSERT INTO searches (search) \
         SELECT * FROM UNNEST($1::text[]) \
         ON CONFLICT (search) DO NOTHING",
    )
    .bind(searches)
    .execute(pool)
    .await?
    .rows_affected();

    tracing::debug!(
        attempted = searches.len(),
        inserted = rows_affected,
        "inserted searches"
    );
    Ok(rows_affected)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_searches(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM searches")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Count searches the scraping job has not consumed yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_unused_searches(pool: &PgPool) -> Result<i64, DbError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM searches WHERE used = FALSE")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// List up to `limit` unused searches, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unused_searches(pool: &PgPool, limit: i64) -> Result<Vec<SearchRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchRow>(
        "SELECT id, search, used, created_at, used_at \
         FROM searches \
         WHERE used = FALSE \
         ORDER BY id ASC \
         LIMIT $1",
    )
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Flag a search as consumed by the scraping job.
///
/// The input is canonicalized before matching. Returns `false` when no unused
/// row matched (unknown search, or already used).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn mark_search_used(pool: &PgPool, search: &str) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "UPDATE searches \
         SET used = TRUE, used_at = NOW() \
         WHERE search = $1 \
           AND used = FALSE",
    )
    .bind(canonicalize(search))
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}
