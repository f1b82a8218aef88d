//! SQLite-backed [`PageStore`] and [`TermLedger`].
//!
//! Maps each trait operation to SQL against the `pages` and
//! `processed_terms` tables created by [`migrate`](crate::migrate).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use wikiseek_core::models::Page;
use wikiseek_core::store::{PageStore, TermLedger};

/// SQLite implementation of the store traits.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_page(row: &SqliteRow) -> Page {
    let ts: i64 = row.get("last_updated");
    Page {
        url: row.get("url"),
        title: row.get("title"),
        content: row.get("content"),
        language: row.get("language"),
        last_updated: DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default(),
    }
}

#[async_trait]
impl PageStore for SqliteStore {
    async fn upsert_page(&self, page: &Page) -> Result<()> {
        page.validate()?;

        sqlx::query(
            r#"
            INSERT INTO pages (url, title, content, language, last_updated)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                language = excluded.language,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&page.url)
        .bind(&page.title)
        .bind(&page.content)
        .bind(&page.language)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .with_context(|| format!("error inserting or updating page {}", page.url))?;

        Ok(())
    }

    async fn get_page(&self, url: &str) -> Result<Option<Page>> {
        let row = sqlx::query(
            "SELECT url, title, content, language, last_updated FROM pages WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_page))
    }

    async fn list_pages(&self) -> Result<Vec<Page>> {
        let rows = sqlx::query(
            "SELECT url, title, content, language, last_updated FROM pages ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_page).collect())
    }

    async fn count_pages(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn search_content(&self, needle: &str) -> Result<Vec<Page>> {
        // instr() is case-sensitive, unlike LIKE for ASCII.
        let rows = sqlx::query(
            r#"
            SELECT url, title, content, language, last_updated
            FROM pages
            WHERE instr(content, ?) > 0
            ORDER BY rowid
            "#,
        )
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_page).collect())
    }
}

#[async_trait]
impl TermLedger for SqliteStore {
    async fn is_processed(&self, term: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM processed_terms WHERE term = ?)")
                .bind(term)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn mark_processed(&self, term: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO processed_terms (term, processed_at) VALUES (?, ?) ON CONFLICT(term) DO NOTHING",
        )
        .bind(term)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
