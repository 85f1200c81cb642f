//! # pn-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `pn-core` domain models.
//!
//! Uniqueness of votes and reports lives in the schema, not in this code:
//! the `UNIQUE (post_id, fingerprint)` constraints are the only arbiter of
//! "already acted", however many duplicate requests race.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pn_core::error::{AppError, Result};
use pn_core::models::{Counter, FeedTab, NewPost, Post, PostCounters, Report, Vote};
use pn_core::traits::PostRepo;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS posts (
        id           BLOB PRIMARY KEY,
        author_proof TEXT NOT NULL,
        content      TEXT NOT NULL,
        parent_id    BLOB REFERENCES posts(id),
        upvotes      INTEGER NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
        downvotes    INTEGER NOT NULL DEFAULT 0 CHECK (downvotes >= 0),
        reports      INTEGER NOT NULL DEFAULT 0 CHECK (reports >= 0),
        created_at   TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_posts_parent ON posts (parent_id, id)",
    "CREATE TABLE IF NOT EXISTS votes (
        id          BLOB PRIMARY KEY,
        post_id     BLOB NOT NULL REFERENCES posts(id),
        fingerprint TEXT NOT NULL,
        vote_kind   TEXT NOT NULL CHECK (vote_kind IN ('up', 'down')),
        created_at  TEXT NOT NULL,
        UNIQUE (post_id, fingerprint)
    )",
    "CREATE TABLE IF NOT EXISTS reports (
        id          BLOB PRIMARY KEY,
        post_id     BLOB NOT NULL REFERENCES posts(id),
        fingerprint TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        UNIQUE (post_id, fingerprint)
    )",
    "CREATE INDEX IF NOT EXISTS idx_posts_top_level ON posts (id) WHERE parent_id IS NULL",
];

const POST_COLUMNS: &str =
    "id, author_proof, content, parent_id, upvotes, downvotes, reports, created_at";

pub struct SqlitePostRepo {
    pool: SqlitePool,
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Result<Uuid> {
    Uuid::from_slice(blob).map_err(|e| AppError::Store(format!("corrupt uuid column: {e}")))
}

fn store_err(err: sqlx::Error) -> AppError {
    AppError::Store(err.to_string())
}

fn constraint_kind(err: &sqlx::Error) -> Option<ErrorKind> {
    match err {
        sqlx::Error::Database(db) => Some(db.kind()),
        _ => None,
    }
}

/// Maps an action insert failure. Unique and FK violations are the only
/// store signals that reach the caller as something other than `Store`.
fn action_insert_err(err: sqlx::Error, what: &str, post_id: Uuid) -> AppError {
    match constraint_kind(&err) {
        Some(ErrorKind::UniqueViolation) => {
            AppError::Conflict(format!("{what} already recorded for post {post_id}"))
        }
        Some(ErrorKind::ForeignKeyViolation) => AppError::NotFound("post".into(), post_id.to_string()),
        _ => store_err(err),
    }
}

fn map_post(row: &SqliteRow) -> Result<Post> {
    let parent: Option<Vec<u8>> = row.try_get("parent_id").map_err(store_err)?;
    Ok(Post {
        id: blob_to_uuid(&row.try_get::<Vec<u8>, _>("id").map_err(store_err)?)?,
        author_proof: row.try_get("author_proof").map_err(store_err)?,
        content: row.try_get("content").map_err(store_err)?,
        parent_id: parent.as_deref().map(blob_to_uuid).transpose()?,
        upvotes: row.try_get("upvotes").map_err(store_err)?,
        downvotes: row.try_get("downvotes").map_err(store_err)?,
        reports: row.try_get("reports").map_err(store_err)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(store_err)?,
    })
}

impl SqlitePostRepo {
    /// Opens (or creates) the database at `url` and bootstraps the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::with_max_connections(url, 5).await
    }

    pub async fn with_max_connections(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to ":memory:" is its own database, so an in-memory
        // store must stay on one connection that never gets recycled.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        log::debug!("sqlite schema ready at {}", url);

        Ok(Self { pool })
    }
}

#[async_trait]
impl PostRepo for SqlitePostRepo {
    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let stored = Post {
            id: Uuid::now_v7(),
            author_proof: post.author_proof,
            content: post.content,
            parent_id: post.parent_id,
            upvotes: 0,
            downvotes: 0,
            reports: 0,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO posts (id, author_proof, content, parent_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(stored.id))
        .bind(&stored.author_proof)
        .bind(&stored.content)
        .bind(stored.parent_id.map(uuid_to_blob))
        .bind(stored.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::ForeignKeyViolation) => {
                AppError::ValidationError("parent post does not exist".into())
            }
            _ => store_err(err),
        })?;

        Ok(stored)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        row.as_ref().map(map_post).transpose()
    }

    async fn list_replies(&self, parent_id: Uuid) -> Result<Vec<Post>> {
        // UUID v7 ids sort by creation time
        sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE parent_id = ? ORDER BY id ASC"
        ))
        .bind(uuid_to_blob(parent_id))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?
        .iter()
        .map(map_post)
        .collect()
    }

    async fn list_top_level(&self, tab: FeedTab, limit: i64) -> Result<Vec<Post>> {
        let order = match tab {
            FeedTab::Stroll => "id DESC",
            FeedTab::Leaderboard => "(upvotes - downvotes) DESC, upvotes DESC, id ASC",
        };
        sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE parent_id IS NULL ORDER BY {order} LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?
        .iter()
        .map(map_post)
        .collect()
    }

    async fn count_top_level(&self) -> Result<i64> {
        sqlx::query("SELECT COUNT(*) AS n FROM posts WHERE parent_id IS NULL")
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get::<i64, _>("n"))
            .map_err(store_err)
    }

    async fn nth_top_level(&self, offset: i64) -> Result<Option<Uuid>> {
        let row = sqlx::query("SELECT id FROM posts WHERE parent_id IS NULL ORDER BY id ASC LIMIT 1 OFFSET ?")
            .bind(offset)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        match row {
            Some(row) => Ok(Some(blob_to_uuid(&row.try_get::<Vec<u8>, _>("id").map_err(store_err)?)?)),
            None => Ok(None),
        }
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<()> {
        sqlx::query("INSERT INTO votes (id, post_id, fingerprint, vote_kind, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(vote.id))
            .bind(uuid_to_blob(vote.post_id))
            .bind(&vote.fingerprint)
            .bind(vote.kind.as_str())
            .bind(vote.created_at)
            .execute(&self.pool)
            .await
            .map_err(|err| action_insert_err(err, "vote", vote.post_id))?;
        Ok(())
    }

    async fn insert_report(&self, report: &Report) -> Result<()> {
        sqlx::query("INSERT INTO reports (id, post_id, fingerprint, created_at) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(report.id))
            .bind(uuid_to_blob(report.post_id))
            .bind(&report.fingerprint)
            .bind(report.created_at)
            .execute(&self.pool)
            .await
            .map_err(|err| action_insert_err(err, "report", report.post_id))?;
        Ok(())
    }

    /// Single-statement increment, so concurrent voters never lose an update.
    async fn increment_counter(&self, post_id: Uuid, counter: Counter) -> Result<PostCounters> {
        let column = counter.column();
        let row = sqlx::query(&format!(
            "UPDATE posts SET {column} = {column} + 1 WHERE id = ? RETURNING upvotes, downvotes, reports"
        ))
        .bind(uuid_to_blob(post_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .ok_or_else(|| AppError::NotFound("post".into(), post_id.to_string()))?;

        Ok(PostCounters {
            post_id,
            upvotes: row.try_get("upvotes").map_err(store_err)?,
            downvotes: row.try_get("downvotes").map_err(store_err)?,
            reports: row.try_get("reports").map_err(store_err)?,
        })
    }
}
