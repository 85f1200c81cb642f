//! # Domain Models
//!
//! These structs represent the core entities of Pigeon Board.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// The fundamental unit of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    /// SHA-256 of the author's actor id. Written once, never updated.
    pub author_proof: String,
    /// Already sanitized (see [`crate::content::sanitize_content`])
    pub content: String,
    /// `None` for top-level posts
    pub parent_id: Option<Uuid>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub reports: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn counters(&self) -> PostCounters {
        PostCounters {
            post_id: self.id,
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            reports: self.reports,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A post that has passed validation but has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_proof: String,
    pub content: String,
    pub parent_id: Option<Uuid>,
}

/// Snapshot of a post's aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCounters {
    pub post_id: Uuid,
    pub upvotes: i64,
    pub downvotes: i64,
    pub reports: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Up => "up",
            VoteKind::Down => "down",
        }
    }

    /// The counter this vote increments.
    pub fn counter(self) -> Counter {
        match self {
            VoteKind::Up => Counter::Upvotes,
            VoteKind::Down => Counter::Downvotes,
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteKind::Up),
            "down" => Ok(VoteKind::Down),
            _ => Err(AppError::ValidationError(
                "vote kind must be up or down".into(),
            )),
        }
    }
}

/// The per-post aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Upvotes,
    Downvotes,
    Reports,
}

impl Counter {
    /// Column name in the store. Static so it can be spliced into SQL.
    pub fn column(self) -> &'static str {
        match self {
            Counter::Upvotes => "upvotes",
            Counter::Downvotes => "downvotes",
            Counter::Reports => "reports",
        }
    }
}

/// Kinds of deduplicated actions an actor can take on a post.
///
/// Each kind has its own fingerprint salt and its own uniqueness dimension,
/// so a report never blocks a vote and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Vote,
    Report,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Vote => "vote",
            ActionKind::Report => "report",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single vote. Insert-only: never switched or retracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub post_id: Uuid,
    pub fingerprint: String,
    pub kind: VoteKind,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(post_id: Uuid, fingerprint: String, kind: VoteKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            fingerprint,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// A single report. Insert-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub post_id: Uuid,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(post_id: Uuid, fingerprint: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            fingerprint,
            created_at: Utc::now(),
        }
    }
}

/// Which ordering a feed listing uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedTab {
    /// Newest top-level posts first
    #[default]
    Stroll,
    /// Highest net score first
    Leaderboard,
}
