//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ActionKind, Counter, FeedTab, NewPost, Post, PostCounters, Report, Vote};

/// Data persistence contract for posts, votes and reports.
///
/// Implementations must enforce uniqueness of (post, fingerprint) for votes
/// and, separately, for reports, returning [`crate::AppError::Conflict`] on a
/// duplicate. Counter updates must be atomic in the store, never
/// read-then-write.
#[async_trait]
pub trait PostRepo: Send + Sync {
    // Post Operations
    async fn create_post(&self, post: NewPost) -> Result<Post>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;
    /// Direct replies, oldest first.
    async fn list_replies(&self, parent_id: Uuid) -> Result<Vec<Post>>;
    async fn list_top_level(&self, tab: FeedTab, limit: i64) -> Result<Vec<Post>>;
    async fn count_top_level(&self) -> Result<i64>;
    /// Id of the top-level post at `offset` in creation order (0-based).
    async fn nth_top_level(&self, offset: i64) -> Result<Option<Uuid>>;

    // Action Operations
    async fn insert_vote(&self, vote: &Vote) -> Result<()>;
    async fn insert_report(&self, report: &Report) -> Result<()>;
    /// Adds one to `counter` and returns the counters after the update.
    async fn increment_counter(&self, post_id: Uuid, counter: Counter) -> Result<PostCounters>;
}

/// Anonymous identity contract.
pub trait IdentityProvider: Send + Sync {
    /// A fresh random 128-bit actor id.
    fn generate_actor_id(&self) -> String;

    /// One-way hash of the actor id, sent when authoring posts.
    fn actor_proof(&self, actor_id: &str) -> String;

    /// Per-(actor, post, kind) dedup token. Vote and report fingerprints
    /// for the same actor and post never coincide.
    fn action_fingerprint(&self, actor_id: &str, post_id: &str, kind: ActionKind) -> String;

    /// Cosmetic handle such as `shade_9f0c`. Collisions are fine.
    fn derive_handle(&self, hash_prefix: &str) -> Option<String>;
}

/// Sink for counter changes, consumed by realtime subscribers.
pub trait CounterFeed: Send + Sync {
    fn publish(&self, update: PostCounters);
}
