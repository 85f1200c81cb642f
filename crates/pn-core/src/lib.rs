//! pigeon-board/crates/pn-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Pigeon Board.

pub mod content;
pub mod error;
pub mod models;
pub mod numbering;
pub mod traits;
pub mod wire;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_vote_creation_v7() {
        let post_id = Uuid::now_v7();
        let vote = Vote::new(post_id, "ab".repeat(32), VoteKind::Up);
        assert_eq!(vote.post_id, post_id);
        assert_eq!(vote.id.get_version_num(), 7);
        assert_eq!(vote.kind.counter(), Counter::Upvotes);
    }

    #[test]
    fn vote_kind_parsing() {
        assert_eq!("up".parse::<VoteKind>().unwrap(), VoteKind::Up);
        assert_eq!("down".parse::<VoteKind>().unwrap(), VoteKind::Down);
        assert!("sideways".parse::<VoteKind>().is_err());
        assert!("UP".parse::<VoteKind>().is_err());
    }

    #[test]
    fn post_serializes_camel_case() {
        let post = Post {
            id: Uuid::now_v7(),
            author_proof: "cd".repeat(32),
            content: "Hello Rust!".to_string(),
            parent_id: None,
            upvotes: 2,
            downvotes: 0,
            reports: 0,
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["authorProof"], post.author_proof);
        assert!(json["parentId"].is_null());
        assert!(post.is_top_level());
        assert_eq!(post.counters().upvotes, 2);
    }
}
