//! # pn-client
//!
//! Client side of Pigeon Board: the anonymous identity, the local dedup
//! ledgers and the optimistic vote/report controller.

pub mod config;
pub mod controller;
pub mod identity;
pub mod ledger;
pub mod session;
pub mod storage;
pub mod transport;

pub use config::ClientConfig;
pub use controller::{ActionState, PostActions, SkipReason, Submission};
pub use identity::IdentityContext;
pub use session::ClientSession;
pub use storage::{FileStore, LocalStore, MemoryStore};
pub use transport::{ActionReply, BoardTransport, HttpTransport};
