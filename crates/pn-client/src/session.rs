use std::sync::Arc;
use std::time::Duration;

use pn_core::content::sanitize_content;
use pn_core::error::{AppError, Result};
use pn_core::models::{ActionKind, Post};
use pn_core::numbering::parse_post_number;
use pn_core::traits::IdentityProvider;
use pn_core::wire::{ByNumberResponse, CreatePostRequest, ThreadResponse};
use pn_identity::Sha256IdentityProvider;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::controller::PostActions;
use crate::identity::IdentityContext;
use crate::ledger::DedupLedger;
use crate::storage::LocalStore;
use crate::transport::{BoardTransport, HttpTransport};

/// Everything one client needs: its identity, its ledgers and a transport.
pub struct ClientSession {
    identity: Arc<IdentityContext>,
    votes: DedupLedger,
    reports: DedupLedger,
    transport: Arc<dyn BoardTransport>,
    timeout: Duration,
}

impl ClientSession {
    pub fn new(
        store: Arc<dyn LocalStore>,
        provider: Arc<dyn IdentityProvider>,
        transport: Arc<dyn BoardTransport>,
        timeout: Duration,
    ) -> Self {
        let identity = Arc::new(IdentityContext::init(store.as_ref(), provider));
        log::debug!("client session ready: {identity:?}");
        Self {
            identity,
            votes: DedupLedger::new(Arc::clone(&store), ActionKind::Vote),
            reports: DedupLedger::new(store, ActionKind::Report),
            transport,
            timeout,
        }
    }

    /// HTTP session against `config.base_url`.
    pub fn connect(config: &ClientConfig, store: Arc<dyn LocalStore>) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            store,
            Arc::new(Sha256IdentityProvider::new(&config.namespace)),
            Arc::new(transport),
            config.request_timeout,
        ))
    }

    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// Vote/report controller for one post, seeded with its current counters.
    pub fn actions_for(&self, post: &Post) -> PostActions {
        PostActions::new(
            post,
            Arc::clone(&self.identity),
            self.votes.clone(),
            self.reports.clone(),
            Arc::clone(&self.transport),
            self.timeout,
        )
    }

    /// Publishes a post or, with `parent`, a reply.
    ///
    /// Content is checked locally first so an empty post never costs a
    /// request; the server sanitizes again either way.
    pub async fn compose(&self, content: &str, parent: Option<Uuid>) -> Result<Post> {
        if !self.identity.is_initialized() {
            return Err(AppError::ValidationError(
                "anonymous identity is not initialized".into(),
            ));
        }
        sanitize_content(content)?;

        let request = CreatePostRequest {
            content: Some(content.to_string()),
            parent_id: parent.map(|id| id.to_string()),
            actor_proof: Some(self.identity.actor_proof().to_string()),
        };
        let post = self.transport.create_post(&request).await?;
        log::info!("published post {}", post.id);
        Ok(post)
    }

    /// Resolves `#A1`, `A1` or a plain ordinal to a post id.
    pub async fn lookup(&self, number: &str) -> Result<ByNumberResponse> {
        if parse_post_number(number).is_none() {
            return Err(AppError::ValidationError(format!(
                "{number:?} is not a post number"
            )));
        }
        self.transport.post_by_number(number.trim()).await
    }

    pub async fn open_thread(&self, id: Uuid) -> Result<ThreadResponse> {
        self.transport.thread(id).await
    }
}
