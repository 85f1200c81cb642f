//! The client's anonymous identity, resolved once at startup.

use std::fmt;
use std::sync::Arc;

use pn_core::models::ActionKind;
use pn_core::traits::IdentityProvider;

use crate::storage::{LocalStore, ACTOR_KEY};

/// Created once per client session and read-only afterwards.
///
/// When local storage is unusable the context is *uninitialized*: every
/// accessor returns the empty string and callers must not act on it.
pub struct IdentityContext {
    actor_id: String,
    proof: String,
    handle: Option<String>,
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityContext {
    /// Loads the stored actor id, generating and persisting one on first run.
    pub fn init(store: &dyn LocalStore, provider: Arc<dyn IdentityProvider>) -> Self {
        let actor_id = match store.get(ACTOR_KEY) {
            Ok(Some(existing)) if !existing.is_empty() => existing,
            Ok(_) => {
                let fresh = provider.generate_actor_id();
                match store.set(ACTOR_KEY, &fresh) {
                    Ok(()) => {
                        log::info!("generated new anonymous actor");
                        fresh
                    }
                    Err(err) => {
                        log::warn!("could not persist actor id: {err:#}");
                        String::new()
                    }
                }
            }
            Err(err) => {
                log::warn!("local storage unavailable, identity not initialized: {err:#}");
                String::new()
            }
        };

        let proof = provider.actor_proof(&actor_id);
        let handle = provider.derive_handle(&proof);
        Self {
            actor_id,
            proof,
            handle,
            provider,
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.actor_id.is_empty()
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// SHA-256 of the actor id; what the server stores as a post's author.
    pub fn actor_proof(&self) -> &str {
        &self.proof
    }

    pub fn handle(&self) -> &str {
        self.handle.as_deref().unwrap_or_default()
    }

    pub fn fingerprint(&self, post_id: &str, kind: ActionKind) -> String {
        if !self.is_initialized() {
            return String::new();
        }
        self.provider.action_fingerprint(&self.actor_id, post_id, kind)
    }
}

// Keeps the raw actor id out of logs
impl fmt::Debug for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityContext")
            .field("handle", &self.handle)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
