//! # pn-identity
//!
//! SHA-256 implementation of `IdentityProvider`.
//! Handles actor ids, actor proofs, per-action fingerprints and handles.

use pn_core::models::ActionKind;
use pn_core::traits::IdentityProvider;
use sha2::{Digest, Sha256};

const ADJECTIVES: [&str; 8] = ["ghost", "void", "null", "anon", "shade", "echo", "veil", "haze"];

pub struct Sha256IdentityProvider {
    /// Mixed into every action fingerprint so that two deployments never
    /// share fingerprints for the same actor and post id.
    namespace: String,
}

impl Sha256IdentityProvider {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
        }
    }
}

impl Default for Sha256IdentityProvider {
    fn default() -> Self {
        Self::new("pigeon-board")
    }
}

impl IdentityProvider for Sha256IdentityProvider {
    /// 16 random bytes as 32 lowercase hex characters.
    /// Falls back to the empty sentinel if the OS RNG is unavailable.
    fn generate_actor_id(&self) -> String {
        let mut bytes = [0u8; 16];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => hex::encode(bytes),
            Err(_) => String::new(),
        }
    }

    fn actor_proof(&self, actor_id: &str) -> String {
        if actor_id.is_empty() {
            return String::new();
        }
        hex::encode(Sha256::digest(actor_id.as_bytes()))
    }

    /// `sha256(namespace ":" kind ":" actor ":" post)`.
    /// The kind tag keeps vote and report fingerprints apart.
    fn action_fingerprint(&self, actor_id: &str, post_id: &str, kind: ActionKind) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.namespace.as_bytes());
        hasher.update(b":");
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(actor_id.as_bytes());
        hasher.update(b":");
        hasher.update(post_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// First byte picks the adjective, the next two are the suffix.
    fn derive_handle(&self, hash_prefix: &str) -> Option<String> {
        let bytes = hex::decode(hash_prefix.get(..6)?).ok()?;
        let adjective = ADJECTIVES[usize::from(bytes[0]) % ADJECTIVES.len()];
        Some(format!("{}_{}", adjective, hex::encode(&bytes[1..3])))
    }
}
