//! Deterministic participant identities.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use scuttle_env::FeedId;
use serde::Serialize;
use std::collections::HashMap;

/// One participant: its signing key and derived feed id.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Position in the participant list (0 is the primary)
    pub index: usize,

    /// Signing key
    key: SigningKey,

    /// `@<base64 public key>.ed25519`
    pub id: FeedId,
}

impl Identity {
    fn new(index: usize, key: SigningKey) -> Self {
        let id = FeedId::new(format!(
            "@{}.ed25519",
            STANDARD.encode(key.verifying_key().as_bytes())
        ));
        Self { index, key, id }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Signs `bytes` and returns `<base64 signature>.sig.ed25519`.
    pub fn sign(&self, bytes: &[u8]) -> String {
        let signature: Signature = self.key.sign(bytes);
        format!("{}.sig.ed25519", STANDARD.encode(signature.to_bytes()))
    }

    /// The secret file body for this identity.
    pub fn secret(&self) -> Secret {
        let public = STANDARD.encode(self.key.verifying_key().as_bytes());
        Secret {
            curve: "ed25519",
            id: self.id.clone(),
            public: format!("{}.ed25519", public),
            private: format!("{}.ed25519", STANDARD.encode(self.key.to_keypair_bytes())),
        }
    }
}

/// Serialized key material, as written to `secret` files.
#[derive(Debug, Clone, Serialize)]
pub struct Secret {
    pub curve: &'static str,
    pub id: FeedId,
    pub public: String,
    pub private: String,
}

/// Provides deterministic Ed25519 identities derived from the run seed.
///
/// Participant `i` is keyed by the UTF-8 bytes of `"{i}{seed}"`, zero-padded
/// or truncated to 32 bytes. Keys therefore do not depend on how many
/// participants a run asks for.
pub struct DeterministicKeyProvider {
    /// Run seed
    seed: String,

    /// Cache of generated identities by participant index
    cache: HashMap<usize, Identity>,
}

impl DeterministicKeyProvider {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            cache: HashMap::new(),
        }
    }

    /// Generates or retrieves the identity of participant `index`.
    pub fn identity(&mut self, index: usize) -> Identity {
        if let Some(identity) = self.cache.get(&index) {
            return identity.clone();
        }

        let material = format!("{}{}", index, self.seed);
        let mut key_seed = [0u8; 32];
        let bytes = material.as_bytes();
        let n = bytes.len().min(key_seed.len());
        key_seed[..n].copy_from_slice(&bytes[..n]);

        let identity = Identity::new(index, SigningKey::from_bytes(&key_seed));
        self.cache.insert(index, identity.clone());
        identity
    }

    /// Generates identities `0..count`.
    pub fn generate(&mut self, count: usize) -> Vec<Identity> {
        (0..count).map(|i| self.identity(i)).collect()
    }
}
