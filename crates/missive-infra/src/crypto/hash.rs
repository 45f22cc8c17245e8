//! SHA-256 digests for API key verification.
//!
//! Configured keys are hashed once at startup; presented keys are hashed and
//! compared digest-to-digest so plaintext keys are not retained in memory
//! longer than config loading.

use sha2::{Digest, Sha256};

/// The set of accepted API keys, stored as SHA-256 digests.
#[derive(Debug, Clone, Default)]
pub struct ApiKeySet {
    digests: Vec<[u8; 32]>,
}

impl ApiKeySet {
    /// Hash every non-blank configured key.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let digests = keys
            .into_iter()
            .filter(|k| !k.as_ref().trim().is_empty())
            .map(|k| Sha256::digest(k.as_ref().trim().as_bytes()).into())
            .collect();
        Self { digests }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Whether `presented` hashes to one of the configured digests.
    pub fn verify(&self, presented: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        self.digests
            .iter()
            .fold(false, |found, digest| found | digests_equal(digest, &candidate))
    }
}

/// Compare without short-circuiting on the first differing byte.
fn digests_equal(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
