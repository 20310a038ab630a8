//! Signing key set and its concurrently-read cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("key set request failed: {0}")]
    Fetch(String),

    #[error("key set response is not a JWK set: {0}")]
    Decode(String),

    #[error("key set contains no usable signing keys")]
    NoUsableKeys,
}

/// A public key together with the only algorithm it may verify.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    key: DecodingKey,
}

impl SigningKey {
    #[must_use]
    pub fn new(algorithm: Algorithm, key: DecodingKey) -> Self {
        Self { algorithm, key }
    }

    /// Build a verification key from a published JWK.
    ///
    /// Returns `None` for encryption keys, symmetric keys, and algorithms the
    /// verifier does not support.
    #[must_use]
    pub fn from_jwk(jwk: &Jwk) -> Option<Self> {
        if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
            return None;
        }
        let algorithm = jwk_algorithm(jwk)?;
        let key = DecodingKey::from_jwk(jwk).ok()?;
        Some(Self { algorithm, key })
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn jwk_algorithm(jwk: &Jwk) -> Option<Algorithm> {
    if let Some(declared) = &jwk.common.key_algorithm {
        return match declared {
            KeyAlgorithm::ES256 => Some(Algorithm::ES256),
            KeyAlgorithm::ES384 => Some(Algorithm::ES384),
            KeyAlgorithm::RS256 => Some(Algorithm::RS256),
            KeyAlgorithm::RS384 => Some(Algorithm::RS384),
            KeyAlgorithm::RS512 => Some(Algorithm::RS512),
            KeyAlgorithm::PS256 => Some(Algorithm::PS256),
            KeyAlgorithm::PS384 => Some(Algorithm::PS384),
            KeyAlgorithm::PS512 => Some(Algorithm::PS512),
            _ => None,
        };
    }

    match &jwk.algorithm {
        AlgorithmParameters::EllipticCurve(params) => match &params.curve {
            EllipticCurve::P256 => Some(Algorithm::ES256),
            EllipticCurve::P384 => Some(Algorithm::ES384),
            _ => None,
        },
        AlgorithmParameters::RSA(_) => Some(Algorithm::RS256),
        _ => None,
    }
}

/// Signing keys of the issuer, indexed by key id.
#[derive(Debug, Clone)]
pub struct SigningKeySet {
    keys: HashMap<String, SigningKey>,
    fetched_at: Instant,
}

impl SigningKeySet {
    /// Build a key set from a published JWK set.
    ///
    /// Keys without a `kid` or with an unsupported algorithm are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`KeySetError::NoUsableKeys`] if nothing usable remains.
    pub fn from_jwk_set(set: &JwkSet) -> Result<Self, KeySetError> {
        let mut keys = HashMap::with_capacity(set.keys.len());
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                tracing::debug!("Skipping signing key without key id");
                continue;
            };
            match SigningKey::from_jwk(jwk) {
                Some(key) => {
                    keys.insert(kid.to_owned(), key);
                }
                None => tracing::debug!(kid, "Skipping unsupported signing key"),
            }
        }

        if keys.is_empty() {
            return Err(KeySetError::NoUsableKeys);
        }
        Ok(Self::from_keys(keys))
    }

    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = (String, SigningKey)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            fetched_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn get(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.get(kid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Time since the set was fetched.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Last known good signing key set.
///
/// Readers call [`SigningKeyCache::current`], a lock-free load that never
/// waits for a refresh in progress. The [`KeyRefresher`](super::KeyRefresher)
/// is the only writer.
#[derive(Debug, Default)]
pub struct SigningKeyCache {
    current: ArcSwapOption<SigningKeySet>,
    refresh_hint: Notify,
}

impl SigningKeyCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with `set`.
    #[must_use]
    pub fn with_key_set(set: SigningKeySet) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(set),
            refresh_hint: Notify::new(),
        }
    }

    /// The current key set, `None` until the first successful fetch.
    #[must_use]
    pub fn current(&self) -> Option<Arc<SigningKeySet>> {
        self.current.load_full()
    }

    /// Replace the key set.
    pub fn replace(&self, set: SigningKeySet) {
        self.current.store(Some(Arc::new(set)));
    }

    /// Ask the refresher to fetch keys early, e.g. after an unknown key id.
    pub fn request_refresh(&self) {
        self.refresh_hint.notify_one();
    }

    /// Resolves once a refresh has been requested.
    pub async fn refresh_requested(&self) {
        self.refresh_hint.notified().await;
    }
}
