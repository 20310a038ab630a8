//! Signing-key retrieval and caching.

pub mod keys;
pub mod refresher;
pub mod source;

pub use keys::{KeySetError, SigningKey, SigningKeyCache, SigningKeySet};
pub use refresher::KeyRefresher;
pub use source::{HttpKeySetSource, KeySetSource};
