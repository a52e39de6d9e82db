//! Usage-driven removal of previous keys.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use webpush_crypto::base64url_encode;

use crate::error::{BoxError, KeyError};
use crate::rotating::RotatingSigner;

/// Reports how many stored subscriptions still reference a public key.
#[async_trait]
pub trait UsageOracle: Send + Sync {
    /// `public_key` is base64url (unpadded) of the uncompressed point.
    async fn count_by_key(&self, public_key: &str) -> Result<usize, BoxError>;
}

#[async_trait]
impl<O: UsageOracle + ?Sized> UsageOracle for Arc<O> {
    async fn count_by_key(&self, public_key: &str) -> Result<usize, BoxError> {
        (**self).count_by_key(public_key).await
    }
}

/// Outcome of [`RotatingSigner::remove_unused_keys`], base64url keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCleanup {
    pub removed: Vec<String>,
    pub retained: Vec<String>,
}

impl RotatingSigner {
    /// Remove every previous key that no subscription references.
    ///
    /// Keys are looked up one at a time, newest first, without holding the
    /// lock. The first oracle error aborts the whole operation with no key
    /// removed. Removals are applied in one step afterwards. A key that became
    /// current while the lookups ran is reported as retained.
    pub async fn remove_unused_keys<O>(&self, oracle: &O) -> Result<KeyCleanup, KeyError>
    where
        O: UsageOracle + ?Sized,
    {
        let snapshot = self.previous_keys();

        let mut unused = Vec::new();
        let mut retained = Vec::new();
        for key in snapshot {
            let encoded = base64url_encode(&key);
            let count = oracle
                .count_by_key(&encoded)
                .await
                .map_err(KeyError::Oracle)?;
            if count == 0 {
                unused.push((key, encoded));
            } else {
                retained.push(encoded);
            }
        }

        let mut removed = Vec::with_capacity(unused.len());
        {
            let mut state = self.state.write();
            for (key, encoded) in unused {
                if state.current.public_key == key {
                    retained.push(encoded);
                    continue;
                }
                state.previous.retain(|k| k.public_key != key);
                removed.push(encoded);
            }
        }

        debug!(
            removed = removed.len(),
            retained = retained.len(),
            "removed unused VAPID keys"
        );
        Ok(KeyCleanup { removed, retained })
    }
}
