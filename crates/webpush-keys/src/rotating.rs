//! Rotation-aware composite signer.
//!
//! One key is current and signs everything new. Retired keys are kept newest
//! first so subscriptions created under them can still be served until they
//! migrate. The whole key set sits behind one `RwLock`, so readers see either
//! the state before a rotation or the state after it.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, trace};
use webpush_crypto::{base64url_decode, base64url_encode, Digest, PublicKeyBytes, SignatureBytes};

use crate::error::{KeyError, SignerError};
use crate::signer::Signer;

/// Upper bound on signing attempts when the current key keeps changing
/// underneath a signature.
pub const MAX_SIGN_ATTEMPTS: usize = 8;

// ============================================================================
// KeyId
// ============================================================================

/// A public key as accepted by the query and removal methods.
#[derive(Debug, Clone, Copy)]
pub enum KeyId<'a> {
    /// Uncompressed SEC1 bytes.
    Raw(&'a [u8]),
    /// Base64url (unpadded) encoding of the uncompressed bytes.
    Base64(&'a str),
}

impl<'a> KeyId<'a> {
    fn decode(&self) -> Result<Cow<'a, [u8]>, KeyError> {
        match *self {
            KeyId::Raw(bytes) => Ok(Cow::Borrowed(bytes)),
            KeyId::Base64(encoded) => base64url_decode(encoded)
                .map(Cow::Owned)
                .map_err(|e| KeyError::InvalidEncoding(e.to_string())),
        }
    }
}

impl fmt::Display for KeyId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Raw(bytes) => f.write_str(&base64url_encode(bytes)),
            KeyId::Base64(encoded) => f.write_str(encoded),
        }
    }
}

impl<'a> From<&'a [u8]> for KeyId<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        KeyId::Raw(bytes)
    }
}

impl<'a> From<&'a PublicKeyBytes> for KeyId<'a> {
    fn from(bytes: &'a PublicKeyBytes) -> Self {
        KeyId::Raw(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for KeyId<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        KeyId::Raw(bytes)
    }
}

impl<'a> From<&'a str> for KeyId<'a> {
    fn from(encoded: &'a str) -> Self {
        KeyId::Base64(encoded)
    }
}

impl<'a> From<&'a String> for KeyId<'a> {
    fn from(encoded: &'a String) -> Self {
        KeyId::Base64(encoded)
    }
}

// ============================================================================
// Rotation state
// ============================================================================

#[derive(Clone)]
pub(crate) struct KeyMaterial {
    pub(crate) public_key: PublicKeyBytes,
    pub(crate) signer: Arc<dyn Signer>,
}

impl KeyMaterial {
    fn new(signer: Arc<dyn Signer>) -> Self {
        Self {
            public_key: signer.public_key(),
            signer,
        }
    }
}

pub(crate) struct RotationState {
    pub(crate) current: KeyMaterial,
    /// Most recently retired first.
    pub(crate) previous: VecDeque<KeyMaterial>,
    /// Bumped whenever `current` changes.
    generation: u64,
}

impl RotationState {
    fn position(&self, key: &[u8]) -> Option<usize> {
        self.previous
            .iter()
            .position(|k| k.public_key.as_slice() == key)
    }

    fn find(&self, key: &[u8]) -> Option<&KeyMaterial> {
        if self.current.public_key.as_slice() == key {
            return Some(&self.current);
        }
        self.position(key).map(|i| &self.previous[i])
    }

    fn contains(&self, key: &PublicKeyBytes) -> bool {
        self.find(key).is_some()
    }
}

// ============================================================================
// RotatingSigner
// ============================================================================

/// Signer that delegates to a current key and remembers previous ones.
///
/// Implements [`Signer`] itself, so it can be handed to a push client exactly
/// like a single-key backend.
pub struct RotatingSigner {
    pub(crate) state: RwLock<RotationState>,
}

impl RotatingSigner {
    pub fn new(current: Arc<dyn Signer>) -> Self {
        Self {
            state: RwLock::new(RotationState {
                current: KeyMaterial::new(current),
                previous: VecDeque::new(),
                generation: 0,
            }),
        }
    }

    /// Make `signer` current and move the old current key to the front of the
    /// previous list.
    ///
    /// Rotating to a key that is already in the previous list moves it out of
    /// that list. Rotating to the current key only replaces its handle.
    pub fn rotate(&self, signer: Arc<dyn Signer>) {
        let incoming = KeyMaterial::new(signer);
        let public_key = incoming.public_key;

        let mut state = self.state.write();
        state.generation += 1;
        if state.current.public_key == public_key {
            state.current = incoming;
            drop(state);
            debug!(public_key = %base64url_encode(&public_key), "replaced current key handle");
            return;
        }
        state.previous.retain(|k| k.public_key != public_key);
        let retired = std::mem::replace(&mut state.current, incoming);
        state.previous.push_front(retired);
        let previous = state.previous.len();
        drop(state);

        debug!(
            public_key = %base64url_encode(&public_key),
            previous,
            "rotated VAPID key"
        );
    }

    /// Append an existing key at the oldest end of the previous list.
    pub fn add_previous_key(&self, signer: Arc<dyn Signer>) -> Result<(), KeyError> {
        let material = KeyMaterial::new(signer);
        let mut state = self.state.write();
        if state.contains(&material.public_key) {
            return Err(KeyError::DuplicateKey(base64url_encode(&material.public_key)));
        }
        state.previous.push_back(material);
        Ok(())
    }

    /// Remove one previous key, keeping the order of the rest.
    pub fn remove_key<'a>(&self, key: impl Into<KeyId<'a>>) -> Result<(), KeyError> {
        let key = key.into();
        let bytes = key.decode()?;

        let mut state = self.state.write();
        if state.current.public_key.as_slice() == &*bytes {
            return Err(KeyError::CannotRemoveCurrent);
        }
        let index = state
            .position(&bytes)
            .ok_or_else(|| KeyError::KeyNotFound(key.to_string()))?;
        state.previous.remove(index);
        drop(state);

        debug!(public_key = %key, "removed previous key");
        Ok(())
    }

    /// Remove and return the oldest previous key.
    pub fn remove_oldest_key(&self) -> Result<PublicKeyBytes, KeyError> {
        let removed = self
            .state
            .write()
            .previous
            .pop_back()
            .ok_or(KeyError::NoPreviousKeys)?;
        debug!(public_key = %base64url_encode(&removed.public_key), "removed oldest key");
        Ok(removed.public_key)
    }

    /// Drop every previous key. Returns how many were removed.
    pub fn clear_previous_keys(&self) -> usize {
        let mut state = self.state.write();
        let count = state.previous.len();
        state.previous.clear();
        drop(state);
        if count > 0 {
            debug!(count, "cleared previous keys");
        }
        count
    }

    pub fn public_key_base64(&self) -> String {
        base64url_encode(&self.public_key())
    }

    /// Previous keys, most recently retired first.
    pub fn previous_keys(&self) -> Vec<PublicKeyBytes> {
        self.state
            .read()
            .previous
            .iter()
            .map(|k| k.public_key)
            .collect()
    }

    pub fn previous_keys_base64(&self) -> Vec<String> {
        self.previous_keys()
            .iter()
            .map(|k| base64url_encode(k))
            .collect()
    }

    /// Current key followed by previous keys, newest to oldest.
    pub fn all_keys(&self) -> Vec<PublicKeyBytes> {
        let state = self.state.read();
        std::iter::once(&state.current)
            .chain(state.previous.iter())
            .map(|k| k.public_key)
            .collect()
    }

    pub fn all_keys_base64(&self) -> Vec<String> {
        self.all_keys().iter().map(|k| base64url_encode(k)).collect()
    }

    pub fn key_count(&self) -> usize {
        1 + self.state.read().previous.len()
    }

    /// True if `key` is the current key. Undecodable input is never current.
    pub fn is_current_key<'a>(&self, key: impl Into<KeyId<'a>>) -> bool {
        match key.into().decode() {
            Ok(bytes) => self.state.read().current.public_key.as_slice() == &*bytes,
            Err(_) => false,
        }
    }

    /// True if `key` is current or any previous key.
    pub fn is_known_key<'a>(&self, key: impl Into<KeyId<'a>>) -> bool {
        match key.into().decode() {
            Ok(bytes) => self.state.read().find(&bytes).is_some(),
            Err(_) => false,
        }
    }

    /// Resolve a current or previous key to its signer.
    pub fn signer_for_key<'a>(&self, key: impl Into<KeyId<'a>>) -> Result<Arc<dyn Signer>, KeyError> {
        let key = key.into();
        let bytes = key.decode()?;
        self.state
            .read()
            .find(&bytes)
            .map(|k| k.signer.clone())
            .ok_or_else(|| KeyError::KeyNotFound(key.to_string()))
    }

    /// Sign with a specific known key instead of the current one.
    pub async fn sign_with_key<'a>(
        &self,
        key: impl Into<KeyId<'a>>,
        digest: &Digest,
    ) -> Result<SignatureBytes, KeyError> {
        let signer = self.signer_for_key(key)?;
        Ok(signer.sign(digest).await?)
    }

    fn current_signer(&self) -> (Arc<dyn Signer>, u64) {
        let state = self.state.read();
        (state.current.signer.clone(), state.generation)
    }

    fn generation(&self) -> u64 {
        self.state.read().generation
    }
}

impl fmt::Debug for RotatingSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("RotatingSigner")
            .field("current", &base64url_encode(&state.current.public_key))
            .field("previous", &state.previous.len())
            .finish()
    }
}

#[async_trait]
impl Signer for RotatingSigner {
    /// Sign with the current key.
    ///
    /// The delegate runs without the lock held. If a rotation lands while it
    /// is signing, the signature is discarded and the digest is signed again
    /// with the new current key. After [`MAX_SIGN_ATTEMPTS`] attempts that all
    /// raced a rotation, fails with [`SignerError::KeyRotated`].
    async fn sign(&self, digest: &Digest) -> Result<SignatureBytes, SignerError> {
        for attempt in 1..=MAX_SIGN_ATTEMPTS {
            let (signer, generation) = self.current_signer();
            let signature = signer.sign(digest).await?;
            if self.generation() == generation {
                return Ok(signature);
            }
            trace!(attempt, "key rotated during signing, retrying with current key");
        }
        Err(SignerError::KeyRotated {
            attempts: MAX_SIGN_ATTEMPTS,
        })
    }

    fn public_key(&self) -> PublicKeyBytes {
        self.state.read().current.public_key
    }
}
