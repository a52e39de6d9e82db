use thiserror::Error;
use webpush_crypto::CryptoError;
use webpush_keys::{BoxError, SignerError};

/// Coarse classification of a [`PushError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any cryptographic work.
    Validation,
    /// RNG or primitive failure.
    Crypto,
    /// The signing backend failed.
    Signer,
    /// Network failure or a non-2xx answer from the push service.
    Delivery,
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),

    #[error("Push endpoint must use https: {0}")]
    InsecureEndpoint(String),

    #[error("Invalid push endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid VAPID subject (expected mailto: or https: URI): {0}")]
    InvalidSubject(String),

    #[error("Invalid send option: {0}")]
    InvalidOption(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Signing VAPID assertion failed: {0}")]
    SigningFailed(#[from] SignerError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Push service returned {status}: {body}")]
    PushRejected { status: u16, body: String },
}

impl PushError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PushError::InvalidSubscription(_)
            | PushError::InsecureEndpoint(_)
            | PushError::InvalidEndpoint(_)
            | PushError::InvalidSubject(_)
            | PushError::InvalidOption(_) => ErrorKind::Validation,
            PushError::Crypto(
                CryptoError::MalformedKey(_)
                | CryptoError::MalformedSecret { .. }
                | CryptoError::Base64Decode(_),
            ) => ErrorKind::Validation,
            PushError::Crypto(_) => ErrorKind::Crypto,
            PushError::SigningFailed(_) => ErrorKind::Signer,
            PushError::Transport(_) | PushError::PushRejected { .. } => ErrorKind::Delivery,
        }
    }

    /// HTTP status of a rejected push, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PushError::PushRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 404 and 410: the subscription no longer exists and the stored
    /// record should be deleted.
    pub fn is_subscription_gone(&self) -> bool {
        matches!(self.status(), Some(404) | Some(410))
    }
}

/// Failure inside a [`PushTransport`](crate::PushTransport) before a response
/// was received.
#[derive(Debug, Error)]
#[error("HTTP transport error: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert_eq!(
            PushError::InsecureEndpoint("http://x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            PushError::from(CryptoError::MalformedSecret {
                expected: 16,
                got: 3
            })
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            PushError::from(CryptoError::CryptoFailure("rng".into())).kind(),
            ErrorKind::Crypto
        );
        assert_eq!(
            PushError::from(SignerError::KeyRotated { attempts: 8 }).kind(),
            ErrorKind::Signer
        );
        assert_eq!(
            PushError::from(TransportError::new("reset")).kind(),
            ErrorKind::Delivery
        );
    }

    #[test]
    fn gone_statuses() {
        let gone = PushError::PushRejected {
            status: 410,
            body: String::new(),
        };
        assert!(gone.is_subscription_gone());
        assert_eq!(gone.kind(), ErrorKind::Delivery);

        let throttled = PushError::PushRejected {
            status: 429,
            body: "slow down".into(),
        };
        assert!(!throttled.is_subscription_gone());
        assert_eq!(throttled.status(), Some(429));
        assert!(throttled.to_string().contains("429: slow down"));
    }

    #[test]
    fn transport_error_keeps_source() {
        use std::error::Error as _;
        let err = TransportError::with_source("connect", "refused");
        assert_eq!(err.source().unwrap().to_string(), "refused");
    }
}
