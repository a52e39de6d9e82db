//! Web Push sender.
//!
//! Encrypts payloads per RFC 8291, authenticates the sender with a VAPID
//! (RFC 8292) assertion, and POSTs the result to the subscription endpoint.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use webpush::{FileSigner, PushClient, SendOptions, Subscription};
//!
//! let signer = Arc::new(FileSigner::from_pem_file("vapid.pem")?);
//! let client = PushClient::new(signer, "mailto:ops@example.com")?;
//! let subscription = Subscription::parse(r#"{"endpoint":"https://...","keys":{"p256dh":"...","auth":"..."}}"#)?;
//! client.send(&subscription, b"hello", &SendOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod options;
mod subscription;
mod transport;
pub mod vapid;

pub use client::PushClient;
pub use error::{ErrorKind, PushError, TransportError};
pub use options::{SendOptions, Urgency, DEFAULT_TTL};
pub use subscription::Subscription;
pub use transport::{PushRequest, PushResponse, PushTransport, ReqwestTransport};
pub use vapid::{application_server_key, build_assertion, decode_application_server_key, VapidAssertion};

pub use webpush_keys::{
    FileSigner, KeyCleanup, KeyError, KmsSigner, RotatingSigner, Signer, SignerError, UsageOracle,
};
