//! VAPID signing keys.
//!
//! This crate provides:
//! - The [`Signer`] trait every signing backend implements
//! - [`FileSigner`] for keys held in memory or PEM files
//! - [`KmsSigner`] for keys held by a remote key management service
//! - [`RotatingSigner`] for key rotation with usage-driven cleanup

mod cleanup;
mod error;
mod file;
mod kms;
mod rotating;
mod signer;

pub use cleanup::{KeyCleanup, UsageOracle};
pub use error::{BoxError, KeyError, SignerError};
pub use file::{generate_key_pair, FileSigner};
pub use kms::{KeyManagementService, KmsSigner};
pub use rotating::{KeyId, RotatingSigner, MAX_SIGN_ATTEMPTS};
pub use signer::Signer;
