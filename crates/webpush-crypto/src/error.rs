use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Malformed P-256 public key: {0}")]
    MalformedKey(String),

    #[error("Malformed auth secret: expected {expected} bytes, got {got}")]
    MalformedSecret { expected: usize, got: usize },

    #[error("Malformed private key: {0}")]
    MalformedPrivateKey(String),

    #[error("Crypto failure: {0}")]
    CryptoFailure(String),

    #[error("Encrypted record too short: {0} bytes")]
    RecordTooShort(usize),

    #[error("Invalid record header: {0}")]
    InvalidHeader(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid record padding")]
    InvalidPadding,

    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("Base64url decode error: {0}")]
    Base64Decode(String),
}
