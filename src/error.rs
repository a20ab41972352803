//! Error type shared by the codec, the primitive and the conversions.
//!
//! Integrity failures inside a conversion are never reported individually:
//! every scheme collapses them into [`Error::BadCiphertext`].

use thiserror::Error;

/// Errors returned by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The cipher was initialized with a key that does not allow this operation.
    #[error("operation not available in this cipher mode")]
    WrongMode,

    /// Code parameters or key material are inconsistent.
    #[error("invalid code parameters: {0}")]
    InvalidParameters(&'static str),

    /// The digest output does not fit into the constant-weight error space.
    #[error("digest output is too wide for the error vector space")]
    UnsupportedDigest,

    /// The plaintext exceeds the maximum accepted by the cipher.
    #[error("plaintext too long: {actual} bytes, at most {max} allowed")]
    PlaintextTooLong {
        /// Largest accepted plaintext length.
        max: usize,
        /// Length that was passed in.
        actual: usize,
    },

    /// The ciphertext cannot hold the fixed-size parts of the scheme.
    #[error("ciphertext too short: {actual} bytes, at least {min} required")]
    CiphertextTooShort {
        /// Smallest well-formed ciphertext length.
        min: usize,
        /// Length that was passed in.
        actual: usize,
    },

    /// Invalid input to the codec or the primitive.
    #[error("invalid argument: {0}")]
    Argument(&'static str),

    /// The syndrome decoder could not correct the word.
    #[error("syndrome decoding failed")]
    Decoding,

    /// The ciphertext was rejected by the conversion.
    #[error("bad padding: invalid ciphertext")]
    BadCiphertext,
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
