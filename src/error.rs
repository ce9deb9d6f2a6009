//! The error type shared by every fallible operation of this crate.

use thiserror::Error;

use crate::{KeyType, KeyXType};

/// The result type used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The errors produced by key and key-exchange operations.
///
/// Every message carries a `component-operation` prefix naming where the
/// failure happened. Errors from the underlying cryptographic crates are
/// preserved as sources where those crates expose a std error; the DER and
/// PEM container layer is stringified instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested key type is not valid for the invoked operation.
    #[error("{0}: unsupported key type `{1}`")]
    UnsupportedKeyType(&'static str, KeyType),

    /// The requested key-exchange type is not valid for the invoked
    /// operation.
    #[error("{0}: unsupported key-exchange type `{1}`")]
    UnsupportedKeyExchangeType(&'static str, KeyXType),

    /// An operation requiring private material was invoked on an instance
    /// without any.
    #[error("{0}: no private key exists for this operation")]
    MissingPrivateKey(&'static str),

    /// An operation requiring public material was invoked on an instance
    /// without any.
    #[error("{0}: no public key exists for this operation")]
    MissingPublicKey(&'static str),

    /// The instance holds neither private nor public material.
    #[error("{0}: neither public nor private key found")]
    NoKeyMaterial(&'static str),

    /// The leading discriminant byte of a key-exchange encoding is not one
    /// of the defined tag values.
    #[error("kx-decode: unrecognized key-exchange tag {0}")]
    UnknownKeyExchangeTag(u8),

    /// Key material of the wrong length followed a key-exchange tag.
    #[error("{op}: truncated key material, expected {expected} bytes, got {actual}")]
    TruncatedKeyMaterial {
        /// The decoding operation that rejected the input.
        op: &'static str,
        /// The material length the tag demands.
        expected: usize,
        /// The length actually present.
        actual: usize,
    },

    /// A JWK names a key family or curve this crate does not support.
    #[error("{0}: unsupported JWK key `{1}`")]
    UnsupportedJwk(&'static str, String),

    /// A JWK is missing a member required for its declared family.
    #[error("{0}: missing JWK member `{1}`")]
    MissingJwkMember(&'static str, &'static str),

    /// A PEM block carries a label this crate does not recognize.
    #[error("{0}: unrecognized PEM label `{1}`")]
    UnknownPemLabel(&'static str, String),

    /// An encrypted PEM block was given without a password.
    #[error("{0}: encrypted PEM block requires a password")]
    MissingPassword(&'static str),

    /// JSON encoding or decoding failed.
    #[error("{0}: {1}")]
    Json(&'static str, #[source] serde_json::Error),

    /// Base64 decoding failed.
    #[error("{0}: {1}")]
    Base64(&'static str, #[source] base64ct::Error),

    /// An elliptic-curve scalar or point was rejected.
    #[error("{0}: {1}")]
    EllipticCurve(&'static str, #[source] elliptic_curve::Error),

    /// An ECDSA or Ed25519 signature operation failed.
    #[error("{0}: {1}")]
    Signature(&'static str, #[source] signature::Error),

    /// An RSA operation failed.
    #[error("{0}: {1}")]
    Rsa(&'static str, #[source] rsa::Error),

    /// An RSA key with other than two prime factors was given.
    #[error("{0}: RSA keys with more than two primes are not supported")]
    RsaMultiPrime(&'static str),

    /// A Diffie-Hellman exchange produced an all-zero shared secret.
    #[error("{0}: the computed shared secret is not contributory")]
    NonContributory(&'static str),

    /// A DER or PEM container could not be encoded or decoded.
    #[error("{0}: {1}")]
    Encoding(&'static str, String),
}

impl Error {
    /// Wraps a container-layer error, keeping only its rendered message.
    pub(crate) fn encoding(op: &'static str, err: impl core::fmt::Display) -> Self {
        Error::Encoding(op, err.to_string())
    }
}
