//! Key agreement over X25519 and NIST-curve ECDH.
//!
//! Exchange instances serialize to a compact tagged form: a single tag
//! byte naming the algorithm and classification, followed by the raw key
//! material. Private instances carry the scalar only; the public point is
//! rederived on demand. See [`tag`] for the assigned values.

use core::fmt;

use base64ct::{Base64Url, Encoding};

use crate::{
    error::{Error, Result},
    KeyXType,
};

pub mod ecdh;
pub mod x25519;

pub use ecdh::EcdhExchange;
pub use x25519::Curve25519Exchange;

/// Tag bytes prefixing the serialized form of a key exchange.
///
/// Odd values are private scalars, the following even value is the
/// matching public material.
pub mod tag {
    /// An X25519 private scalar (32 bytes follow).
    pub const CURVE25519_PRIVATE: u8 = 201;
    /// An X25519 public point (32 bytes follow).
    pub const CURVE25519_PUBLIC: u8 = 202;
    /// A P-256 ECDH private scalar (32 bytes follow).
    pub const ECDH256_PRIVATE: u8 = 211;
    /// A P-256 ECDH public point, uncompressed SEC1 (65 bytes follow).
    pub const ECDH256_PUBLIC: u8 = 212;
    /// A P-384 ECDH private scalar (48 bytes follow).
    pub const ECDH384_PRIVATE: u8 = 213;
    /// A P-384 ECDH public point, uncompressed SEC1 (97 bytes follow).
    pub const ECDH384_PUBLIC: u8 = 214;
    /// A P-521 ECDH private scalar (66 bytes follow).
    pub const ECDH521_PRIVATE: u8 = 215;
    /// A P-521 ECDH public point, uncompressed SEC1 (133 bytes follow).
    pub const ECDH521_PUBLIC: u8 = 216;
}

/// A polymorphic two-party key agreement.
///
/// An instance is classified as exactly one of private or public. Only a
/// private instance can derive a shared secret; the peer passed to
/// [`shared_secret`](KeyExchange::shared_secret) must be a public instance
/// of the same [`KeyXType`].
pub trait KeyExchange: fmt::Debug + fmt::Display {
    /// Serializes this instance to its tagged binary form.
    fn to_bytes(&self) -> Vec<u8>;

    /// Returns the public half of this exchange.
    ///
    /// On an instance with no private scalar this yields the zero-value
    /// exchange, whose [`key_type`](KeyExchange::key_type) is
    /// [`KeyXType::Unknown`].
    fn public_key(&self) -> Box<dyn KeyExchange>;

    /// The public material alone, without the tag byte.
    fn public_key_bytes(&self) -> Vec<u8>;

    /// Derives the shared secret between this private instance and the
    /// peer's public instance.
    fn shared_secret(&self, peer: &dyn KeyExchange) -> Result<Vec<u8>>;

    /// Whether this instance holds a private scalar.
    fn is_private_key(&self) -> bool;

    /// Whether this instance holds public material only.
    fn is_public_key(&self) -> bool;

    /// The algorithm of this exchange.
    fn key_type(&self) -> KeyXType;
}

/// Generates a fresh private key exchange of the requested type.
pub fn generate_kx(kxt: KeyXType) -> Result<Box<dyn KeyExchange>> {
    match kxt {
        KeyXType::Curve25519 => Ok(Box::new(Curve25519Exchange::generate())),
        KeyXType::Ecdh256 | KeyXType::Ecdh384 | KeyXType::Ecdh521 => {
            Ok(Box::new(EcdhExchange::generate(kxt)?))
        }
        KeyXType::Unknown => Err(Error::UnsupportedKeyExchangeType("kx-generate", kxt)),
    }
}

/// Parses a key exchange from its tagged binary form.
pub fn kx_from_bytes(input: &[u8]) -> Result<Box<dyn KeyExchange>> {
    let (tag, material) = input
        .split_first()
        .ok_or(Error::NoKeyMaterial("kx-decode"))?;
    match *tag {
        tag::CURVE25519_PRIVATE | tag::CURVE25519_PUBLIC => {
            Ok(Box::new(Curve25519Exchange::from_tagged(*tag, material)?))
        }
        tag::ECDH256_PRIVATE..=tag::ECDH521_PUBLIC => {
            Ok(Box::new(EcdhExchange::from_tagged(*tag, material)?))
        }
        other => Err(Error::UnknownKeyExchangeTag(other)),
    }
}

/// Parses a key exchange from the base64url (padded) rendition of its
/// tagged binary form.
pub fn kx_from_str(input: &str) -> Result<Box<dyn KeyExchange>> {
    let raw =
        Base64Url::decode_vec(input).map_err(|e| Error::Base64("kx-decode", e))?;
    kx_from_bytes(&raw)
}

/// Renders a key exchange to base64url (padded), the inverse of
/// [`kx_from_str`].
pub fn kx_to_string(kx: &dyn KeyExchange) -> String {
    Base64Url::encode_string(&kx.to_bytes())
}
