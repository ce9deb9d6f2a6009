//! The polymorphic signing-key contract and its dispatch layer.

use core::fmt;

use crate::{
    error::{Error, Result},
    jwk::Jwk,
    KeyType,
};

pub mod ec;
pub mod okp;
pub mod rsa;

use self::{ec::EcKey, okp::Ed25519Key, rsa::RsaKey};

/// A sign/verify capable asymmetric key.
///
/// The three implementing families (ECDSA, Ed25519, RSA) are
/// interchangeable through this trait: callers sign, verify and serialize
/// without knowing the concrete algorithm. An instance holds either private
/// or public material, never both; a private instance can always derive its
/// public half, a public instance cannot go the other way.
///
/// Instances are immutable after construction except for
/// [`set_key_id`](Key::set_key_id), which callers must serialize against
/// concurrent reads (single-writer-before-first-read).
pub trait Key: fmt::Debug + fmt::Display {
    /// Serializes the current material (private if present, else public) to
    /// JWK JSON.
    ///
    /// The `Display` implementation renders the same JSON but swallows
    /// errors and yields an empty string; error-sensitive callers use this
    /// method instead.
    fn to_jwk_bytes(&self) -> Result<Vec<u8>>;

    /// Derives the public half of this key as a new instance of the same
    /// family.
    ///
    /// Fails with [`Error::MissingPrivateKey`] on a non-private instance.
    fn public_key(&self) -> Result<Box<dyn Key>>;

    /// Whether this instance holds private material.
    ///
    /// Exactly one of `is_private_key` and [`is_public_key`](Key::is_public_key)
    /// is true for any validly constructed instance.
    fn is_private_key(&self) -> bool;

    /// Whether this instance holds public material only.
    fn is_public_key(&self) -> bool;

    /// The algorithm and size of this key, derived at construction time.
    fn key_type(&self) -> KeyType;

    /// Signs the given pre-hashed input with the private material.
    ///
    /// ECDSA produces an ASN.1 DER signature over the pre-hashed input and
    /// RSA a PSS signature with a SHA-256 digest parameter. Ed25519 signs
    /// the raw bytes directly: Ed25519 has no separate hash-then-sign step,
    /// so for that family callers pass the message itself, not a hash. This
    /// asymmetry is part of the contract.
    fn sign(&self, hashed: &[u8]) -> Result<Vec<u8>>;

    /// Verifies `signed` against the pre-hashed input using the public
    /// material.
    ///
    /// Fails closed: returns `false` on a private-classified instance, on
    /// malformed signatures and on cryptographic mismatch. Never panics,
    /// never errors.
    fn verify(&self, signed: &[u8], hashed: &[u8]) -> bool;

    /// Encodes the key in its legacy PEM form.
    ///
    /// EC private keys use SEC1 `EC PRIVATE KEY`, RSA and Ed25519 private
    /// keys PKCS#8 `PRIVATE KEY`, public keys PKIX `PUBLIC KEY`.
    fn to_pem(&self) -> Result<String>;

    /// Sets the identifier embedded in the JWK output.
    fn set_key_id(&mut self, kid: &str);

    /// The identifier set via [`set_key_id`](Key::set_key_id), if any.
    ///
    /// When none is set, serialization derives a default identifier from
    /// the key's RFC 7638 thumbprint instead.
    fn key_id(&self) -> Option<&str>;
}

/// Generates a fresh key of the requested type.
///
/// # Errors
///
/// Fails for [`KeyType::Unknown`] and propagates generation failures of the
/// underlying algorithm.
pub fn generate_key(kt: KeyType) -> Result<Box<dyn Key>> {
    match kt {
        KeyType::Ed25519 => Ok(Box::new(Ed25519Key::generate())),
        KeyType::Ecdsa256 | KeyType::Ecdsa384 | KeyType::Ecdsa521 => {
            Ok(Box::new(EcKey::generate(kt)?))
        }
        KeyType::Rsa2048 | KeyType::Rsa4096 | KeyType::Rsa8192 => {
            Ok(Box::new(RsaKey::generate(kt)?))
        }
        KeyType::Unknown => Err(Error::UnsupportedKeyType("generate-key", kt)),
    }
}

/// Parses JWK JSON bytes into a key of the matching family.
///
/// Dispatch is a closed match on the declared `kty` (and, for `OKP`, `crv`)
/// members; families other than `EC`, `OKP`/`Ed25519` and `RSA` are
/// rejected.
///
/// # Errors
///
/// Fails on malformed JSON, missing members and unsupported families.
pub fn key_from_jwk(bytes: &[u8]) -> Result<Box<dyn Key>> {
    let jwk = Jwk::from_bytes(bytes)?;
    key_from_parsed(&jwk)
}

/// String convenience wrapper over [`key_from_jwk`].
///
/// # Errors
///
/// Same as [`key_from_jwk`].
pub fn key_from_jwk_str(s: &str) -> Result<Box<dyn Key>> {
    key_from_jwk(s.as_bytes())
}

pub(crate) fn key_from_parsed(jwk: &Jwk) -> Result<Box<dyn Key>> {
    match jwk.kty.as_str() {
        "EC" => Ok(Box::new(EcKey::from_jwk(jwk)?)),
        "OKP" => Ok(Box::new(Ed25519Key::from_jwk(jwk)?)),
        "RSA" => Ok(Box::new(RsaKey::from_jwk(jwk)?)),
        other => Err(Error::UnsupportedJwk("key-from-jwk", other.to_string())),
    }
}
