//! The Ed25519 adapter, serialized as an `OKP` JSON Web Key (RFC 8037).

use core::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use pkcs8::{EncodePrivateKey as _, EncodePublicKey as _};
use rand_core::OsRng;
use serde::{Serialize, Serializer};
use signature::Signer as _;
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    jwk::{self, Jwk},
    key::Key,
    KeyType,
};

#[derive(Clone)]
enum EdMaterial {
    Private(SigningKey),
    Public(VerifyingKey),
}

/// An Ed25519 key implementing the [`Key`] contract.
///
/// Unlike the ECDSA and RSA adapters, [`sign`](Key::sign) takes the raw
/// message rather than a hash; Ed25519 hashes internally.
#[derive(Clone)]
pub struct Ed25519Key {
    material: EdMaterial,
    kid: Option<String>,
}

impl Ed25519Key {
    /// Generates a fresh Ed25519 private key.
    pub fn generate() -> Self {
        Self {
            material: EdMaterial::Private(SigningKey::generate(&mut OsRng)),
            kid: None,
        }
    }

    /// Builds an Ed25519 key from a parsed JWK.
    pub(crate) fn from_jwk(j: &Jwk) -> Result<Self> {
        const OP: &str = "ed25519-new";

        let crv = j.crv.as_deref().ok_or(Error::MissingJwkMember(OP, "crv"))?;
        if crv != "Ed25519" {
            return Err(Error::UnsupportedJwk(OP, crv.to_string()));
        }

        let material = match j.d.as_deref() {
            Some(d) => {
                let d = Zeroizing::new(jwk::decode(OP, d)?);
                let d: [u8; SECRET_KEY_LENGTH] =
                    d.as_slice()
                        .try_into()
                        .map_err(|_| Error::TruncatedKeyMaterial {
                            op: OP,
                            expected: SECRET_KEY_LENGTH,
                            actual: d.len(),
                        })?;
                EdMaterial::Private(SigningKey::from_bytes(&d))
            }
            None => {
                let x = j.require(OP, "x")?;
                let x: [u8; PUBLIC_KEY_LENGTH] =
                    x.as_slice()
                        .try_into()
                        .map_err(|_| Error::TruncatedKeyMaterial {
                            op: OP,
                            expected: PUBLIC_KEY_LENGTH,
                            actual: x.len(),
                        })?;
                EdMaterial::Public(
                    VerifyingKey::from_bytes(&x).map_err(|e| Error::Signature(OP, e))?,
                )
            }
        };

        Ok(Self {
            material,
            kid: j.kid.clone(),
        })
    }

    /// The underlying signing key, if this instance is private.
    pub fn private_key_instance(&self) -> Option<&SigningKey> {
        match &self.material {
            EdMaterial::Private(sk) => Some(sk),
            EdMaterial::Public(_) => None,
        }
    }

    /// The underlying verifying key, derived transiently from a private
    /// instance.
    pub fn public_key_instance(&self) -> VerifyingKey {
        match &self.material {
            EdMaterial::Private(sk) => sk.verifying_key(),
            EdMaterial::Public(pk) => *pk,
        }
    }

    fn jwk(&self) -> Jwk {
        let x = jwk::encode(self.public_key_instance().as_bytes());
        let d = match &self.material {
            EdMaterial::Private(sk) => Some(jwk::encode(Zeroizing::new(sk.to_bytes()).as_slice())),
            EdMaterial::Public(_) => None,
        };

        let kid = self
            .kid
            .clone()
            .unwrap_or_else(|| jwk::thumbprint(&[("crv", "Ed25519"), ("kty", "OKP"), ("x", &x)]));

        Jwk {
            kty: "OKP".into(),
            crv: Some("Ed25519".into()),
            x: Some(x),
            d,
            kid: Some(kid),
            ..Jwk::default()
        }
    }
}

impl Key for Ed25519Key {
    fn to_jwk_bytes(&self) -> Result<Vec<u8>> {
        self.jwk().to_bytes()
    }

    fn public_key(&self) -> Result<Box<dyn Key>> {
        match &self.material {
            EdMaterial::Private(sk) => Ok(Box::new(Self {
                material: EdMaterial::Public(sk.verifying_key()),
                kid: None,
            })),
            EdMaterial::Public(_) => Err(Error::MissingPrivateKey("ed25519-publickey")),
        }
    }

    fn is_private_key(&self) -> bool {
        matches!(self.material, EdMaterial::Private(_))
    }

    fn is_public_key(&self) -> bool {
        !self.is_private_key()
    }

    fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match &self.material {
            EdMaterial::Private(sk) => {
                let sig = sk
                    .try_sign(message)
                    .map_err(|e| Error::Signature("ed25519-sign", e))?;
                Ok(sig.to_bytes().to_vec())
            }
            EdMaterial::Public(_) => Err(Error::MissingPrivateKey("ed25519-sign")),
        }
    }

    fn verify(&self, signed: &[u8], message: &[u8]) -> bool {
        match &self.material {
            EdMaterial::Public(pk) => {
                let Ok(sig) = ed25519_dalek::Signature::from_slice(signed) else {
                    return false;
                };
                pk.verify_strict(message, &sig).is_ok()
            }
            EdMaterial::Private(_) => false,
        }
    }

    fn to_pem(&self) -> Result<String> {
        const OP: &str = "ed25519-pem";

        let (label, der) = match &self.material {
            EdMaterial::Private(sk) => (
                "PRIVATE KEY",
                sk.to_pkcs8_der()
                    .map_err(|e| Error::encoding(OP, e))?
                    .as_bytes()
                    .to_vec(),
            ),
            EdMaterial::Public(pk) => (
                "PUBLIC KEY",
                pk.to_public_key_der()
                    .map_err(|e| Error::encoding(OP, e))?
                    .into_vec(),
            ),
        };

        pem_rfc7468::encode_string(label, pem_rfc7468::LineEnding::LF, &der)
            .map_err(|e| Error::encoding(OP, e))
    }

    fn set_key_id(&mut self, kid: &str) {
        self.kid = Some(kid.to_string());
    }

    fn key_id(&self) -> Option<&str> {
        self.kid.as_deref()
    }
}

impl From<SigningKey> for Ed25519Key {
    fn from(sk: SigningKey) -> Self {
        Self {
            material: EdMaterial::Private(sk),
            kid: None,
        }
    }
}

impl From<VerifyingKey> for Ed25519Key {
    fn from(pk: VerifyingKey) -> Self {
        Self {
            material: EdMaterial::Public(pk),
            kid: None,
        }
    }
}

impl fmt::Display for Ed25519Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .to_jwk_bytes()
            .map(|b| String::from_utf8(b).unwrap_or_default())
            .unwrap_or_default();
        f.write_str(&rendered)
    }
}

impl fmt::Debug for Ed25519Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Key")
            .field("private", &self.is_private_key())
            .finish_non_exhaustive()
    }
}

impl Serialize for Ed25519Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.jwk().serialize(serializer)
    }
}
