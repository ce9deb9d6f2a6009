//! Raw X25519 key agreement with fixed 32-byte scalars.

use core::fmt;

use base64ct::{Base64Url, Encoding};
use rand_core::{OsRng, RngCore};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    kx::{tag, KeyExchange},
    KeyXType,
};

/// The size in bytes of an X25519 scalar and of an X25519 point.
pub const KEY_SIZE: usize = 32;

/// An X25519 key agreement.
///
/// A private instance carries the scalar and rederives its public point on
/// demand. The zero value holds no material at all and reports
/// [`KeyXType::Unknown`].
#[derive(Default)]
pub struct Curve25519Exchange {
    private: Option<Zeroizing<[u8; KEY_SIZE]>>,
    public: Option<[u8; KEY_SIZE]>,
}

impl Curve25519Exchange {
    /// Generates a fresh private exchange.
    pub fn generate() -> Self {
        let mut scalar = Zeroizing::new([0u8; KEY_SIZE]);
        OsRng.fill_bytes(scalar.as_mut());
        Self {
            private: Some(scalar),
            public: None,
        }
    }

    /// Reconstructs an exchange from a tag byte and the raw material
    /// following it.
    pub(crate) fn from_tagged(tag: u8, material: &[u8]) -> Result<Self> {
        let scalar: [u8; KEY_SIZE] =
            material
                .try_into()
                .map_err(|_| Error::TruncatedKeyMaterial {
                    op: "curve25519-decode",
                    expected: KEY_SIZE,
                    actual: material.len(),
                })?;
        Ok(match tag {
            tag::CURVE25519_PRIVATE => Self {
                private: Some(Zeroizing::new(scalar)),
                public: None,
            },
            _ => Self {
                private: None,
                public: Some(scalar),
            },
        })
    }

    fn public_point(&self) -> Option<[u8; KEY_SIZE]> {
        match (&self.private, self.public) {
            (Some(scalar), _) => {
                let secret = StaticSecret::from(**scalar);
                Some(*PublicKey::from(&secret).as_bytes())
            }
            (None, public) => public,
        }
    }
}

impl KeyExchange for Curve25519Exchange {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + KEY_SIZE);
        match (&self.private, self.public) {
            (Some(scalar), _) => {
                out.push(tag::CURVE25519_PRIVATE);
                out.extend_from_slice(scalar.as_ref());
            }
            (None, Some(public)) => {
                out.push(tag::CURVE25519_PUBLIC);
                out.extend_from_slice(&public);
            }
            (None, None) => {}
        }
        out
    }

    fn public_key(&self) -> Box<dyn KeyExchange> {
        Box::new(Self {
            private: None,
            public: self.public_point(),
        })
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_point().map(|p| p.to_vec()).unwrap_or_default()
    }

    fn shared_secret(&self, peer: &dyn KeyExchange) -> Result<Vec<u8>> {
        const OP: &str = "curve25519-sharedsecret";
        let scalar = self.private.as_ref().ok_or(Error::MissingPrivateKey(OP))?;
        if !peer.is_public_key() {
            return Err(Error::MissingPublicKey(OP));
        }
        if peer.key_type() != KeyXType::Curve25519 {
            return Err(Error::UnsupportedKeyExchangeType(OP, peer.key_type()));
        }
        let point: [u8; KEY_SIZE] =
            peer.public_key_bytes()
                .as_slice()
                .try_into()
                .map_err(|_| Error::TruncatedKeyMaterial {
                    op: OP,
                    expected: KEY_SIZE,
                    actual: peer.public_key_bytes().len(),
                })?;
        let secret = StaticSecret::from(**scalar);
        let shared = secret.diffie_hellman(&PublicKey::from(point));
        if !shared.was_contributory() {
            return Err(Error::NonContributory(OP));
        }
        Ok(shared.as_bytes().to_vec())
    }

    fn is_private_key(&self) -> bool {
        self.private.is_some()
    }

    fn is_public_key(&self) -> bool {
        self.private.is_none() && self.public.is_some()
    }

    fn key_type(&self) -> KeyXType {
        if self.private.is_some() || self.public.is_some() {
            KeyXType::Curve25519
        } else {
            KeyXType::Unknown
        }
    }
}

impl fmt::Display for Curve25519Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Base64Url::encode_string(&self.to_bytes()))
    }
}

impl fmt::Debug for Curve25519Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Curve25519Exchange")
            .field("key_type", &self.key_type())
            .field("private", &self.is_private_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_is_symmetric() {
        let alice = Curve25519Exchange::generate();
        let bob = Curve25519Exchange::generate();

        let from_alice = alice.shared_secret(bob.public_key().as_ref()).unwrap();
        let from_bob = bob.shared_secret(alice.public_key().as_ref()).unwrap();
        assert_eq!(from_alice, from_bob);
        assert_eq!(from_alice.len(), KEY_SIZE);
    }

    #[test]
    fn public_instance_cannot_agree() {
        let alice = Curve25519Exchange::generate();
        let public = alice.public_key();
        let err = public
            .shared_secret(Curve25519Exchange::generate().public_key().as_ref())
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrivateKey(_)));
    }

    #[test]
    fn zero_value_has_unknown_type() {
        let zero = Curve25519Exchange::default();
        assert_eq!(zero.key_type(), KeyXType::Unknown);
        assert!(!zero.is_private_key());
        assert!(!zero.is_public_key());
        assert!(zero.to_bytes().is_empty());
    }

    #[test]
    fn truncated_material_is_rejected() {
        let err =
            Curve25519Exchange::from_tagged(tag::CURVE25519_PRIVATE, &[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedKeyMaterial { expected: 32, actual: 16, .. }
        ));
    }
}
