//! EC Diffie-Hellman over the NIST curves P-256, P-384 and P-521.

use core::fmt;

use base64ct::{Base64Url, Encoding as _};
use elliptic_curve::{
    ecdh,
    generic_array::typenum::Unsigned as _,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, Curve, CurveArithmetic, FieldBytesSize, SecretKey,
};
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    kx::{tag, KeyExchange},
    KeyXType,
};

/// The per-curve key material, tagged by curve and private/public half.
#[derive(Clone)]
enum EcdhMaterial {
    P256Private(SecretKey<NistP256>),
    P256Public(elliptic_curve::PublicKey<NistP256>),
    P384Private(SecretKey<NistP384>),
    P384Public(elliptic_curve::PublicKey<NistP384>),
    P521Private(SecretKey<NistP521>),
    P521Public(elliptic_curve::PublicKey<NistP521>),
}

/// An ECDH key agreement implementing the [`KeyExchange`] contract.
///
/// Private instances serialize as the bare field-width scalar, public
/// instances as the uncompressed SEC1 point. The zero value holds no
/// material and reports [`KeyXType::Unknown`].
#[derive(Clone, Default)]
pub struct EcdhExchange {
    material: Option<EcdhMaterial>,
}

fn decode_scalar<C>(op: &'static str, material: &[u8]) -> Result<SecretKey<C>>
where
    C: Curve + CurveArithmetic,
{
    if material.len() != C::FieldBytesSize::USIZE {
        return Err(Error::TruncatedKeyMaterial {
            op,
            expected: C::FieldBytesSize::USIZE,
            actual: material.len(),
        });
    }

    SecretKey::<C>::from_slice(material).map_err(|e| Error::EllipticCurve(op, e))
}

fn decode_point<C>(op: &'static str, material: &[u8]) -> Result<elliptic_curve::PublicKey<C>>
where
    C: Curve + CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    // an uncompressed SEC1 point: 0x04 then both coordinates
    let expected = 1 + 2 * C::FieldBytesSize::USIZE;
    if material.len() != expected {
        return Err(Error::TruncatedKeyMaterial {
            op,
            expected,
            actual: material.len(),
        });
    }

    let point = EncodedPoint::<C>::from_bytes(material).map_err(|e| Error::encoding(op, e))?;
    let key: Option<_> = elliptic_curve::PublicKey::<C>::from_encoded_point(&point).into();
    key.ok_or(Error::EllipticCurve(op, elliptic_curve::Error))
}

fn agree<C>(op: &'static str, secret: &SecretKey<C>, peer_point: &[u8]) -> Result<Vec<u8>>
where
    C: Curve + CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let peer = decode_point::<C>(op, peer_point)?;
    let shared = ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    Ok(shared.raw_secret_bytes().as_slice().to_vec())
}

impl EcdhExchange {
    /// Generates a fresh private exchange on the curve matching `kxt`.
    ///
    /// # Errors
    ///
    /// Fails for any type outside the ECDH family.
    pub fn generate(kxt: KeyXType) -> Result<Self> {
        let material = match kxt {
            KeyXType::Ecdh256 => EcdhMaterial::P256Private(SecretKey::random(&mut OsRng)),
            KeyXType::Ecdh384 => EcdhMaterial::P384Private(SecretKey::random(&mut OsRng)),
            KeyXType::Ecdh521 => EcdhMaterial::P521Private(SecretKey::random(&mut OsRng)),
            _ => return Err(Error::UnsupportedKeyExchangeType("ecdh-generate", kxt)),
        };

        Ok(Self {
            material: Some(material),
        })
    }

    /// Reconstructs an exchange from a tag byte and the raw material
    /// following it.
    pub(crate) fn from_tagged(tag: u8, material: &[u8]) -> Result<Self> {
        const OP: &str = "ecdh-decode";
        let material = match tag {
            tag::ECDH256_PRIVATE => {
                EcdhMaterial::P256Private(decode_scalar::<NistP256>(OP, material)?)
            }
            tag::ECDH256_PUBLIC => {
                EcdhMaterial::P256Public(decode_point::<NistP256>(OP, material)?)
            }
            tag::ECDH384_PRIVATE => {
                EcdhMaterial::P384Private(decode_scalar::<NistP384>(OP, material)?)
            }
            tag::ECDH384_PUBLIC => {
                EcdhMaterial::P384Public(decode_point::<NistP384>(OP, material)?)
            }
            tag::ECDH521_PRIVATE => {
                EcdhMaterial::P521Private(decode_scalar::<NistP521>(OP, material)?)
            }
            tag::ECDH521_PUBLIC => {
                EcdhMaterial::P521Public(decode_point::<NistP521>(OP, material)?)
            }
            other => return Err(Error::UnknownKeyExchangeTag(other)),
        };

        Ok(Self {
            material: Some(material),
        })
    }
}

impl KeyExchange for EcdhExchange {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match &self.material {
            Some(EcdhMaterial::P256Private(sk)) => {
                out.push(tag::ECDH256_PRIVATE);
                out.extend_from_slice(Zeroizing::new(sk.to_bytes()).as_slice());
            }
            Some(EcdhMaterial::P384Private(sk)) => {
                out.push(tag::ECDH384_PRIVATE);
                out.extend_from_slice(Zeroizing::new(sk.to_bytes()).as_slice());
            }
            Some(EcdhMaterial::P521Private(sk)) => {
                out.push(tag::ECDH521_PRIVATE);
                out.extend_from_slice(Zeroizing::new(sk.to_bytes()).as_slice());
            }
            Some(EcdhMaterial::P256Public(pk)) => {
                out.push(tag::ECDH256_PUBLIC);
                out.extend_from_slice(pk.to_encoded_point(false).as_bytes());
            }
            Some(EcdhMaterial::P384Public(pk)) => {
                out.push(tag::ECDH384_PUBLIC);
                out.extend_from_slice(pk.to_encoded_point(false).as_bytes());
            }
            Some(EcdhMaterial::P521Public(pk)) => {
                out.push(tag::ECDH521_PUBLIC);
                out.extend_from_slice(pk.to_encoded_point(false).as_bytes());
            }
            None => {}
        }
        out
    }

    fn public_key(&self) -> Box<dyn KeyExchange> {
        let material = match &self.material {
            Some(EcdhMaterial::P256Private(sk)) => {
                Some(EcdhMaterial::P256Public(sk.public_key()))
            }
            Some(EcdhMaterial::P384Private(sk)) => {
                Some(EcdhMaterial::P384Public(sk.public_key()))
            }
            Some(EcdhMaterial::P521Private(sk)) => {
                Some(EcdhMaterial::P521Public(sk.public_key()))
            }
            _ => None,
        };
        Box::new(Self { material })
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        match &self.material {
            Some(EcdhMaterial::P256Private(sk)) => {
                sk.public_key().to_encoded_point(false).as_bytes().to_vec()
            }
            Some(EcdhMaterial::P384Private(sk)) => {
                sk.public_key().to_encoded_point(false).as_bytes().to_vec()
            }
            Some(EcdhMaterial::P521Private(sk)) => {
                sk.public_key().to_encoded_point(false).as_bytes().to_vec()
            }
            Some(EcdhMaterial::P256Public(pk)) => {
                pk.to_encoded_point(false).as_bytes().to_vec()
            }
            Some(EcdhMaterial::P384Public(pk)) => {
                pk.to_encoded_point(false).as_bytes().to_vec()
            }
            Some(EcdhMaterial::P521Public(pk)) => {
                pk.to_encoded_point(false).as_bytes().to_vec()
            }
            None => Vec::new(),
        }
    }

    fn shared_secret(&self, peer: &dyn KeyExchange) -> Result<Vec<u8>> {
        const OP: &str = "ecdh-sharedsecret";
        if !peer.is_public_key() {
            return Err(Error::MissingPublicKey(OP));
        }
        // both sides must live on the same curve
        if peer.key_type() != self.key_type() {
            return Err(Error::UnsupportedKeyExchangeType(OP, peer.key_type()));
        }
        let point = peer.public_key_bytes();
        match &self.material {
            Some(EcdhMaterial::P256Private(sk)) => agree::<NistP256>(OP, sk, &point),
            Some(EcdhMaterial::P384Private(sk)) => agree::<NistP384>(OP, sk, &point),
            Some(EcdhMaterial::P521Private(sk)) => agree::<NistP521>(OP, sk, &point),
            _ => Err(Error::MissingPrivateKey(OP)),
        }
    }

    fn is_private_key(&self) -> bool {
        matches!(
            self.material,
            Some(EcdhMaterial::P256Private(_))
                | Some(EcdhMaterial::P384Private(_))
                | Some(EcdhMaterial::P521Private(_))
        )
    }

    fn is_public_key(&self) -> bool {
        matches!(
            self.material,
            Some(EcdhMaterial::P256Public(_))
                | Some(EcdhMaterial::P384Public(_))
                | Some(EcdhMaterial::P521Public(_))
        )
    }

    fn key_type(&self) -> KeyXType {
        match self.material {
            Some(EcdhMaterial::P256Private(_)) | Some(EcdhMaterial::P256Public(_)) => {
                KeyXType::Ecdh256
            }
            Some(EcdhMaterial::P384Private(_)) | Some(EcdhMaterial::P384Public(_)) => {
                KeyXType::Ecdh384
            }
            Some(EcdhMaterial::P521Private(_)) | Some(EcdhMaterial::P521Public(_)) => {
                KeyXType::Ecdh521
            }
            None => KeyXType::Unknown,
        }
    }
}

impl fmt::Display for EcdhExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Base64Url::encode_string(&self.to_bytes()))
    }
}

impl fmt::Debug for EcdhExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdhExchange")
            .field("key_type", &self.key_type())
            .field("private", &self.is_private_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_is_symmetric_on_every_curve() {
        for kxt in [KeyXType::Ecdh256, KeyXType::Ecdh384, KeyXType::Ecdh521] {
            let alice = EcdhExchange::generate(kxt).unwrap();
            let bob = EcdhExchange::generate(kxt).unwrap();

            let from_alice = alice.shared_secret(bob.public_key().as_ref()).unwrap();
            let from_bob = bob.shared_secret(alice.public_key().as_ref()).unwrap();
            assert_eq!(from_alice, from_bob);
            assert!(!from_alice.is_empty());
        }
    }

    #[test]
    fn curves_do_not_mix() {
        let p256 = EcdhExchange::generate(KeyXType::Ecdh256).unwrap();
        let p384 = EcdhExchange::generate(KeyXType::Ecdh384).unwrap();
        let err = p256.shared_secret(p384.public_key().as_ref()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedKeyExchangeType(_, KeyXType::Ecdh384)
        ));
    }

    #[test]
    fn scalar_widths_match_the_curve() {
        let widths = [
            (KeyXType::Ecdh256, 32),
            (KeyXType::Ecdh384, 48),
            (KeyXType::Ecdh521, 66),
        ];
        for (kxt, width) in widths {
            let kx = EcdhExchange::generate(kxt).unwrap();
            let bytes = kx.to_bytes();
            assert_eq!(bytes.len(), 1 + width);
            assert_eq!(kx.public_key_bytes().len(), 1 + 2 * width);
        }
    }

    #[test]
    fn zero_value_has_unknown_type() {
        let zero = EcdhExchange::default();
        assert_eq!(zero.key_type(), KeyXType::Unknown);
        assert!(zero.to_bytes().is_empty());
        assert!(zero.public_key_bytes().is_empty());
    }
}
