//! The ECDSA adapter over the NIST curves P-256, P-384 and P-521.

use core::fmt;

use elliptic_curve::{
    generic_array::typenum::Unsigned as _,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint, ValidatePublicKey},
    AffinePoint, Curve, CurveArithmetic, FieldBytes, FieldBytesSize, SecretKey,
};
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use pkcs8::EncodePublicKey as _;
use rand_core::OsRng;
use serde::{Serialize, Serializer};
use signature::hazmat::{PrehashSigner as _, PrehashVerifier as _};
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    jwk::{self, Jwk},
    key::Key,
    KeyType,
};

/// The per-curve key material, tagged by curve and private/public half.
#[derive(Clone)]
enum EcMaterial {
    P256Private(SecretKey<NistP256>),
    P256Public(elliptic_curve::PublicKey<NistP256>),
    P384Private(SecretKey<NistP384>),
    P384Public(elliptic_curve::PublicKey<NistP384>),
    P521Private(SecretKey<NistP521>),
    P521Public(elliptic_curve::PublicKey<NistP521>),
}

/// An ECDSA key implementing the [`Key`] contract.
///
/// Signatures are ASN.1 DER over the caller's pre-hashed input.
#[derive(Clone)]
pub struct EcKey {
    material: EcMaterial,
    kid: Option<String>,
}

fn to_field_bytes<'a, C: Curve>(op: &'static str, bytes: &'a [u8]) -> Result<&'a FieldBytes<C>> {
    if bytes.len() != C::FieldBytesSize::USIZE {
        return Err(Error::TruncatedKeyMaterial {
            op,
            expected: C::FieldBytesSize::USIZE,
            actual: bytes.len(),
        });
    }

    Ok(FieldBytes::<C>::from_slice(bytes))
}

fn new_private<C>(op: &'static str, x: &[u8], y: &[u8], d: &[u8]) -> Result<SecretKey<C>>
where
    C: Curve + CurveArithmetic + ValidatePublicKey,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let x = to_field_bytes::<C>(op, x)?;
    let y = to_field_bytes::<C>(op, y)?;
    let d = to_field_bytes::<C>(op, d)?;

    let point = EncodedPoint::<C>::from_affine_coordinates(x, y, false);
    let secret = SecretKey::<C>::from_bytes(d).map_err(|e| Error::EllipticCurve(op, e))?;

    // the declared public point must belong to the private scalar
    C::validate_public_key(&secret, &point).map_err(|e| Error::EllipticCurve(op, e))?;

    Ok(secret)
}

fn new_public<C>(op: &'static str, x: &[u8], y: &[u8]) -> Result<elliptic_curve::PublicKey<C>>
where
    C: Curve + CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
{
    let x = to_field_bytes::<C>(op, x)?;
    let y = to_field_bytes::<C>(op, y)?;

    let point = EncodedPoint::<C>::from_affine_coordinates(x, y, false);
    let key: Option<_> = elliptic_curve::PublicKey::<C>::from_encoded_point(&point).into();
    key.ok_or(Error::EllipticCurve(op, elliptic_curve::Error))
}

fn point_members<C>(op: &'static str, point: &EncodedPoint<C>) -> Result<(String, String)>
where
    C: Curve,
    FieldBytesSize<C>: ModulusSize,
{
    let x = point.x().ok_or(Error::EllipticCurve(op, elliptic_curve::Error))?;
    let y = point.y().ok_or(Error::EllipticCurve(op, elliptic_curve::Error))?;
    Ok((jwk::encode(x.as_slice()), jwk::encode(y.as_slice())))
}

impl EcKey {
    /// Generates a fresh ECDSA private key on the curve matching `kt`.
    ///
    /// # Errors
    ///
    /// Fails for any key type outside the ECDSA family.
    pub fn generate(kt: KeyType) -> Result<Self> {
        let material = match kt {
            KeyType::Ecdsa256 => EcMaterial::P256Private(SecretKey::random(&mut OsRng)),
            KeyType::Ecdsa384 => EcMaterial::P384Private(SecretKey::random(&mut OsRng)),
            KeyType::Ecdsa521 => EcMaterial::P521Private(SecretKey::random(&mut OsRng)),
            _ => return Err(Error::UnsupportedKeyType("ecdsa-generate", kt)),
        };

        Ok(Self {
            material,
            kid: None,
        })
    }

    /// Builds an ECDSA key from a parsed JWK.
    ///
    /// A `d` member yields a private instance (with the declared public
    /// point validated against the scalar), otherwise `x`/`y` yield a
    /// public one.
    pub(crate) fn from_jwk(j: &Jwk) -> Result<Self> {
        const OP: &str = "ecdsa-new";

        let crv = j.crv.as_deref().ok_or(Error::MissingJwkMember(OP, "crv"))?;
        let x = j.require(OP, "x")?;
        let y = j.require(OP, "y")?;
        let d = match j.d.as_deref() {
            Some(d) => Some(Zeroizing::new(jwk::decode(OP, d)?)),
            None => None,
        };

        let material = match (crv, &d) {
            ("P-256", Some(d)) => EcMaterial::P256Private(new_private::<NistP256>(OP, &x, &y, d)?),
            ("P-256", None) => EcMaterial::P256Public(new_public::<NistP256>(OP, &x, &y)?),
            ("P-384", Some(d)) => EcMaterial::P384Private(new_private::<NistP384>(OP, &x, &y, d)?),
            ("P-384", None) => EcMaterial::P384Public(new_public::<NistP384>(OP, &x, &y)?),
            ("P-521", Some(d)) => EcMaterial::P521Private(new_private::<NistP521>(OP, &x, &y, d)?),
            ("P-521", None) => EcMaterial::P521Public(new_public::<NistP521>(OP, &x, &y)?),
            (other, _) => return Err(Error::UnsupportedJwk(OP, other.to_string())),
        };

        Ok(Self {
            material,
            kid: j.kid.clone(),
        })
    }

    /// The raw private scalar, if this instance is private.
    pub fn private_scalar(&self) -> Option<Zeroizing<Vec<u8>>> {
        match &self.material {
            EcMaterial::P256Private(sk) => Some(Zeroizing::new(sk.to_bytes().as_slice().to_vec())),
            EcMaterial::P384Private(sk) => Some(Zeroizing::new(sk.to_bytes().as_slice().to_vec())),
            EcMaterial::P521Private(sk) => Some(Zeroizing::new(sk.to_bytes().as_slice().to_vec())),
            _ => None,
        }
    }

    /// The uncompressed SEC1 encoding of the public point, derived
    /// transiently from a private instance.
    pub fn public_point(&self) -> Vec<u8> {
        match &self.material {
            EcMaterial::P256Private(sk) => {
                sk.public_key().to_encoded_point(false).as_bytes().to_vec()
            }
            EcMaterial::P256Public(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            EcMaterial::P384Private(sk) => {
                sk.public_key().to_encoded_point(false).as_bytes().to_vec()
            }
            EcMaterial::P384Public(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            EcMaterial::P521Private(sk) => {
                sk.public_key().to_encoded_point(false).as_bytes().to_vec()
            }
            EcMaterial::P521Public(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    fn jwk(&self) -> Result<Jwk> {
        const OP: &str = "ecdsa-bytes";

        let (crv, point, d) = match &self.material {
            EcMaterial::P256Private(sk) => (
                "P-256",
                point_members::<NistP256>(OP, &sk.public_key().to_encoded_point(false))?,
                Some(jwk::encode(Zeroizing::new(sk.to_bytes()).as_slice())),
            ),
            EcMaterial::P256Public(pk) => (
                "P-256",
                point_members::<NistP256>(OP, &pk.to_encoded_point(false))?,
                None,
            ),
            EcMaterial::P384Private(sk) => (
                "P-384",
                point_members::<NistP384>(OP, &sk.public_key().to_encoded_point(false))?,
                Some(jwk::encode(Zeroizing::new(sk.to_bytes()).as_slice())),
            ),
            EcMaterial::P384Public(pk) => (
                "P-384",
                point_members::<NistP384>(OP, &pk.to_encoded_point(false))?,
                None,
            ),
            EcMaterial::P521Private(sk) => (
                "P-521",
                point_members::<NistP521>(OP, &sk.public_key().to_encoded_point(false))?,
                Some(jwk::encode(Zeroizing::new(sk.to_bytes()).as_slice())),
            ),
            EcMaterial::P521Public(pk) => (
                "P-521",
                point_members::<NistP521>(OP, &pk.to_encoded_point(false))?,
                None,
            ),
        };
        let (x, y) = point;

        let kid = self
            .kid
            .clone()
            .unwrap_or_else(|| jwk::thumbprint(&[("crv", crv), ("kty", "EC"), ("x", &x), ("y", &y)]));

        Ok(Jwk {
            kty: "EC".into(),
            crv: Some(crv.into()),
            x: Some(x),
            y: Some(y),
            d,
            kid: Some(kid),
            ..Jwk::default()
        })
    }
}

impl Key for EcKey {
    fn to_jwk_bytes(&self) -> Result<Vec<u8>> {
        self.jwk()?.to_bytes()
    }

    fn public_key(&self) -> Result<Box<dyn Key>> {
        let material = match &self.material {
            EcMaterial::P256Private(sk) => EcMaterial::P256Public(sk.public_key()),
            EcMaterial::P384Private(sk) => EcMaterial::P384Public(sk.public_key()),
            EcMaterial::P521Private(sk) => EcMaterial::P521Public(sk.public_key()),
            _ => return Err(Error::MissingPrivateKey("ecdsa-publickey")),
        };

        Ok(Box::new(Self {
            material,
            kid: None,
        }))
    }

    fn is_private_key(&self) -> bool {
        matches!(
            self.material,
            EcMaterial::P256Private(_) | EcMaterial::P384Private(_) | EcMaterial::P521Private(_)
        )
    }

    fn is_public_key(&self) -> bool {
        !self.is_private_key()
    }

    fn key_type(&self) -> KeyType {
        match self.material {
            EcMaterial::P256Private(_) | EcMaterial::P256Public(_) => KeyType::Ecdsa256,
            EcMaterial::P384Private(_) | EcMaterial::P384Public(_) => KeyType::Ecdsa384,
            EcMaterial::P521Private(_) | EcMaterial::P521Public(_) => KeyType::Ecdsa521,
        }
    }

    fn sign(&self, hashed: &[u8]) -> Result<Vec<u8>> {
        const OP: &str = "ecdsa-sign";

        match &self.material {
            EcMaterial::P256Private(sk) => {
                let signer = ecdsa::SigningKey::<NistP256>::from(sk);
                let sig: ecdsa::Signature<NistP256> = signer
                    .sign_prehash(hashed)
                    .map_err(|e| Error::Signature(OP, e))?;
                Ok(sig.to_der().as_ref().to_vec())
            }
            EcMaterial::P384Private(sk) => {
                let signer = ecdsa::SigningKey::<NistP384>::from(sk);
                let sig: ecdsa::Signature<NistP384> = signer
                    .sign_prehash(hashed)
                    .map_err(|e| Error::Signature(OP, e))?;
                Ok(sig.to_der().as_ref().to_vec())
            }
            EcMaterial::P521Private(sk) => {
                // P-521 has no digest primitive of its own; signing goes
                // through the wrapper type the p521 crate provides
                let signer = p521::ecdsa::SigningKey::from(ecdsa::SigningKey::<NistP521>::from(sk));
                let sig: ecdsa::Signature<NistP521> = signer
                    .sign_prehash(hashed)
                    .map_err(|e| Error::Signature(OP, e))?;
                Ok(sig.to_der().as_ref().to_vec())
            }
            _ => Err(Error::MissingPrivateKey(OP)),
        }
    }

    fn verify(&self, signed: &[u8], hashed: &[u8]) -> bool {
        match &self.material {
            EcMaterial::P256Public(pk) => {
                let Ok(sig) = ecdsa::Signature::<NistP256>::from_der(signed) else {
                    return false;
                };
                ecdsa::VerifyingKey::<NistP256>::from(pk)
                    .verify_prehash(hashed, &sig)
                    .is_ok()
            }
            EcMaterial::P384Public(pk) => {
                let Ok(sig) = ecdsa::Signature::<NistP384>::from_der(signed) else {
                    return false;
                };
                ecdsa::VerifyingKey::<NistP384>::from(pk)
                    .verify_prehash(hashed, &sig)
                    .is_ok()
            }
            EcMaterial::P521Public(pk) => {
                let Ok(sig) = ecdsa::Signature::<NistP521>::from_der(signed) else {
                    return false;
                };
                ecdsa::VerifyingKey::<NistP521>::from(pk)
                    .verify_prehash(hashed, &sig)
                    .is_ok()
            }
            _ => false,
        }
    }

    fn to_pem(&self) -> Result<String> {
        const OP: &str = "ecdsa-pem";

        let (label, der) = match &self.material {
            EcMaterial::P256Private(sk) => (
                "EC PRIVATE KEY",
                sk.to_sec1_der().map_err(|e| Error::encoding(OP, e))?.to_vec(),
            ),
            EcMaterial::P384Private(sk) => (
                "EC PRIVATE KEY",
                sk.to_sec1_der().map_err(|e| Error::encoding(OP, e))?.to_vec(),
            ),
            EcMaterial::P521Private(sk) => (
                "EC PRIVATE KEY",
                sk.to_sec1_der().map_err(|e| Error::encoding(OP, e))?.to_vec(),
            ),
            EcMaterial::P256Public(pk) => (
                "PUBLIC KEY",
                pk.to_public_key_der()
                    .map_err(|e| Error::encoding(OP, e))?
                    .into_vec(),
            ),
            EcMaterial::P384Public(pk) => (
                "PUBLIC KEY",
                pk.to_public_key_der()
                    .map_err(|e| Error::encoding(OP, e))?
                    .into_vec(),
            ),
            EcMaterial::P521Public(pk) => (
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

impl From<SecretKey<NistP256>> for EcKey {
    fn from(sk: SecretKey<NistP256>) -> Self {
        Self {
            material: EcMaterial::P256Private(sk),
            kid: None,
        }
    }
}

impl From<SecretKey<NistP384>> for EcKey {
    fn from(sk: SecretKey<NistP384>) -> Self {
        Self {
            material: EcMaterial::P384Private(sk),
            kid: None,
        }
    }
}

impl From<SecretKey<NistP521>> for EcKey {
    fn from(sk: SecretKey<NistP521>) -> Self {
        Self {
            material: EcMaterial::P521Private(sk),
            kid: None,
        }
    }
}

impl From<elliptic_curve::PublicKey<NistP256>> for EcKey {
    fn from(pk: elliptic_curve::PublicKey<NistP256>) -> Self {
        Self {
            material: EcMaterial::P256Public(pk),
            kid: None,
        }
    }
}

impl From<elliptic_curve::PublicKey<NistP384>> for EcKey {
    fn from(pk: elliptic_curve::PublicKey<NistP384>) -> Self {
        Self {
            material: EcMaterial::P384Public(pk),
            kid: None,
        }
    }
}

impl From<elliptic_curve::PublicKey<NistP521>> for EcKey {
    fn from(pk: elliptic_curve::PublicKey<NistP521>) -> Self {
        Self {
            material: EcMaterial::P521Public(pk),
            kid: None,
        }
    }
}

impl fmt::Display for EcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .to_jwk_bytes()
            .map(|b| String::from_utf8(b).unwrap_or_default())
            .unwrap_or_default();
        f.write_str(&rendered)
    }
}

impl fmt::Debug for EcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcKey")
            .field("key_type", &self.key_type())
            .field("private", &self.is_private_key())
            .finish_non_exhaustive()
    }
}

impl Serialize for EcKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.jwk()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
