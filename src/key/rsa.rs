//! The RSA adapter. Signatures use PSS padding with a SHA-256 digest
//! parameter and the scheme's default salt length.

use core::fmt;

use ::rsa::{
    traits::{PrivateKeyParts as _, PublicKeyParts as _},
    BigUint, Pss, RsaPrivateKey, RsaPublicKey,
};
use pkcs8::{EncodePrivateKey as _, EncodePublicKey as _};
use rand_core::OsRng;
use serde::{Serialize, Serializer};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    jwk::{self, Jwk},
    key::Key,
    KeyType,
};

#[derive(Clone)]
enum RsaMaterial {
    Private(RsaPrivateKey),
    Public(RsaPublicKey),
}

/// An RSA key implementing the [`Key`] contract.
#[derive(Clone)]
pub struct RsaKey {
    kt: KeyType,
    material: RsaMaterial,
    kid: Option<String>,
}

/// Maps a modulus byte length to the registry value; unrecognized sizes
/// leave the tag unset.
fn key_type_for_size(size: usize) -> KeyType {
    match size {
        256 => KeyType::Rsa2048,
        512 => KeyType::Rsa4096,
        1024 => KeyType::Rsa8192,
        _ => KeyType::Unknown,
    }
}

impl RsaKey {
    /// Generates a fresh RSA private key with the modulus size matching
    /// `kt`.
    ///
    /// Prime search for the larger sizes is unbounded; callers needing a
    /// deadline for 8192-bit generation must impose one externally.
    ///
    /// # Errors
    ///
    /// Fails for any key type outside the RSA family.
    pub fn generate(kt: KeyType) -> Result<Self> {
        const OP: &str = "rsa-generate";

        let bits = match kt {
            KeyType::Rsa2048 => 2048,
            KeyType::Rsa4096 => 4096,
            KeyType::Rsa8192 => 8192,
            _ => return Err(Error::UnsupportedKeyType(OP, kt)),
        };

        let mut sk = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| Error::Rsa(OP, e))?;
        sk.precompute().map_err(|e| Error::Rsa(OP, e))?;

        Ok(Self {
            kt,
            material: RsaMaterial::Private(sk),
            kid: None,
        })
    }

    /// Builds an RSA key from a parsed JWK.
    ///
    /// A private JWK must carry `n`, `e`, `d`, `p` and `q`; the CRT members
    /// are recomputed rather than trusted from the input.
    pub(crate) fn from_jwk(j: &Jwk) -> Result<Self> {
        const OP: &str = "rsa-new";

        let n = BigUint::from_bytes_be(&j.require(OP, "n")?);
        let e = BigUint::from_bytes_be(&j.require(OP, "e")?);

        let material = if j.d.is_some() {
            let d = BigUint::from_bytes_be(&Zeroizing::new(j.require(OP, "d")?));
            let p = BigUint::from_bytes_be(&Zeroizing::new(j.require(OP, "p")?));
            let q = BigUint::from_bytes_be(&Zeroizing::new(j.require(OP, "q")?));

            let mut sk = RsaPrivateKey::from_components(n, e, d, vec![p, q])
                .map_err(|e| Error::Rsa(OP, e))?;
            sk.precompute().map_err(|e| Error::Rsa(OP, e))?;
            RsaMaterial::Private(sk)
        } else {
            RsaMaterial::Public(RsaPublicKey::new(n, e).map_err(|e| Error::Rsa(OP, e))?)
        };

        let size = match &material {
            RsaMaterial::Private(sk) => sk.size(),
            RsaMaterial::Public(pk) => pk.size(),
        };

        Ok(Self {
            kt: key_type_for_size(size),
            material,
            kid: j.kid.clone(),
        })
    }

    /// The underlying private key, if this instance is private.
    pub fn private_key_instance(&self) -> Option<&RsaPrivateKey> {
        match &self.material {
            RsaMaterial::Private(sk) => Some(sk),
            RsaMaterial::Public(_) => None,
        }
    }

    /// The underlying public key, derived transiently from a private
    /// instance.
    pub fn public_key_instance(&self) -> RsaPublicKey {
        match &self.material {
            RsaMaterial::Private(sk) => sk.to_public_key(),
            RsaMaterial::Public(pk) => pk.clone(),
        }
    }

    fn jwk(&self) -> Result<Jwk> {
        const OP: &str = "rsa-bytes";

        let mut out = Jwk {
            kty: "RSA".into(),
            ..Jwk::default()
        };

        match &self.material {
            RsaMaterial::Private(sk) => {
                let mut primes = sk.primes().iter();
                let (Some(p), Some(q)) = (primes.next(), primes.next()) else {
                    return Err(Error::RsaMultiPrime(OP));
                };
                if primes.next().is_some() {
                    return Err(Error::RsaMultiPrime(OP));
                }

                out.n = Some(jwk::encode(&sk.n().to_bytes_be()));
                out.e = Some(jwk::encode(&sk.e().to_bytes_be()));
                out.d = Some(jwk::encode(&Zeroizing::new(sk.d().to_bytes_be())));
                out.p = Some(jwk::encode(&Zeroizing::new(p.to_bytes_be())));
                out.q = Some(jwk::encode(&Zeroizing::new(q.to_bytes_be())));
                out.dp = sk
                    .dp()
                    .map(|v| jwk::encode(&Zeroizing::new(v.to_bytes_be())));
                out.dq = sk
                    .dq()
                    .map(|v| jwk::encode(&Zeroizing::new(v.to_bytes_be())));
                out.qi = sk
                    .crt_coefficient()
                    .map(|v| jwk::encode(&Zeroizing::new(v.to_bytes_be())));
            }
            RsaMaterial::Public(pk) => {
                out.n = Some(jwk::encode(&pk.n().to_bytes_be()));
                out.e = Some(jwk::encode(&pk.e().to_bytes_be()));
            }
        }

        let kid = self.kid.clone().unwrap_or_else(|| {
            jwk::thumbprint(&[
                ("e", out.e.as_deref().unwrap_or_default()),
                ("kty", "RSA"),
                ("n", out.n.as_deref().unwrap_or_default()),
            ])
        });
        out.kid = Some(kid);

        Ok(out)
    }
}

impl Key for RsaKey {
    fn to_jwk_bytes(&self) -> Result<Vec<u8>> {
        self.jwk()?.to_bytes()
    }

    fn public_key(&self) -> Result<Box<dyn Key>> {
        match &self.material {
            RsaMaterial::Private(sk) => Ok(Box::new(Self {
                kt: self.kt,
                material: RsaMaterial::Public(sk.to_public_key()),
                kid: None,
            })),
            RsaMaterial::Public(_) => Err(Error::MissingPrivateKey("rsa-publickey")),
        }
    }

    fn is_private_key(&self) -> bool {
        matches!(self.material, RsaMaterial::Private(_))
    }

    fn is_public_key(&self) -> bool {
        !self.is_private_key()
    }

    fn key_type(&self) -> KeyType {
        self.kt
    }

    fn sign(&self, hashed: &[u8]) -> Result<Vec<u8>> {
        const OP: &str = "rsa-sign";

        match &self.material {
            RsaMaterial::Private(sk) => sk
                .sign_with_rng(&mut OsRng, Pss::new::<Sha256>(), hashed)
                .map_err(|e| Error::Rsa(OP, e)),
            RsaMaterial::Public(_) => Err(Error::MissingPrivateKey(OP)),
        }
    }

    fn verify(&self, signed: &[u8], hashed: &[u8]) -> bool {
        match &self.material {
            RsaMaterial::Public(pk) => pk.verify(Pss::new::<Sha256>(), hashed, signed).is_ok(),
            RsaMaterial::Private(_) => false,
        }
    }

    fn to_pem(&self) -> Result<String> {
        const OP: &str = "rsa-pem";

        let (label, der) = match &self.material {
            RsaMaterial::Private(sk) => (
                "PRIVATE KEY",
                sk.to_pkcs8_der()
                    .map_err(|e| Error::encoding(OP, e))?
                    .as_bytes()
                    .to_vec(),
            ),
            RsaMaterial::Public(pk) => (
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

impl From<RsaPrivateKey> for RsaKey {
    fn from(mut sk: RsaPrivateKey) -> Self {
        // decoded keys may arrive without CRT members; without them the JWK
        // output simply omits dp/dq/qi
        let _ = sk.precompute();
        Self {
            kt: key_type_for_size(sk.size()),
            material: RsaMaterial::Private(sk),
            kid: None,
        }
    }
}

impl From<RsaPublicKey> for RsaKey {
    fn from(pk: RsaPublicKey) -> Self {
        Self {
            kt: key_type_for_size(pk.size()),
            material: RsaMaterial::Public(pk),
            kid: None,
        }
    }
}

impl fmt::Display for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .to_jwk_bytes()
            .map(|b| String::from_utf8(b).unwrap_or_default())
            .unwrap_or_default();
        f.write_str(&rendered)
    }
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKey")
            .field("key_type", &self.key_type())
            .field("private", &self.is_private_key())
            .finish_non_exhaustive()
    }
}

impl Serialize for RsaKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.jwk()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
