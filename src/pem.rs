//! PEM parsing across the PKCS#8, PKCS#1, SPKI and SEC1 encapsulations.
//!
//! The PEM label selects the outer document format; the algorithm inside
//! is then discovered by attempting each supported family in turn. An
//! `ENCRYPTED PRIVATE KEY` document is decrypted with the caller's
//! password before the same discovery runs on the plaintext.

use ed25519_dalek::{SigningKey, VerifyingKey};
use elliptic_curve::SecretKey;
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use pkcs8::{
    der::Decode as _, DecodePrivateKey as _, DecodePublicKey as _, EncryptedPrivateKeyInfo,
};
use rsa::{
    pkcs1::{DecodeRsaPrivateKey as _, DecodeRsaPublicKey as _},
    RsaPrivateKey, RsaPublicKey,
};
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    key::{ec::EcKey, okp::Ed25519Key, rsa::RsaKey, Key},
};

const OP: &str = "parse-pem";

/// Parses a key from its PEM encoding.
///
/// Recognized labels are `PRIVATE KEY`, `ENCRYPTED PRIVATE KEY`,
/// `RSA PRIVATE KEY`, `EC PRIVATE KEY`, `PUBLIC KEY`, `EC PUBLIC KEY`
/// and `RSA PUBLIC KEY`. The password is consulted only for encrypted
/// documents; its absence there is an error.
pub fn key_from_pem(pem: &str, password: Option<&[u8]>) -> Result<Box<dyn Key>> {
    let (label, der) =
        pem_rfc7468::decode_vec(pem.as_bytes()).map_err(|e| Error::encoding(OP, e))?;
    let der = Zeroizing::new(der);

    match label {
        "PRIVATE KEY" | "RSA PRIVATE KEY" => private_from_pkcs8(&der),
        "ENCRYPTED PRIVATE KEY" => {
            let password = password.ok_or(Error::MissingPassword(OP))?;
            let info =
                EncryptedPrivateKeyInfo::from_der(&der).map_err(|e| Error::encoding(OP, e))?;
            let plain = info.decrypt(password).map_err(|e| Error::encoding(OP, e))?;
            private_from_pkcs8(plain.as_bytes())
        }
        "EC PRIVATE KEY" => private_from_sec1(&der),
        "PUBLIC KEY" | "EC PUBLIC KEY" | "RSA PUBLIC KEY" => public_from_spki(&der),
        other => Err(Error::UnknownPemLabel(OP, other.to_string())),
    }
}

/// Tries every supported algorithm against a plaintext PKCS#8 document.
fn private_from_pkcs8(der: &[u8]) -> Result<Box<dyn Key>> {
    if let Ok(sk) = RsaPrivateKey::from_pkcs8_der(der) {
        return Ok(Box::new(RsaKey::from(sk)));
    }
    if let Ok(sk) = SecretKey::<NistP256>::from_pkcs8_der(der) {
        return Ok(Box::new(EcKey::from(sk)));
    }
    if let Ok(sk) = SecretKey::<NistP384>::from_pkcs8_der(der) {
        return Ok(Box::new(EcKey::from(sk)));
    }
    if let Ok(sk) = SecretKey::<NistP521>::from_pkcs8_der(der) {
        return Ok(Box::new(EcKey::from(sk)));
    }
    if let Ok(sk) = SigningKey::from_pkcs8_der(der) {
        return Ok(Box::new(Ed25519Key::from(sk)));
    }
    // some producers mislabel PKCS#1 content as PKCS#8
    if let Ok(sk) = RsaPrivateKey::from_pkcs1_der(der) {
        return Ok(Box::new(RsaKey::from(sk)));
    }

    Err(Error::encoding(OP, "unrecognized private key algorithm"))
}

fn private_from_sec1(der: &[u8]) -> Result<Box<dyn Key>> {
    if let Ok(sk) = SecretKey::<NistP256>::from_sec1_der(der) {
        return Ok(Box::new(EcKey::from(sk)));
    }
    if let Ok(sk) = SecretKey::<NistP384>::from_sec1_der(der) {
        return Ok(Box::new(EcKey::from(sk)));
    }
    if let Ok(sk) = SecretKey::<NistP521>::from_sec1_der(der) {
        return Ok(Box::new(EcKey::from(sk)));
    }

    Err(Error::encoding(OP, "unrecognized EC private key curve"))
}

fn public_from_spki(der: &[u8]) -> Result<Box<dyn Key>> {
    if let Ok(pk) = RsaPublicKey::from_public_key_der(der) {
        return Ok(Box::new(RsaKey::from(pk)));
    }
    if let Ok(pk) = elliptic_curve::PublicKey::<NistP256>::from_public_key_der(der) {
        return Ok(Box::new(EcKey::from(pk)));
    }
    if let Ok(pk) = elliptic_curve::PublicKey::<NistP384>::from_public_key_der(der) {
        return Ok(Box::new(EcKey::from(pk)));
    }
    if let Ok(pk) = elliptic_curve::PublicKey::<NistP521>::from_public_key_der(der) {
        return Ok(Box::new(EcKey::from(pk)));
    }
    if let Ok(pk) = VerifyingKey::from_public_key_der(der) {
        return Ok(Box::new(Ed25519Key::from(pk)));
    }
    // bare PKCS#1 content also travels under the public-key labels
    if let Ok(pk) = RsaPublicKey::from_pkcs1_der(der) {
        return Ok(Box::new(RsaKey::from(pk)));
    }

    Err(Error::encoding(OP, "unrecognized public key algorithm"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyType;

    #[test]
    fn unknown_label_is_rejected() {
        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        let err = key_from_pem(pem, None).unwrap_err();
        assert!(matches!(err, Error::UnknownPemLabel(_, _)));
    }

    #[test]
    fn private_keys_roundtrip_through_pem() {
        for kt in [KeyType::Ed25519, KeyType::Ecdsa256, KeyType::Ecdsa384] {
            let key = crate::generate_key(kt).unwrap();
            let pem = key.to_pem().unwrap();
            let restored = key_from_pem(&pem, None).unwrap();
            assert_eq!(restored.key_type(), kt);
            assert!(restored.is_private_key());
        }
    }

    #[test]
    fn public_keys_roundtrip_through_pem() {
        let key = crate::generate_key(KeyType::Ecdsa521).unwrap();
        let public = key.public_key().unwrap();
        let pem = public.to_pem().unwrap();
        let restored = key_from_pem(&pem, None).unwrap();
        assert_eq!(restored.key_type(), KeyType::Ecdsa521);
        assert!(restored.is_public_key());
    }
}
