//! The JSON Web Key model shared by the signing-key adapters.
//!
//! Only the members the supported families use are carried; see
//! [RFC 7518, section 6](https://datatracker.ietf.org/doc/html/rfc7518#section-6).
//! All numeric members are base64url strings without padding.

use std::collections::BTreeMap;

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// A JSON Web Key as it appears on the wire.
///
/// This is the serde model the adapters serialize into and the factory
/// dispatches on; it performs no validation beyond JSON well-formedness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jwk {
    /// The key family, `EC`, `RSA` or `OKP`.
    pub kty: String,
    /// The named curve for `EC` and `OKP` keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// The RSA modulus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// The RSA public exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// The EC/OKP public coordinate, or nothing for RSA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// The EC public y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// The private scalar (EC/OKP) or private exponent (RSA).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// The first RSA prime factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    /// The second RSA prime factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// The first RSA CRT exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    /// The second RSA CRT exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    /// The RSA CRT coefficient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
    /// The key identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    /// Parses a JWK from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::Json("jwk-parse", e))
    }

    /// Serializes this JWK to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Json("jwk-encode", e))
    }

    /// Returns the named member, decoded from base64url, or a
    /// missing-member error carrying `op` as context.
    pub(crate) fn require(&self, op: &'static str, member: &'static str) -> Result<Vec<u8>> {
        let value = match member {
            "n" => &self.n,
            "e" => &self.e,
            "x" => &self.x,
            "y" => &self.y,
            "d" => &self.d,
            "p" => &self.p,
            "q" => &self.q,
            _ => &None,
        };
        let value = value.as_deref().ok_or(Error::MissingJwkMember(op, member))?;
        decode(op, value)
    }
}

/// Encodes bytes as base64url without padding, the JWK member encoding.
pub(crate) fn encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Decodes a base64url JWK member.
pub(crate) fn decode(op: &'static str, value: &str) -> Result<Vec<u8>> {
    Base64UrlUnpadded::decode_vec(value).map_err(|e| Error::Base64(op, e))
}

/// Computes the RFC 7638 thumbprint over the given required members.
///
/// The members are serialized with lexicographically ordered keys and no
/// whitespace, hashed with SHA-256 and base64url encoded. Used as the
/// default `kid` when a key has none assigned.
pub(crate) fn thumbprint(members: &[(&str, &str)]) -> String {
    let map: BTreeMap<&str, &str> = members.iter().copied().collect();
    let json = serde_json::to_string(&map).expect("serialization of a string map can not fail");
    encode(&Sha256::digest(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_members_are_skipped() {
        let jwk = Jwk {
            kty: "OKP".into(),
            crv: Some("Ed25519".into()),
            x: Some("abc".into()),
            ..Jwk::default()
        };
        let json = String::from_utf8(jwk.to_bytes().unwrap()).unwrap();
        assert!(json.contains("\"kty\":\"OKP\""));
        assert!(!json.contains("\"n\""));
        assert!(!json.contains("\"kid\""));
    }

    #[test]
    fn thumbprint_matches_rfc7638_example() {
        // the RSA key from RFC 7638, section 3.1
        let n = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";
        let jwk = Jwk {
            kty: "RSA".into(),
            n: Some(n.into()),
            e: Some("AQAB".into()),
            ..Jwk::default()
        };
        let print = thumbprint(&[
            ("e", jwk.e.as_deref().unwrap()),
            ("kty", &jwk.kty),
            ("n", jwk.n.as_deref().unwrap()),
        ]);
        assert_eq!(print, "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs");
    }

    #[test]
    fn member_decode_errors_carry_context() {
        let jwk = Jwk {
            kty: "EC".into(),
            x: Some("!!!not base64!!!".into()),
            ..Jwk::default()
        };
        let err = jwk.require("ecdsa-new", "x").unwrap_err();
        assert!(err.to_string().starts_with("ecdsa-new:"));
        let err = jwk.require("ecdsa-new", "y").unwrap_err();
        assert!(matches!(err, Error::MissingJwkMember("ecdsa-new", "y")));
    }
}
