use asymkey::{generate_key, key_from_jwk, key_from_jwk_str, Error, KeyType};
use sha2::{Digest, Sha256};

// RFC 7515 appendix A.3, the ES256 example key.
const RFC7515_EC_JWK: &str = r#"{"kty":"EC","crv":"P-256",
 "x":"f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
 "y":"x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0",
 "d":"jpsQnnGQmL-YBIffH1136cspYG6-0iY7X1fCE9-E9LI"}"#;

#[test]
fn generated_keys_roundtrip_through_jwk() {
    // the larger RSA sizes generate too slowly for a test run
    for kt in [
        KeyType::Ed25519,
        KeyType::Ecdsa256,
        KeyType::Ecdsa384,
        KeyType::Ecdsa521,
        KeyType::Rsa2048,
    ] {
        let key = generate_key(kt).expect("generation should succeed");
        assert!(key.is_private_key());
        assert!(!key.is_public_key());

        let restored =
            key_from_jwk(&key.to_jwk_bytes().unwrap()).expect("serialized JWK should parse back");
        assert_eq!(restored.key_type(), kt);
        assert!(restored.is_private_key());
        assert_eq!(
            restored.to_jwk_bytes().unwrap(),
            key.to_jwk_bytes().unwrap(),
            "reserialization should be stable"
        );
    }
}

#[test]
fn public_half_roundtrips_through_jwk() {
    for kt in [KeyType::Ed25519, KeyType::Ecdsa384, KeyType::Rsa2048] {
        let key = generate_key(kt).unwrap();
        let public = key.public_key().expect("private key derives its public half");
        assert!(public.is_public_key());
        assert!(!public.is_private_key());
        assert_eq!(public.key_type(), kt);

        let restored = key_from_jwk(&public.to_jwk_bytes().unwrap()).unwrap();
        assert!(restored.is_public_key());
        assert_eq!(restored.key_type(), kt);
    }
}

#[test]
fn public_instance_cannot_derive_further() {
    let key = generate_key(KeyType::Ecdsa256).unwrap();
    let public = key.public_key().unwrap();
    let err = public.public_key().unwrap_err();
    assert!(matches!(err, Error::MissingPrivateKey(_)));
}

#[test]
fn sign_verify_hello_world() {
    // hash-then-sign with ECDSA, the canonical usage
    let key = generate_key(KeyType::Ecdsa256).unwrap();
    let hashed = Sha256::digest(b"hello world");

    let signed = key.sign(&hashed).expect("private key signs");
    let public = key.public_key().unwrap();
    assert!(public.verify(&signed, &hashed));

    // any mutation must fail closed
    let mut tampered = signed.clone();
    tampered[8] ^= 0x01;
    assert!(!public.verify(&tampered, &hashed));
    assert!(!public.verify(&signed, &Sha256::digest(b"hello world!")));
    assert!(!public.verify(&[], &hashed));
}

#[test]
fn ecdsa_signs_on_every_curve() {
    // P-521 signs through a different path than the other two curves
    for kt in [KeyType::Ecdsa256, KeyType::Ecdsa384, KeyType::Ecdsa521] {
        let key = generate_key(kt).unwrap();
        let hashed = Sha256::digest(b"curve coverage");

        let signed = key.sign(&hashed).expect("every advertised curve signs");
        let public = key.public_key().unwrap();
        assert!(public.verify(&signed, &hashed));

        let mut tampered = signed.clone();
        tampered[4] ^= 0x01;
        assert!(!public.verify(&tampered, &hashed));
    }
}

#[test]
fn ed25519_signs_the_raw_message() {
    // no prehash for this family, the message goes in as-is
    let key = generate_key(KeyType::Ed25519).unwrap();
    let message = b"attached signature input";

    let signed = key.sign(message).unwrap();
    assert_eq!(signed.len(), 64);

    let public = key.public_key().unwrap();
    assert!(public.verify(&signed, message));
    assert!(!public.verify(&signed, b"attached signature inpuT"));
}

#[test]
fn rsa_pss_signatures_verify() {
    let key = generate_key(KeyType::Rsa2048).unwrap();
    let hashed = Sha256::digest(b"pss input");

    let signed = key.sign(&hashed).unwrap();
    assert_eq!(signed.len(), 256, "signature width matches the modulus");

    let public = key.public_key().unwrap();
    assert!(public.verify(&signed, &hashed));

    let mut tampered = signed.clone();
    tampered[0] ^= 0x80;
    assert!(!public.verify(&tampered, &hashed));
}

#[test]
fn verify_on_private_instance_is_false() {
    let key = generate_key(KeyType::Ed25519).unwrap();
    let message = b"classification gate";
    let signed = key.sign(message).unwrap();

    // verification is reserved for public-classified instances
    assert!(!key.verify(&signed, message));
    assert!(key.public_key().unwrap().verify(&signed, message));
}

#[test]
fn signing_requires_private_material() {
    let public = generate_key(KeyType::Ecdsa384)
        .unwrap()
        .public_key()
        .unwrap();
    let err = public.sign(&Sha256::digest(b"x")).unwrap_err();
    assert!(matches!(err, Error::MissingPrivateKey(_)));
}

#[test]
fn rfc7515_example_key_parses_and_signs() {
    let key = key_from_jwk_str(RFC7515_EC_JWK).expect("the RFC example should parse");
    assert_eq!(key.key_type(), KeyType::Ecdsa256);
    assert!(key.is_private_key());

    let hashed = Sha256::digest(b"example payload");
    let signed = key.sign(&hashed).unwrap();
    assert!(key.public_key().unwrap().verify(&signed, &hashed));
}

#[test]
fn jwk_serialization_carries_the_key_id() {
    let mut key = generate_key(KeyType::Ed25519).unwrap();
    key.set_key_id("2026-signing-key");
    assert_eq!(key.key_id(), Some("2026-signing-key"));

    let json = String::from_utf8(key.to_jwk_bytes().unwrap()).unwrap();
    assert!(json.contains("\"kid\":\"2026-signing-key\""));

    let restored = key_from_jwk_str(&json).unwrap();
    assert_eq!(restored.key_id(), Some("2026-signing-key"));
}

#[test]
fn default_key_id_is_the_thumbprint() {
    // without an explicit kid the RFC 7638 thumbprint fills in, and it is
    // identical for a key and its public half
    let key = generate_key(KeyType::Ecdsa256).unwrap();
    let private_json: serde_json::Value =
        serde_json::from_slice(&key.to_jwk_bytes().unwrap()).unwrap();
    let public_json: serde_json::Value =
        serde_json::from_slice(&key.public_key().unwrap().to_jwk_bytes().unwrap()).unwrap();

    let kid = private_json["kid"].as_str().expect("kid should be present");
    assert!(!kid.is_empty());
    assert_eq!(public_json["kid"], private_json["kid"]);
}

#[test]
fn unsupported_jwk_families_are_rejected() {
    let err = key_from_jwk_str(r#"{"kty":"oct","k":"AAA"}"#).unwrap_err();
    assert!(matches!(err, Error::UnsupportedJwk(_, _)));

    let err = key_from_jwk_str(r#"{"kty":"EC","crv":"secp256k1","x":"AAAA","y":"AAAA"}"#)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedJwk(_, _)));
}

#[test]
fn missing_members_are_named() {
    // an EC key without its y coordinate
    let err = key_from_jwk_str(r#"{"kty":"EC","crv":"P-256","x":"AAAA"}"#).unwrap_err();
    assert!(matches!(err, Error::MissingJwkMember(_, "y")));
}

#[test]
fn generating_an_unknown_type_fails() {
    let err = generate_key(KeyType::Unknown).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedKeyType(_, KeyType::Unknown)
    ));
}
