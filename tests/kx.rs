use asymkey::{generate_kx, kx_from_bytes, kx_from_str, kx_to_string, tag, Error, KeyXType};

const ALL_TYPES: [KeyXType; 4] = [
    KeyXType::Curve25519,
    KeyXType::Ecdh256,
    KeyXType::Ecdh384,
    KeyXType::Ecdh521,
];

#[test]
fn private_instances_roundtrip_through_bytes() {
    for kxt in ALL_TYPES {
        let kx = generate_kx(kxt).expect("generation should succeed");
        assert!(kx.is_private_key());
        assert_eq!(kx.key_type(), kxt);

        let bytes = kx.to_bytes();
        let restored = kx_from_bytes(&bytes).expect("serialized form should parse back");
        assert!(restored.is_private_key());
        assert_eq!(restored.key_type(), kxt);
        assert_eq!(restored.to_bytes(), bytes);
    }
}

#[test]
fn public_instances_roundtrip_through_text() {
    for kxt in ALL_TYPES {
        let public = generate_kx(kxt).unwrap().public_key();
        assert!(public.is_public_key());
        assert_eq!(public.key_type(), kxt);

        let text = kx_to_string(public.as_ref());
        let restored = kx_from_str(&text).expect("base64 form should parse back");
        assert!(restored.is_public_key());
        assert_eq!(restored.public_key_bytes(), public.public_key_bytes());
    }
}

#[test]
fn agreement_is_symmetric_for_every_type() {
    for kxt in ALL_TYPES {
        let alice = generate_kx(kxt).unwrap();
        let bob = generate_kx(kxt).unwrap();

        let from_alice = alice
            .shared_secret(bob.public_key().as_ref())
            .expect("private against public peer should agree");
        let from_bob = bob.shared_secret(alice.public_key().as_ref()).unwrap();
        assert_eq!(from_alice, from_bob, "both parties derive the same secret");
    }
}

#[test]
fn curve25519_secret_is_32_bytes() {
    let alice = generate_kx(KeyXType::Curve25519).unwrap();
    let bob = generate_kx(KeyXType::Curve25519).unwrap();
    let secret = alice.shared_secret(bob.public_key().as_ref()).unwrap();
    assert_eq!(secret.len(), 32);
}

#[test]
fn a_private_peer_is_rejected() {
    let alice = generate_kx(KeyXType::Curve25519).unwrap();
    let bob = generate_kx(KeyXType::Curve25519).unwrap();
    let err = alice.shared_secret(bob.as_ref()).unwrap_err();
    assert!(matches!(err, Error::MissingPublicKey(_)));
}

#[test]
fn families_do_not_mix() {
    let x25519 = generate_kx(KeyXType::Curve25519).unwrap();
    let ecdh = generate_kx(KeyXType::Ecdh256).unwrap();
    let err = x25519.shared_secret(ecdh.public_key().as_ref()).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedKeyExchangeType(_, KeyXType::Ecdh256)
    ));
}

#[test]
fn deriving_public_twice_yields_the_zero_value() {
    let public = generate_kx(KeyXType::Ecdh384).unwrap().public_key();
    let zero = public.public_key();
    assert_eq!(zero.key_type(), KeyXType::Unknown);
    assert!(!zero.is_private_key());
    assert!(!zero.is_public_key());
    assert!(zero.to_bytes().is_empty());
}

#[test]
fn unknown_tags_are_rejected() {
    let err = kx_from_bytes(&[0x00, 1, 2, 3]).unwrap_err();
    assert!(matches!(err, Error::UnknownKeyExchangeTag(0x00)));

    let err = kx_from_bytes(&[]).unwrap_err();
    assert!(matches!(err, Error::NoKeyMaterial(_)));
}

#[test]
fn truncated_material_is_rejected() {
    let cases = [
        (tag::CURVE25519_PRIVATE, 32usize),
        (tag::ECDH256_PRIVATE, 32),
        (tag::ECDH384_PRIVATE, 48),
        (tag::ECDH521_PRIVATE, 66),
        (tag::ECDH256_PUBLIC, 65),
    ];
    for (tag, expected) in cases {
        let mut input = vec![tag];
        input.extend_from_slice(&[0u8; 7]);
        let err = kx_from_bytes(&input).unwrap_err();
        match err {
            Error::TruncatedKeyMaterial {
                expected: e,
                actual,
                ..
            } => {
                assert_eq!(e, expected);
                assert_eq!(actual, 7);
            }
            other => panic!("expected a truncation error, got {other:?}"),
        }
    }
}

#[test]
fn generating_an_unknown_type_fails() {
    let err = generate_kx(KeyXType::Unknown).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedKeyExchangeType(_, KeyXType::Unknown)
    ));
}
