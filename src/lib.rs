//! A unifying abstraction over asymmetric signing keys and key exchanges.
//!
//! Every supported algorithm sits behind one of two object-safe contracts:
//! [`Key`] for signing and verification (Ed25519, ECDSA over the NIST
//! curves, RSA-PSS) and [`KeyExchange`] for two-party agreement (raw
//! X25519 and NIST-curve ECDH). Keys serialize as JWK documents and PEM;
//! exchanges serialize to a compact tagged binary form.
//!
//! ```
//! use asymkey::{generate_key, key_from_jwk, KeyType};
//!
//! let key = generate_key(KeyType::Ed25519)?;
//! let restored = key_from_jwk(&key.to_jwk_bytes()?)?;
//! assert_eq!(restored.key_type(), KeyType::Ed25519);
//! # Ok::<(), asymkey::Error>(())
//! ```
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    explicit_outlives_requirements,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc
)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    macro_use_extern_crate,
    non_ascii_idents,
    elided_lifetimes_in_paths
)]
#![forbid(unsafe_code)]

mod error;
pub use error::{Error, Result};

mod types;
pub use types::{KeyType, KeyXType};

pub mod jwk;

mod key;
pub use key::{
    ec::EcKey, generate_key, key_from_jwk, key_from_jwk_str, okp::Ed25519Key, rsa::RsaKey, Key,
};

mod kx;
pub use kx::{
    generate_kx, kx_from_bytes, kx_from_str, kx_to_string, tag, Curve25519Exchange, EcdhExchange,
    KeyExchange,
};

mod pem;
pub use pem::key_from_pem;
