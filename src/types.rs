//! Registries for the supported key and key-exchange algorithms.
//!
//! Both enums are closed: every non-[`Unknown`](KeyType::Unknown) value maps
//! to exactly one lowercase canonical name and back. Name lookup is a total
//! function; an unrecognized name resolves to `Unknown`, never to an error,
//! so callers must treat `Unknown` as a distinct valid result requiring
//! their own validation.

use core::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The algorithm and size of a signing [`Key`](crate::Key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum KeyType {
    /// An unrecognized or unset key type.
    #[default]
    Unknown = 0,
    /// An Ed25519 key (fixed 256 bit).
    Ed25519 = 1,
    /// An ECDSA key over P-256.
    Ecdsa256 = 2,
    /// An ECDSA key over P-384.
    Ecdsa384 = 3,
    /// An ECDSA key over P-521.
    Ecdsa521 = 4,
    /// An RSA key with a 2048 bit modulus.
    Rsa2048 = 5,
    /// An RSA key with a 4096 bit modulus.
    Rsa4096 = 6,
    /// An RSA key with a 8192 bit modulus.
    Rsa8192 = 7,
}

/// The algorithm and curve size of a [`KeyExchange`](crate::KeyExchange).
///
/// Discriminants are reserved from a distinct offset so the two value
/// spaces never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum KeyXType {
    /// An unrecognized or unset key-exchange type.
    #[default]
    Unknown = 0,
    /// A raw X25519 key exchange with fixed 32-byte scalars.
    Curve25519 = 101,
    /// An EC Diffie-Hellman key exchange over P-256.
    Ecdh256 = 102,
    /// An EC Diffie-Hellman key exchange over P-384.
    Ecdh384 = 103,
    /// An EC Diffie-Hellman key exchange over P-521.
    Ecdh521 = 104,
}

impl KeyType {
    /// Every defined value, `Unknown` excluded.
    pub const ALL: [KeyType; 7] = [
        KeyType::Ed25519,
        KeyType::Ecdsa256,
        KeyType::Ecdsa384,
        KeyType::Ecdsa521,
        KeyType::Rsa2048,
        KeyType::Rsa4096,
        KeyType::Rsa8192,
    ];

    /// The lowercase canonical name of this key type.
    pub const fn name(self) -> &'static str {
        match self {
            KeyType::Unknown => "unknown",
            KeyType::Ed25519 => "ed25519",
            KeyType::Ecdsa256 => "ecdsa256",
            KeyType::Ecdsa384 => "ecdsa384",
            KeyType::Ecdsa521 => "ecdsa521",
            KeyType::Rsa2048 => "rsa2048",
            KeyType::Rsa4096 => "rsa4096",
            KeyType::Rsa8192 => "rsa8192",
        }
    }

    /// Looks up a key type by its canonical name, case-insensitively.
    ///
    /// Unrecognized names resolve to [`KeyType::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "ed25519" => KeyType::Ed25519,
            "ecdsa256" => KeyType::Ecdsa256,
            "ecdsa384" => KeyType::Ecdsa384,
            "ecdsa521" => KeyType::Ecdsa521,
            "rsa2048" => KeyType::Rsa2048,
            "rsa4096" => KeyType::Rsa4096,
            "rsa8192" => KeyType::Rsa8192,
            _ => KeyType::Unknown,
        }
    }
}

impl KeyXType {
    /// Every defined value, `Unknown` excluded.
    pub const ALL: [KeyXType; 4] = [
        KeyXType::Curve25519,
        KeyXType::Ecdh256,
        KeyXType::Ecdh384,
        KeyXType::Ecdh521,
    ];

    /// The lowercase canonical name of this key-exchange type.
    pub const fn name(self) -> &'static str {
        match self {
            KeyXType::Unknown => "unknown",
            KeyXType::Curve25519 => "curve25519",
            KeyXType::Ecdh256 => "ecdh256",
            KeyXType::Ecdh384 => "ecdh384",
            KeyXType::Ecdh521 => "ecdh521",
        }
    }

    /// Looks up a key-exchange type by its canonical name, case-insensitively.
    ///
    /// Unrecognized names resolve to [`KeyXType::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "curve25519" => KeyXType::Curve25519,
            "ecdh256" => KeyXType::Ecdh256,
            "ecdh384" => KeyXType::Ecdh384,
            "ecdh521" => KeyXType::Ecdh521,
            _ => KeyXType::Unknown,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for KeyXType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl FromStr for KeyXType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl Serialize for KeyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for KeyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

impl Serialize for KeyXType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for KeyXType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_names_roundtrip() {
        for kt in KeyType::ALL {
            assert_ne!(kt, KeyType::Unknown);
            assert_eq!(KeyType::from_name(kt.name()), kt);
            assert_eq!(kt.name(), kt.name().to_ascii_lowercase());
        }
    }

    #[test]
    fn key_xtype_names_roundtrip() {
        for kxt in KeyXType::ALL {
            assert_ne!(kxt, KeyXType::Unknown);
            assert_eq!(KeyXType::from_name(kxt.name()), kxt);
            assert_eq!(kxt.name(), kxt.name().to_ascii_lowercase());
        }
    }

    #[test]
    fn name_lookup_is_total() {
        assert_eq!(KeyType::from_name("no-such-key"), KeyType::Unknown);
        assert_eq!(KeyType::from_name(""), KeyType::Unknown);
        assert_eq!(KeyType::from_name("ECDSA256"), KeyType::Ecdsa256);
        assert_eq!(KeyXType::from_name("no-such-kx"), KeyXType::Unknown);
        assert_eq!(KeyXType::from_name("Curve25519"), KeyXType::Curve25519);
        assert_eq!("rsa4096".parse(), Ok(KeyType::Rsa4096));
    }

    #[test]
    fn serde_through_names() {
        let json = serde_json::to_string(&KeyType::Ed25519).unwrap();
        assert_eq!(json, "\"ed25519\"");
        let kt: KeyType = serde_json::from_str("\"rsa2048\"").unwrap();
        assert_eq!(kt, KeyType::Rsa2048);
        let kt: KeyType = serde_json::from_str("\"not-a-key\"").unwrap();
        assert_eq!(kt, KeyType::Unknown);

        let kxt: KeyXType = serde_json::from_str("\"ecdh521\"").unwrap();
        assert_eq!(kxt, KeyXType::Ecdh521);
    }

    #[test]
    fn value_spaces_are_disjoint() {
        for kt in KeyType::ALL {
            for kxt in KeyXType::ALL {
                assert_ne!(kt as u8, kxt as u8);
            }
        }
    }
}
