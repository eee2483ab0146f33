//! Key, signature and digest types
//!
//! Keys and signatures arrive as hex strings produced by an external signer.
//! They are decoded once, at construction, and carried as raw bytes.

use crate::error::{AssetAsmError, Result};
use crate::serialization::{ByteSerialize, SegmentWriter};
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

pub const PUBLIC_KEY_LENGTH: usize = 32;

pub const SIGNATURE_LENGTH: usize = 64;

pub const HASH_LENGTH: usize = 32;

/// Number of leading bytes shown by `Debug` implementations.
const BYTES_IN_DEBUG: usize = 4;

/// Decode exactly `N` bytes from a hex string, naming `field` on failure.
pub(crate) fn decode_hex_array<const N: usize>(field: &str, hex_str: &str) -> Result<[u8; N]> {
    if hex_str.len() != N * 2 {
        return Err(AssetAsmError::invalid_argument(
            field,
            format!("expected {} hex chars, got {}", N * 2, hex_str.len()),
        ));
    }
    let mut bytes = [0u8; N];
    hex::decode_to_slice(hex_str, &mut bytes)
        .map_err(|e| AssetAsmError::invalid_argument(field, e))?;
    Ok(bytes)
}

/// Render bytes as lowercase hex.
pub fn hex_string(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

macro_rules! hex_bytes_type {
    ($(#[$meta:meta])* $name:ident, $len:expr, $field:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub fn new(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            pub fn zero() -> Self {
                $name([0; $len])
            }

            /// Parse from a hex string of exactly twice the byte length.
            pub fn from_hex(hex_str: &str) -> Result<Self> {
                decode_hex_array::<$len>($field, hex_str).map($name)
            }

            /// Parse, reporting errors under a caller-supplied field name.
            pub fn from_hex_field(field: &str, hex_str: &str) -> Result<Self> {
                decode_hex_array::<$len>(field, hex_str).map($name)
            }

            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                if bytes.len() != $len {
                    return None;
                }
                let mut raw = [0u8; $len];
                raw.copy_from_slice(bytes);
                Some($name(raw))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    f,
                    "{}({}..)",
                    stringify!($name),
                    hex::encode(&self.0[..BYTES_IN_DEBUG])
                )
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let hex_str = String::deserialize(deserializer)?;
                $name::from_hex(&hex_str).map_err(de::Error::custom)
            }
        }

        impl ByteSerialize for $name {
            const SIZE: usize = $len;

            fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
                writer.put_bytes(at, &self.0)
            }
        }
    };
}

hex_bytes_type!(
    /// Ed25519 public key identifying a wallet.
    PublicKey,
    PUBLIC_KEY_LENGTH,
    "public key"
);

hex_bytes_type!(
    /// Detached signature produced by an external signer.
    Signature,
    SIGNATURE_LENGTH,
    "signature"
);

hex_bytes_type!(
    /// SHA-256 digest of an encoded message.
    TxHash,
    HASH_LENGTH,
    "hash"
);

/// SHA-256 digest of `data`.
pub fn hash(data: &[u8]) -> TxHash {
    let digest = Sha256::digest(data);
    let mut raw = [0u8; HASH_LENGTH];
    raw.copy_from_slice(&digest);
    TxHash::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_public_key_from_hex() {
        let pk = PublicKey::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(pk.as_bytes(), &[0xab; 32]);
        assert_eq!(pk.to_hex(), "ab".repeat(32));
    }

    #[test]
    fn test_public_key_rejects_short_input() {
        let err = PublicKey::from_hex(&"0".repeat(63)).unwrap_err();
        assert!(err.to_string().contains("public key"));
    }

    #[test]
    fn test_public_key_rejects_non_hex() {
        let err = PublicKey::from_hex(&"zz".repeat(32)).unwrap_err();
        assert!(matches!(err, AssetAsmError::InvalidArgument(_)));
    }

    #[test]
    fn test_signature_length_is_checked() {
        assert!(Signature::from_hex(&"1".repeat(128)).is_ok());

        let err = Signature::from_hex(&"1".repeat(63)).unwrap_err();
        assert!(err.to_string().contains("signature"));

        assert!(Signature::from_hex(&"1".repeat(130)).is_err());
    }

    #[test]
    fn test_field_name_in_error() {
        let err = Signature::from_hex_field("intermediary_signature", "00").unwrap_err();
        assert!(err.to_string().contains("intermediary_signature"));
    }

    #[test]
    fn test_hash_is_sha256() {
        let digest = hash(b"abc");
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_serde_uses_hex() {
        let pk = PublicKey::new([1; 32]);
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn test_hex_string_matches_digest_hex() {
        let digest = hash(b"abc");
        assert_eq!(hex_string(digest.as_ref()), digest.to_hex());
        assert_eq!(hex_string(&[0xAB, 0x01]), "ab01");
    }

    #[test]
    fn test_debug_is_truncated() {
        let pk = PublicKey::new([0xff; 32]);
        assert_eq!(format!("{:?}", pk), "PublicKey(ffffffff..)");
    }

    fn with_char_at(hex_str: &str, index: usize, bad: char) -> String {
        let mut out = hex_str.to_string();
        out.insert(index.min(hex_str.len()), bad);
        out
    }

    proptest! {
        #[test]
        fn prop_wrong_length_rejected(hex_str in "[0-9a-f]{0,160}") {
            prop_assume!(hex_str.len() != 64 && hex_str.len() != 128);
            prop_assert!(matches!(
                PublicKey::from_hex(&hex_str),
                Err(AssetAsmError::InvalidArgument(_))
            ));
            prop_assert!(matches!(
                Signature::from_hex(&hex_str),
                Err(AssetAsmError::InvalidArgument(_))
            ));
        }

        #[test]
        fn prop_non_hex_rejected(
            key in "[0-9a-f]{63}",
            signature in "[0-9a-f]{127}",
            index in 0usize..128,
            bad in "[g-zG-Z!#%&*+ _.-]",
        ) {
            let bad = bad.chars().next().unwrap();
            prop_assert!(matches!(
                PublicKey::from_hex(&with_char_at(&key, index, bad)),
                Err(AssetAsmError::InvalidArgument(_))
            ));
            prop_assert!(matches!(
                Signature::from_hex(&with_char_at(&signature, index, bad)),
                Err(AssetAsmError::InvalidArgument(_))
            ));
        }
    }
}
