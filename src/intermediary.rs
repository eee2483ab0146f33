//! Third-party wallet that brokers an offer for a commission.

use crate::crypto::PublicKey;
use crate::error::Result;
use crate::serialization::{ByteSerialize, FieldCursor, SegmentWriter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intermediary {
    wallet: PublicKey,
    commission: u64,
}

impl Intermediary {
    pub fn new(wallet: PublicKey, commission: u64) -> Self {
        Self { wallet, commission }
    }

    pub fn from_hex(wallet: &str, commission: u64) -> Result<Self> {
        Ok(Self::new(
            PublicKey::from_hex_field("intermediary wallet", wallet)?,
            commission,
        ))
    }

    pub fn wallet(&self) -> &PublicKey {
        &self.wallet
    }

    pub fn commission(&self) -> u64 {
        self.commission
    }
}

impl ByteSerialize for Intermediary {
    const SIZE: usize = 40;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(at);
        cursor.field(writer, &self.wallet)?;
        cursor.field(writer, &self.commission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::encode_body;

    #[test]
    fn test_intermediary_layout() {
        let intermediary = Intermediary::from_hex(&"cd".repeat(32), 250).unwrap();
        let body = encode_body(Intermediary::SIZE, |w, base| {
            intermediary.serialize_bytes(w, base)
        })
        .unwrap();

        assert_eq!(&body[..32], &[0xcd; 32]);
        assert_eq!(&body[32..], &250u64.to_le_bytes());
    }

    #[test]
    fn test_intermediary_rejects_bad_wallet() {
        let err = Intermediary::from_hex("cd", 1).unwrap_err();
        assert!(err.to_string().contains("intermediary wallet"));
    }
}
