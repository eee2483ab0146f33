//! Asset value types

use crate::crypto::PublicKey;
use crate::error::{AssetAsmError, Result};
use crate::fees::Fees;
use crate::serialization::{ByteSerialize, FieldCursor, SegmentWriter, SEGMENT_SLOT_SIZE};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

pub const ASSET_ID_LENGTH: usize = 32;

/// 32-byte asset identifier. The textual form is strictly lowercase hex so
/// that one id has exactly one spelling.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId([u8; ASSET_ID_LENGTH]);

impl AssetId {
    pub fn new(bytes: [u8; ASSET_ID_LENGTH]) -> Self {
        AssetId(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if let Some(bad) = hex_str
            .chars()
            .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
        {
            return Err(AssetAsmError::invalid_argument(
                "asset id",
                format!("invalid character {:?}, expected lowercase hex", bad),
            ));
        }
        crate::crypto::decode_hex_array::<ASSET_ID_LENGTH>("asset id", hex_str).map(AssetId)
    }

    pub fn as_bytes(&self) -> &[u8; ASSET_ID_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AssetId({})", self.to_hex())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        AssetId::from_hex(&hex_str).map_err(de::Error::custom)
    }
}

impl ByteSerialize for AssetId {
    const SIZE: usize = ASSET_ID_LENGTH;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_bytes(at, &self.0)
    }
}

/// An amount of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    id: AssetId,
    amount: u64,
}

impl Asset {
    pub fn new(id: AssetId, amount: u64) -> Self {
        Self { id, amount }
    }

    /// Parse the id from hex.
    pub fn from_hex(id: &str, amount: u64) -> Result<Self> {
        Ok(Self::new(AssetId::from_hex(id)?, amount))
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

impl ByteSerialize for Asset {
    const SIZE: usize = 40;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(at);
        cursor.field(writer, &self.id)?;
        cursor.field(writer, &self.amount)
    }
}

/// An amount of one asset offered at a unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeAsset {
    id: AssetId,
    amount: u64,
    price: u64,
}

impl TradeAsset {
    pub fn new(id: AssetId, amount: u64, price: u64) -> Self {
        Self { id, amount, price }
    }

    pub fn from_hex(id: &str, amount: u64, price: u64) -> Result<Self> {
        Ok(Self::new(AssetId::from_hex(id)?, amount, price))
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    /// Total price of the lot, `None` on overflow.
    pub fn total_price(&self) -> Option<u64> {
        self.amount.checked_mul(self.price)
    }
}

impl ByteSerialize for TradeAsset {
    const SIZE: usize = 48;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(at);
        cursor.field(writer, &self.id)?;
        cursor.field(writer, &self.amount)?;
        cursor.field(writer, &self.price)
    }
}

/// A new asset to be minted by `AddAssets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaAsset {
    receiver: PublicKey,
    data: String,
    amount: u64,
    fees: Fees,
}

impl MetaAsset {
    /// Fixed section: receiver, data slot, amount, fees.
    pub const FIXED_SIZE: usize = 32 + SEGMENT_SLOT_SIZE + 8 + 72;

    pub fn new(receiver: PublicKey, data: &str, amount: u64, fees: Fees) -> Result<Self> {
        if data.is_empty() {
            return Err(AssetAsmError::invalid_argument("meta", "must not be empty"));
        }
        Ok(Self {
            receiver,
            data: data.to_string(),
            amount,
            fees,
        })
    }

    pub fn receiver(&self) -> &PublicKey {
        &self.receiver
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn fees(&self) -> &Fees {
        &self.fees
    }
}

impl ByteSerialize for MetaAsset {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_record(at, Self::FIXED_SIZE, |w, base| {
            let mut cursor = FieldCursor::new(base);
            cursor.field(w, &self.receiver)?;
            cursor.field(w, self.data.as_str())?;
            cursor.field(w, &self.amount)?;
            cursor.field(w, &self.fees)
        })
    }
}
