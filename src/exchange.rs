//! Asset exchange between two wallets, optionally brokered by an intermediary.
//!
//! The offer is assembled first (participants, strategy, then assets on each
//! side), signed off-line by the sender over [`ExchangeOffer::offer_bytes`],
//! and finally wrapped together with that signature into an `Exchange`.

use crate::assets::Asset;
use crate::crypto::{PublicKey, Signature};
use crate::error::Result;
use crate::fees::FeeStrategy;
use crate::intermediary::Intermediary;
use crate::message::{MessageConfig, Transaction, EXCHANGE_ID, EXCHANGE_INTERMEDIARY_ID};
use crate::serialization::{
    encode_body, ByteSerialize, FieldCursor, SegmentWriter, SEGMENT_SLOT_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOffer {
    sender: PublicKey,
    sender_assets: Vec<Asset>,
    sender_value: u64,
    recipient: PublicKey,
    recipient_assets: Vec<Asset>,
    fee_strategy: FeeStrategy,
}

impl ExchangeOffer {
    pub const FIXED_SIZE: usize = 32 + SEGMENT_SLOT_SIZE + 8 + 32 + SEGMENT_SLOT_SIZE + 1;

    pub fn new(
        sender: PublicKey,
        sender_value: u64,
        recipient: PublicKey,
        fee_strategy: FeeStrategy,
    ) -> Self {
        Self {
            sender,
            sender_assets: Vec::new(),
            sender_value,
            recipient,
            recipient_assets: Vec::new(),
            fee_strategy,
        }
    }

    pub fn add_sender_asset(&mut self, asset: Asset) {
        self.sender_assets.push(asset);
    }

    pub fn add_recipient_asset(&mut self, asset: Asset) {
        self.recipient_assets.push(asset);
    }

    pub fn sender(&self) -> &PublicKey {
        &self.sender
    }

    pub fn sender_assets(&self) -> &[Asset] {
        &self.sender_assets
    }

    pub fn sender_value(&self) -> u64 {
        self.sender_value
    }

    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }

    pub fn recipient_assets(&self) -> &[Asset] {
        &self.recipient_assets
    }

    pub fn fee_strategy(&self) -> FeeStrategy {
        self.fee_strategy
    }

    fn write_fields(&self, writer: &mut SegmentWriter, cursor: &mut FieldCursor) -> Result<()> {
        cursor.field(writer, &self.sender)?;
        cursor.field(writer, &self.sender_assets)?;
        cursor.field(writer, &self.sender_value)?;
        cursor.field(writer, &self.recipient)?;
        cursor.field(writer, &self.recipient_assets)?;
        cursor.field(writer, &self.fee_strategy)
    }

    /// Standalone encoding of the offer, the payload the sender signs.
    pub fn offer_bytes(&self) -> Result<Vec<u8>> {
        encode_body(Self::FIXED_SIZE, |writer, base| {
            self.write_fields(writer, &mut FieldCursor::new(base))
        })
    }
}

impl ByteSerialize for ExchangeOffer {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_detached_record(at, Self::FIXED_SIZE, |w, base| {
            self.write_fields(w, &mut FieldCursor::new(base))
        })
    }
}

/// Exchange offer with an intermediary taking a commission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOfferIntermediary {
    intermediary: Intermediary,
    offer: ExchangeOffer,
}

impl ExchangeOfferIntermediary {
    pub const FIXED_SIZE: usize = Intermediary::SIZE + ExchangeOffer::FIXED_SIZE;

    pub fn new(
        intermediary: Intermediary,
        sender: PublicKey,
        sender_value: u64,
        recipient: PublicKey,
        fee_strategy: FeeStrategy,
    ) -> Self {
        Self {
            intermediary,
            offer: ExchangeOffer::new(sender, sender_value, recipient, fee_strategy),
        }
    }

    pub fn add_sender_asset(&mut self, asset: Asset) {
        self.offer.add_sender_asset(asset);
    }

    pub fn add_recipient_asset(&mut self, asset: Asset) {
        self.offer.add_recipient_asset(asset);
    }

    pub fn intermediary(&self) -> &Intermediary {
        &self.intermediary
    }

    /// The two-party terms of the offer.
    pub fn terms(&self) -> &ExchangeOffer {
        &self.offer
    }

    fn write_fields(&self, writer: &mut SegmentWriter, cursor: &mut FieldCursor) -> Result<()> {
        cursor.field(writer, &self.intermediary)?;
        self.offer.write_fields(writer, cursor)
    }

    /// Standalone encoding of the offer, signed by sender and intermediary.
    pub fn offer_bytes(&self) -> Result<Vec<u8>> {
        encode_body(Self::FIXED_SIZE, |writer, base| {
            self.write_fields(writer, &mut FieldCursor::new(base))
        })
    }
}

impl ByteSerialize for ExchangeOfferIntermediary {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_detached_record(at, Self::FIXED_SIZE, |w, base| {
            self.write_fields(w, &mut FieldCursor::new(base))
        })
    }
}

#[derive(Debug, Clone)]
pub struct Exchange {
    config: MessageConfig,
    offer: ExchangeOffer,
    seed: u64,
    sender_signature: Signature,
    memo: String,
}

impl Exchange {
    pub fn new(offer: ExchangeOffer, sender_signature: Signature, seed: u64, memo: &str) -> Self {
        Self {
            config: MessageConfig::default(),
            offer,
            seed,
            sender_signature,
            memo: memo.to_string(),
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn offer(&self) -> &ExchangeOffer {
        &self.offer
    }

    pub fn sender_signature(&self) -> &Signature {
        &self.sender_signature
    }
}

impl Transaction for Exchange {
    const MESSAGE_TYPE: u16 = EXCHANGE_ID;
    const BODY_SIZE: usize = SEGMENT_SLOT_SIZE + 8 + Signature::SIZE + SEGMENT_SLOT_SIZE;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.offer)?;
        cursor.field(writer, &self.seed)?;
        cursor.field(writer, &self.sender_signature)?;
        cursor.field(writer, self.memo.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ExchangeIntermediary {
    config: MessageConfig,
    offer: ExchangeOfferIntermediary,
    seed: u64,
    sender_signature: Signature,
    intermediary_signature: Signature,
    memo: String,
}

impl ExchangeIntermediary {
    pub fn new(
        offer: ExchangeOfferIntermediary,
        sender_signature: Signature,
        intermediary_signature: Signature,
        seed: u64,
        memo: &str,
    ) -> Self {
        Self {
            config: MessageConfig::default(),
            offer,
            seed,
            sender_signature,
            intermediary_signature,
            memo: memo.to_string(),
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn offer(&self) -> &ExchangeOfferIntermediary {
        &self.offer
    }
}

impl Transaction for ExchangeIntermediary {
    const MESSAGE_TYPE: u16 = EXCHANGE_INTERMEDIARY_ID;
    const BODY_SIZE: usize =
        SEGMENT_SLOT_SIZE + 8 + Signature::SIZE + Signature::SIZE + SEGMENT_SLOT_SIZE;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.offer)?;
        cursor.field(writer, &self.seed)?;
        cursor.field(writer, &self.sender_signature)?;
        cursor.field(writer, &self.intermediary_signature)?;
        cursor.field(writer, self.memo.as_str())
    }
}
