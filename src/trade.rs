//! Sale of priced asset lots from a seller to a buyer.

use crate::assets::TradeAsset;
use crate::crypto::{PublicKey, Signature};
use crate::error::Result;
use crate::fees::FeeStrategy;
use crate::intermediary::Intermediary;
use crate::message::{MessageConfig, Transaction, TRADE_ID, TRADE_INTERMEDIARY_ID};
use crate::serialization::{
    encode_body, ByteSerialize, FieldCursor, SegmentWriter, SEGMENT_SLOT_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOffer {
    seller: PublicKey,
    buyer: PublicKey,
    assets: Vec<TradeAsset>,
    fee_strategy: FeeStrategy,
}

impl TradeOffer {
    pub const FIXED_SIZE: usize = 32 + 32 + SEGMENT_SLOT_SIZE + 1;

    pub fn new(seller: PublicKey, buyer: PublicKey, fee_strategy: FeeStrategy) -> Self {
        Self {
            seller,
            buyer,
            assets: Vec::new(),
            fee_strategy,
        }
    }

    pub fn add_asset(&mut self, asset: TradeAsset) {
        self.assets.push(asset);
    }

    pub fn seller(&self) -> &PublicKey {
        &self.seller
    }

    pub fn buyer(&self) -> &PublicKey {
        &self.buyer
    }

    pub fn assets(&self) -> &[TradeAsset] {
        &self.assets
    }

    pub fn fee_strategy(&self) -> FeeStrategy {
        self.fee_strategy
    }

    /// Sum of `amount * price` over all lots, `None` on overflow.
    pub fn total_price(&self) -> Option<u64> {
        self.assets
            .iter()
            .try_fold(0u64, |total, lot| total.checked_add(lot.total_price()?))
    }

    fn write_fields(&self, writer: &mut SegmentWriter, cursor: &mut FieldCursor) -> Result<()> {
        cursor.field(writer, &self.seller)?;
        cursor.field(writer, &self.buyer)?;
        cursor.field(writer, &self.assets)?;
        cursor.field(writer, &self.fee_strategy)
    }

    /// Standalone encoding of the offer, the payload the seller signs.
    pub fn offer_bytes(&self) -> Result<Vec<u8>> {
        encode_body(Self::FIXED_SIZE, |writer, base| {
            self.write_fields(writer, &mut FieldCursor::new(base))
        })
    }
}

impl ByteSerialize for TradeOffer {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_detached_record(at, Self::FIXED_SIZE, |w, base| {
            self.write_fields(w, &mut FieldCursor::new(base))
        })
    }
}

/// Trade offer brokered by an intermediary. Buyer precedes seller on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOfferIntermediary {
    intermediary: Intermediary,
    buyer: PublicKey,
    seller: PublicKey,
    assets: Vec<TradeAsset>,
    fee_strategy: FeeStrategy,
}

impl TradeOfferIntermediary {
    pub const FIXED_SIZE: usize = Intermediary::SIZE + 32 + 32 + SEGMENT_SLOT_SIZE + 1;

    pub fn new(
        intermediary: Intermediary,
        seller: PublicKey,
        buyer: PublicKey,
        fee_strategy: FeeStrategy,
    ) -> Self {
        Self {
            intermediary,
            buyer,
            seller,
            assets: Vec::new(),
            fee_strategy,
        }
    }

    pub fn add_asset(&mut self, asset: TradeAsset) {
        self.assets.push(asset);
    }

    pub fn intermediary(&self) -> &Intermediary {
        &self.intermediary
    }

    pub fn seller(&self) -> &PublicKey {
        &self.seller
    }

    pub fn buyer(&self) -> &PublicKey {
        &self.buyer
    }

    pub fn assets(&self) -> &[TradeAsset] {
        &self.assets
    }

    pub fn fee_strategy(&self) -> FeeStrategy {
        self.fee_strategy
    }

    fn write_fields(&self, writer: &mut SegmentWriter, cursor: &mut FieldCursor) -> Result<()> {
        cursor.field(writer, &self.intermediary)?;
        cursor.field(writer, &self.buyer)?;
        cursor.field(writer, &self.seller)?;
        cursor.field(writer, &self.assets)?;
        cursor.field(writer, &self.fee_strategy)
    }

    pub fn offer_bytes(&self) -> Result<Vec<u8>> {
        encode_body(Self::FIXED_SIZE, |writer, base| {
            self.write_fields(writer, &mut FieldCursor::new(base))
        })
    }
}

impl ByteSerialize for TradeOfferIntermediary {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_detached_record(at, Self::FIXED_SIZE, |w, base| {
            self.write_fields(w, &mut FieldCursor::new(base))
        })
    }
}

#[derive(Debug, Clone)]
pub struct Trade {
    config: MessageConfig,
    offer: TradeOffer,
    seed: u64,
    seller_signature: Signature,
}

impl Trade {
    pub fn new(offer: TradeOffer, seller_signature: Signature, seed: u64) -> Self {
        Self {
            config: MessageConfig::default(),
            offer,
            seed,
            seller_signature,
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn offer(&self) -> &TradeOffer {
        &self.offer
    }

    pub fn seller_signature(&self) -> &Signature {
        &self.seller_signature
    }
}

impl Transaction for Trade {
    const MESSAGE_TYPE: u16 = TRADE_ID;
    const BODY_SIZE: usize = SEGMENT_SLOT_SIZE + 8 + Signature::SIZE;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.offer)?;
        cursor.field(writer, &self.seed)?;
        cursor.field(writer, &self.seller_signature)
    }
}

#[derive(Debug, Clone)]
pub struct TradeIntermediary {
    config: MessageConfig,
    offer: TradeOfferIntermediary,
    seed: u64,
    seller_signature: Signature,
    intermediary_signature: Signature,
    memo: String,
}

impl TradeIntermediary {
    pub fn new(
        offer: TradeOfferIntermediary,
        seller_signature: Signature,
        intermediary_signature: Signature,
        seed: u64,
        memo: &str,
    ) -> Self {
        Self {
            config: MessageConfig::default(),
            offer,
            seed,
            seller_signature,
            intermediary_signature,
            memo: memo.to_string(),
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn offer(&self) -> &TradeOfferIntermediary {
        &self.offer
    }
}

impl Transaction for TradeIntermediary {
    const MESSAGE_TYPE: u16 = TRADE_INTERMEDIARY_ID;
    const BODY_SIZE: usize =
        SEGMENT_SLOT_SIZE + 8 + Signature::SIZE + Signature::SIZE + SEGMENT_SLOT_SIZE;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.offer)?;
        cursor.field(writer, &self.seed)?;
        cursor.field(writer, &self.seller_signature)?;
        cursor.field(writer, &self.intermediary_signature)?;
        cursor.field(writer, self.memo.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageHeader, HEADER_LENGTH};
    use proptest::prelude::*;

    const ID_X: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    const ID_Y: &str = "2222222222222222222222222222222222222222222222222222222222222222";

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn trade_with(ids: &[&str]) -> Trade {
        let mut offer = TradeOffer::new(
            PublicKey::new([1; 32]),
            PublicKey::new([2; 32]),
            FeeStrategy::Sender,
        );
        for id in ids {
            offer.add_asset(TradeAsset::from_hex(id, 1, 10).unwrap());
        }
        Trade::new(offer, Signature::new([7; 64]), 4)
    }

    #[test]
    fn test_trade_layout() {
        let raw = trade_with(&[ID_X]).to_bytes().unwrap();
        let header = MessageHeader::from_bytes(&raw).unwrap();
        let body = &raw[HEADER_LENGTH..];

        assert_eq!(header.message_type(), TRADE_ID);
        assert_eq!(Trade::BODY_SIZE, 80);
        assert_eq!(read_u32(body, 0), 80);
        assert_eq!(read_u32(body, 4) as usize, TradeOffer::FIXED_SIZE + 48);
        assert_eq!(body[8], 4);
        assert_eq!(&body[16..80], &[7; 64]);

        // offer: seller, buyer, lots slot (relative to the offer), strategy
        assert_eq!(&body[80..112], &[1; 32]);
        assert_eq!(&body[112..144], &[2; 32]);
        assert_eq!(read_u32(body, 144) as usize, TradeOffer::FIXED_SIZE);
        assert_eq!(read_u32(body, 148), 48);
        assert_eq!(body[152], 2);
        assert_eq!(body.len(), 80 + 73 + 48);
    }

    #[test]
    fn test_embedded_offer_is_signed_payload() {
        let tx = trade_with(&[ID_X, ID_Y]);
        let raw = tx.to_bytes().unwrap();
        let body = &raw[HEADER_LENGTH..];
        let (at, len) = (read_u32(body, 0) as usize, read_u32(body, 4) as usize);

        assert_eq!(&body[at..at + len], tx.offer().offer_bytes().unwrap().as_slice());
    }

    #[test]
    fn test_embedded_intermediary_offer_is_signed_payload() {
        let mut offer = TradeOfferIntermediary::new(
            Intermediary::new(PublicKey::new([9; 32]), 3),
            PublicKey::new([1; 32]),
            PublicKey::new([2; 32]),
            FeeStrategy::Intermediary,
        );
        offer.add_asset(TradeAsset::from_hex(ID_X, 1, 2).unwrap());
        offer.add_asset(TradeAsset::from_hex(ID_Y, 3, 4).unwrap());
        let signed = offer.offer_bytes().unwrap();

        let tx = TradeIntermediary::new(offer, Signature::zero(), Signature::zero(), 0, "m");
        let raw = tx.to_bytes().unwrap();
        let body = &raw[HEADER_LENGTH..];
        let (at, len) = (read_u32(body, 0) as usize, read_u32(body, 4) as usize);

        assert_eq!(at, TradeIntermediary::BODY_SIZE);
        assert_eq!(&body[at..at + len], signed.as_slice());
    }

    #[test]
    fn test_lot_order_matters() {
        let forward = trade_with(&[ID_X, ID_Y]).to_bytes().unwrap();
        let backward = trade_with(&[ID_Y, ID_X]).to_bytes().unwrap();
        assert_eq!(forward.len(), backward.len());
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_trade_offer_total_price() {
        let mut offer = TradeOffer::new(PublicKey::zero(), PublicKey::zero(), FeeStrategy::Sender);
        offer.add_asset(TradeAsset::from_hex(ID_X, 2, 5).unwrap());
        offer.add_asset(TradeAsset::from_hex(ID_Y, 3, 1).unwrap());
        assert_eq!(offer.total_price(), Some(13));

        offer.add_asset(TradeAsset::from_hex(ID_Y, u64::MAX, 1).unwrap());
        assert_eq!(offer.total_price(), None);
    }

    #[test]
    fn test_trade_intermediary_puts_buyer_first() {
        let mut offer = TradeOfferIntermediary::new(
            Intermediary::new(PublicKey::new([9; 32]), 1),
            PublicKey::new([1; 32]),
            PublicKey::new([2; 32]),
            FeeStrategy::Intermediary,
        );
        offer.add_asset(TradeAsset::from_hex(ID_X, 1, 1).unwrap());
        let raw = offer.offer_bytes().unwrap();

        assert_eq!(TradeOfferIntermediary::FIXED_SIZE, 113);
        assert_eq!(&raw[..32], &[9; 32]);
        assert_eq!(&raw[40..72], &[2; 32]);
        assert_eq!(&raw[72..104], &[1; 32]);
        assert_eq!(read_u32(&raw, 104), 113);
        assert_eq!(raw[112], 4);
    }

    #[test]
    fn test_trade_intermediary_layout() {
        let offer = TradeOfferIntermediary::new(
            Intermediary::new(PublicKey::zero(), 0),
            PublicKey::zero(),
            PublicKey::zero(),
            FeeStrategy::Recipient,
        );
        let tx = TradeIntermediary::new(
            offer,
            Signature::new([0xaa; 64]),
            Signature::new([0xbb; 64]),
            0,
            "memo",
        );
        let raw = tx.to_bytes().unwrap();
        let body = &raw[HEADER_LENGTH..];

        assert_eq!(TradeIntermediary::BODY_SIZE, 152);
        assert_eq!(&body[16..80], &[0xaa; 64]);
        assert_eq!(&body[80..144], &[0xbb; 64]);
        assert_eq!(read_u32(body, 148), 4);
        assert_eq!(&body[body.len() - 4..], b"memo");
        assert_eq!(
            MessageHeader::from_bytes(&raw).unwrap().message_type(),
            TRADE_INTERMEDIARY_ID
        );
    }

    proptest! {
        #[test]
        fn prop_trade_encoding_is_deterministic(seed in any::<u64>(), amount in any::<u64>()) {
            let mut offer = TradeOffer::new(PublicKey::zero(), PublicKey::zero(), FeeStrategy::Recipient);
            offer.add_asset(TradeAsset::from_hex(ID_X, amount, 1).unwrap());
            let mut tx = Trade::new(offer, Signature::zero(), seed);
            let first = tx.finalize().unwrap();
            prop_assert_eq!(first, tx.finalize().unwrap());
        }
    }
}
