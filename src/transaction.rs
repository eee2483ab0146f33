//! Asset lifecycle transactions
//!
//! `AddAssets`, `DeleteAssets` and `Transfer` accumulate assets one at a
//! time and are sealed by their first `finalize`. `TransferWithFeesPayer`
//! moves the same kind of payload but lets a third wallet, which signs the
//! [`TransferOffer`], cover the fees. `AskOffer` and `BidOffer` publish a
//! single priced lot to the order book.

use crate::assets::{Asset, MetaAsset, TradeAsset};
use crate::crypto::{PublicKey, Signature};
use crate::error::{AssetAsmError, Result};
use crate::fees::Fees;
use crate::message::{
    MessageConfig, Transaction, ADD_ASSETS_ID, ASK_OFFER_ID, BID_OFFER_ID, DELETE_ASSETS_ID,
    TRANSFER_FEES_PAYER_ID, TRANSFER_ID,
};
use crate::serialization::{
    encode_body, ByteSerialize, FieldCursor, SegmentWriter, SEGMENT_SLOT_SIZE,
};

/// Guard shared by builders that reject additions after finalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seal {
    sealed: bool,
}

impl Seal {
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.sealed {
            return Err(AssetAsmError::InvalidState(format!(
                "{} after the transaction was finalized",
                operation
            )));
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.sealed = true;
    }
}

/// Mint new assets to their receivers.
#[derive(Debug, Clone)]
pub struct AddAssets {
    config: MessageConfig,
    pub_key: PublicKey,
    meta_assets: Vec<MetaAsset>,
    seed: u64,
    seal: Seal,
}

impl AddAssets {
    pub fn new(pub_key: PublicKey, seed: u64) -> Self {
        Self {
            config: MessageConfig::default(),
            pub_key,
            meta_assets: Vec::new(),
            seed,
            seal: Seal::default(),
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_asset(&mut self, asset: MetaAsset) -> Result<()> {
        self.seal.check("add_asset")?;
        self.meta_assets.push(asset);
        Ok(())
    }

    /// Build the entry from its parts and append it.
    pub fn add_asset_parts(
        &mut self,
        data: &str,
        amount: u64,
        fees: Fees,
        receiver: PublicKey,
    ) -> Result<()> {
        self.seal.check("add_asset")?;
        self.add_asset(MetaAsset::new(receiver, data, amount, fees)?)
    }

    pub fn pub_key(&self) -> &PublicKey {
        &self.pub_key
    }

    pub fn meta_assets(&self) -> &[MetaAsset] {
        &self.meta_assets
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Transaction for AddAssets {
    const MESSAGE_TYPE: u16 = ADD_ASSETS_ID;
    const BODY_SIZE: usize = 32 + SEGMENT_SLOT_SIZE + 8;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.pub_key)?;
        cursor.field(writer, &self.meta_assets)?;
        cursor.field(writer, &self.seed)
    }

    fn seal(&mut self) {
        self.seal.close();
    }
}

/// Burn assets held by the author.
#[derive(Debug, Clone)]
pub struct DeleteAssets {
    config: MessageConfig,
    pub_key: PublicKey,
    assets: Vec<Asset>,
    seed: u64,
    seal: Seal,
}

impl DeleteAssets {
    pub fn new(pub_key: PublicKey, seed: u64) -> Self {
        Self {
            config: MessageConfig::default(),
            pub_key,
            assets: Vec::new(),
            seed,
            seal: Seal::default(),
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<()> {
        self.seal.check("add_asset")?;
        self.assets.push(asset);
        Ok(())
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }
}

impl Transaction for DeleteAssets {
    const MESSAGE_TYPE: u16 = DELETE_ASSETS_ID;
    const BODY_SIZE: usize = 32 + SEGMENT_SLOT_SIZE + 8;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.pub_key)?;
        cursor.field(writer, &self.assets)?;
        cursor.field(writer, &self.seed)
    }

    fn seal(&mut self) {
        self.seal.close();
    }
}

/// Move coins and assets between two wallets. `from` and `to` may be equal.
#[derive(Debug, Clone)]
pub struct Transfer {
    config: MessageConfig,
    from: PublicKey,
    to: PublicKey,
    amount: u64,
    assets: Vec<Asset>,
    seed: u64,
    memo: String,
    seal: Seal,
}

impl Transfer {
    pub fn new(from: PublicKey, to: PublicKey, amount: u64, seed: u64, memo: &str) -> Self {
        Self {
            config: MessageConfig::default(),
            from,
            to,
            amount,
            assets: Vec::new(),
            seed,
            memo: memo.to_string(),
            seal: Seal::default(),
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<()> {
        self.seal.check("add_asset")?;
        self.assets.push(asset);
        Ok(())
    }

    pub fn from(&self) -> &PublicKey {
        &self.from
    }

    pub fn to(&self) -> &PublicKey {
        &self.to
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }
}

impl Transaction for Transfer {
    const MESSAGE_TYPE: u16 = TRANSFER_ID;
    const BODY_SIZE: usize = 32 + 32 + 8 + SEGMENT_SLOT_SIZE + 8 + SEGMENT_SLOT_SIZE;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.from)?;
        cursor.field(writer, &self.to)?;
        cursor.field(writer, &self.amount)?;
        cursor.field(writer, &self.assets)?;
        cursor.field(writer, &self.seed)?;
        cursor.field(writer, self.memo.as_str())
    }

    fn seal(&mut self) {
        self.seal.close();
    }
}

/// Transfer terms signed by the wallet that pays the fees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOffer {
    from: PublicKey,
    to: PublicKey,
    fees_payer: PublicKey,
    amount: u64,
    assets: Vec<Asset>,
    seed: u64,
    memo: String,
}

impl TransferOffer {
    pub const FIXED_SIZE: usize =
        32 + 32 + 32 + 8 + SEGMENT_SLOT_SIZE + 8 + SEGMENT_SLOT_SIZE;

    pub fn new(
        from: PublicKey,
        to: PublicKey,
        fees_payer: PublicKey,
        amount: u64,
        seed: u64,
        memo: &str,
    ) -> Self {
        Self {
            from,
            to,
            fees_payer,
            amount,
            assets: Vec::new(),
            seed,
            memo: memo.to_string(),
        }
    }

    pub fn add_asset(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    pub fn from(&self) -> &PublicKey {
        &self.from
    }

    pub fn to(&self) -> &PublicKey {
        &self.to
    }

    pub fn fees_payer(&self) -> &PublicKey {
        &self.fees_payer
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn write_fields(&self, writer: &mut SegmentWriter, cursor: &mut FieldCursor) -> Result<()> {
        cursor.field(writer, &self.from)?;
        cursor.field(writer, &self.to)?;
        cursor.field(writer, &self.fees_payer)?;
        cursor.field(writer, &self.amount)?;
        cursor.field(writer, &self.assets)?;
        cursor.field(writer, &self.seed)?;
        cursor.field(writer, self.memo.as_str())
    }

    /// Standalone encoding of the offer, the payload the fees payer signs.
    pub fn offer_bytes(&self) -> Result<Vec<u8>> {
        encode_body(Self::FIXED_SIZE, |writer, base| {
            self.write_fields(writer, &mut FieldCursor::new(base))
        })
    }
}

impl ByteSerialize for TransferOffer {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_detached_record(at, Self::FIXED_SIZE, |w, base| {
            self.write_fields(w, &mut FieldCursor::new(base))
        })
    }
}

/// Transfer whose fees are charged to a third wallet.
#[derive(Debug, Clone)]
pub struct TransferWithFeesPayer {
    config: MessageConfig,
    offer: TransferOffer,
    fees_payer_signature: Signature,
}

impl TransferWithFeesPayer {
    pub fn new(offer: TransferOffer, fees_payer_signature: Signature) -> Self {
        Self {
            config: MessageConfig::default(),
            offer,
            fees_payer_signature,
        }
    }

    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn offer(&self) -> &TransferOffer {
        &self.offer
    }

    pub fn fees_payer_signature(&self) -> &Signature {
        &self.fees_payer_signature
    }
}

impl Transaction for TransferWithFeesPayer {
    const MESSAGE_TYPE: u16 = TRANSFER_FEES_PAYER_ID;
    const BODY_SIZE: usize = SEGMENT_SLOT_SIZE + Signature::SIZE;

    fn config(&self) -> &MessageConfig {
        &self.config
    }

    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
        let mut cursor = FieldCursor::new(base);
        cursor.field(writer, &self.offer)?;
        cursor.field(writer, &self.fees_payer_signature)
    }
}

/// One priced lot, nested in the body as its own record.
#[derive(Debug, Clone, Copy)]
struct Lot<'a>(&'a TradeAsset);

impl ByteSerialize for Lot<'_> {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_record(at, TradeAsset::SIZE, |w, base| self.0.serialize_bytes(w, base))
    }
}

macro_rules! order_offer {
    ($(#[$meta:meta])* $name:ident, $id:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            config: MessageConfig,
            pub_key: PublicKey,
            asset: TradeAsset,
            seed: u64,
            memo: String,
        }

        impl $name {
            pub fn new(pub_key: PublicKey, asset: TradeAsset, seed: u64, memo: &str) -> Self {
                Self {
                    config: MessageConfig::default(),
                    pub_key,
                    asset,
                    seed,
                    memo: memo.to_string(),
                }
            }

            pub fn with_config(mut self, config: MessageConfig) -> Self {
                self.config = config;
                self
            }

            pub fn asset(&self) -> &TradeAsset {
                &self.asset
            }
        }

        impl Transaction for $name {
            const MESSAGE_TYPE: u16 = $id;
            const BODY_SIZE: usize = 32 + SEGMENT_SLOT_SIZE + 8 + SEGMENT_SLOT_SIZE;

            fn config(&self) -> &MessageConfig {
                &self.config
            }

            fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()> {
                let mut cursor = FieldCursor::new(base);
                cursor.field(writer, &self.pub_key)?;
                cursor.field(writer, &Lot(&self.asset))?;
                cursor.field(writer, &self.seed)?;
                cursor.field(writer, self.memo.as_str())
            }
        }
    };
}

order_offer!(
    /// Offer to sell a lot at the given price.
    AskOffer,
    ASK_OFFER_ID
);

order_offer!(
    /// Offer to buy a lot at the given price.
    BidOffer,
    BID_OFFER_ID
);
