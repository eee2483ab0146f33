//! AssetAsm - Transaction Builder for a Permissioned Asset Ledger
//!
//! Builds ledger transactions (minting, burning, transfers, exchanges and
//! trades) and encodes them into the canonical offset-table wire format the
//! validators expect. Signing happens elsewhere; this crate only assembles
//! and serializes. A flat C ABI is exposed through [`capi`].

pub mod assets;
pub mod capi;
pub mod crypto;
pub mod error;
pub mod exchange;
pub mod fees;
pub mod intermediary;
pub mod message;
pub mod serialization;
pub mod trade;
pub mod transaction;

pub use assets::{Asset, AssetId, MetaAsset, TradeAsset};
pub use crypto::{PublicKey, Signature, TxHash};
pub use error::{AssetAsmError, Result};
pub use exchange::{Exchange, ExchangeIntermediary, ExchangeOffer, ExchangeOfferIntermediary};
pub use fees::{Fee, FeeStrategy, Fees, Fraction};
pub use intermediary::Intermediary;
pub use message::{MessageConfig, MessageHeader, Transaction};
pub use trade::{Trade, TradeIntermediary, TradeOffer, TradeOfferIntermediary};
pub use transaction::{
    AddAssets, AskOffer, BidOffer, DeleteAssets, Transfer, TransferOffer, TransferWithFeesPayer,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assets::{Asset, MetaAsset, TradeAsset};
    pub use crate::crypto::{PublicKey, Signature};
    pub use crate::error::AssetAsmError;
    pub use crate::exchange::{
        Exchange, ExchangeIntermediary, ExchangeOffer, ExchangeOfferIntermediary,
    };
    pub use crate::fees::{FeeStrategy, Fees};
    pub use crate::intermediary::Intermediary;
    pub use crate::message::{MessageConfig, Transaction};
    pub use crate::trade::{Trade, TradeIntermediary, TradeOffer, TradeOfferIntermediary};
    pub use crate::transaction::{
        AddAssets, AskOffer, BidOffer, DeleteAssets, Transfer, TransferOffer,
        TransferWithFeesPayer,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_builders_are_plain_data() {
        assert_send_sync::<AddAssets>();
        assert_send_sync::<Transfer>();
        assert_send_sync::<TransferWithFeesPayer>();
        assert_send_sync::<Exchange>();
        assert_send_sync::<TradeIntermediary>();
        assert_send_sync::<Fees>();
    }

    #[test]
    fn test_transfer_end_to_end() {
        let mut tx = Transfer::new(
            PublicKey::new([0xa0; 32]),
            PublicKey::new([0xb0; 32]),
            100,
            7,
            "",
        );
        tx.add_asset(Asset::from_hex(&"cd".repeat(32), 5).unwrap())
            .unwrap();

        let raw = tx.finalize().unwrap();
        assert_eq!(raw.len(), 10 + 96 + 40);
        assert_eq!(raw, tx.finalize().unwrap());
        assert_eq!(tx.hash().unwrap(), crate::crypto::hash(&raw));
    }
}
