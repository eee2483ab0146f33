//! Offer handles. An offer is filled through its handle and then handed to a
//! transaction constructor, which takes the terms out; the emptied handle
//! rejects further additions and must still be freed.

use super::{
    check, handle_free, handle_mut, handle_ref, into_handle, parse_fee_strategy,
    parse_public_key, parse_str, Error,
};
use crate::assets::{Asset, TradeAsset};
use crate::error::{AssetAsmError, Result};
use crate::exchange::{ExchangeOffer, ExchangeOfferIntermediary};
use crate::intermediary::Intermediary;
use crate::trade::{TradeOffer, TradeOfferIntermediary};
use crate::transaction::TransferOffer;
use std::os::raw::c_char;

#[derive(Debug)]
pub struct Offer<T> {
    terms: Option<T>,
}

impl<T> Offer<T> {
    fn new(terms: T) -> Self {
        Self { terms: Some(terms) }
    }

    fn terms_mut(&mut self) -> Result<&mut T> {
        self.terms.as_mut().ok_or_else(consumed)
    }

    /// Move the terms into a transaction, leaving the handle spent.
    pub(crate) fn take(&mut self) -> Result<T> {
        self.terms.take().ok_or_else(consumed)
    }

    pub fn is_consumed(&self) -> bool {
        self.terms.is_none()
    }
}

fn consumed() -> AssetAsmError {
    AssetAsmError::InvalidState("offer was already used by a transaction".to_string())
}

pub type ExchangeOfferHandle = Offer<ExchangeOffer>;
pub type ExchangeOfferIntermediaryHandle = Offer<ExchangeOfferIntermediary>;
pub type TradeOfferHandle = Offer<TradeOffer>;
pub type TradeOfferIntermediaryHandle = Offer<TradeOfferIntermediary>;
pub type TransferOfferHandle = Offer<TransferOffer>;

/// Append a copy of the value behind `item` to the offer's terms.
unsafe fn add_to<T, I: Copy>(
    error: *mut Error,
    operation: &str,
    offer: *mut Offer<T>,
    item: *const I,
    add: impl FnOnce(&mut T, I),
) -> bool {
    let result = (|| -> Result<_> {
        let item = *handle_ref("asset", item)?;
        add(handle_mut("offer", offer)?.terms_mut()?, item);
        Ok(())
    })();
    check(error, operation, result).is_some()
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_offer_create(
    sender: *const c_char,
    sender_value: u64,
    recipient: *const c_char,
    fee_strategy: u8,
    error: *mut Error,
) -> *mut ExchangeOfferHandle {
    let result = (|| -> Result<_> {
        Ok(Offer::new(ExchangeOffer::new(
            parse_public_key("sender", sender)?,
            sender_value,
            parse_public_key("recipient", recipient)?,
            parse_fee_strategy(fee_strategy)?,
        )))
    })();
    into_handle(error, "exchange_offer_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_offer_add_sender_asset(
    offer: *mut ExchangeOfferHandle,
    asset: *const Asset,
    error: *mut Error,
) -> bool {
    add_to(
        error,
        "exchange_offer_add_sender_asset",
        offer,
        asset,
        ExchangeOffer::add_sender_asset,
    )
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_offer_add_recipient_asset(
    offer: *mut ExchangeOfferHandle,
    asset: *const Asset,
    error: *mut Error,
) -> bool {
    add_to(
        error,
        "exchange_offer_add_recipient_asset",
        offer,
        asset,
        ExchangeOffer::add_recipient_asset,
    )
}

handle_free!(assetasm_exchange_offer_free, ExchangeOfferHandle);

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_offer_intermediary_create(
    intermediary: *const Intermediary,
    sender: *const c_char,
    sender_value: u64,
    recipient: *const c_char,
    fee_strategy: u8,
    error: *mut Error,
) -> *mut ExchangeOfferIntermediaryHandle {
    let result = (|| -> Result<_> {
        Ok(Offer::new(ExchangeOfferIntermediary::new(
            *handle_ref("intermediary", intermediary)?,
            parse_public_key("sender", sender)?,
            sender_value,
            parse_public_key("recipient", recipient)?,
            parse_fee_strategy(fee_strategy)?,
        )))
    })();
    into_handle(error, "exchange_offer_intermediary_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_offer_intermediary_add_sender_asset(
    offer: *mut ExchangeOfferIntermediaryHandle,
    asset: *const Asset,
    error: *mut Error,
) -> bool {
    add_to(
        error,
        "exchange_offer_intermediary_add_sender_asset",
        offer,
        asset,
        ExchangeOfferIntermediary::add_sender_asset,
    )
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_offer_intermediary_add_recipient_asset(
    offer: *mut ExchangeOfferIntermediaryHandle,
    asset: *const Asset,
    error: *mut Error,
) -> bool {
    add_to(
        error,
        "exchange_offer_intermediary_add_recipient_asset",
        offer,
        asset,
        ExchangeOfferIntermediary::add_recipient_asset,
    )
}

handle_free!(
    assetasm_exchange_offer_intermediary_free,
    ExchangeOfferIntermediaryHandle
);

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_offer_create(
    seller: *const c_char,
    buyer: *const c_char,
    fee_strategy: u8,
    error: *mut Error,
) -> *mut TradeOfferHandle {
    let result = (|| -> Result<_> {
        Ok(Offer::new(TradeOffer::new(
            parse_public_key("seller", seller)?,
            parse_public_key("buyer", buyer)?,
            parse_fee_strategy(fee_strategy)?,
        )))
    })();
    into_handle(error, "trade_offer_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_offer_add_asset(
    offer: *mut TradeOfferHandle,
    asset: *const TradeAsset,
    error: *mut Error,
) -> bool {
    add_to(
        error,
        "trade_offer_add_asset",
        offer,
        asset,
        TradeOffer::add_asset,
    )
}

handle_free!(assetasm_trade_offer_free, TradeOfferHandle);

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_offer_intermediary_create(
    intermediary: *const Intermediary,
    seller: *const c_char,
    buyer: *const c_char,
    fee_strategy: u8,
    error: *mut Error,
) -> *mut TradeOfferIntermediaryHandle {
    let result = (|| -> Result<_> {
        Ok(Offer::new(TradeOfferIntermediary::new(
            *handle_ref("intermediary", intermediary)?,
            parse_public_key("seller", seller)?,
            parse_public_key("buyer", buyer)?,
            parse_fee_strategy(fee_strategy)?,
        )))
    })();
    into_handle(error, "trade_offer_intermediary_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_offer_intermediary_add_asset(
    offer: *mut TradeOfferIntermediaryHandle,
    asset: *const TradeAsset,
    error: *mut Error,
) -> bool {
    add_to(
        error,
        "trade_offer_intermediary_add_asset",
        offer,
        asset,
        TradeOfferIntermediary::add_asset,
    )
}

handle_free!(
    assetasm_trade_offer_intermediary_free,
    TradeOfferIntermediaryHandle
);

#[no_mangle]
pub unsafe extern "C" fn assetasm_transfer_offer_create(
    from: *const c_char,
    to: *const c_char,
    fees_payer: *const c_char,
    amount: u64,
    seed: u64,
    memo: *const c_char,
    error: *mut Error,
) -> *mut TransferOfferHandle {
    let result = (|| -> Result<_> {
        Ok(Offer::new(TransferOffer::new(
            parse_public_key("from", from)?,
            parse_public_key("to", to)?,
            parse_public_key("fees_payer", fees_payer)?,
            amount,
            seed,
            parse_str("memo", memo)?,
        )))
    })();
    into_handle(error, "transfer_offer_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_transfer_offer_add_asset(
    offer: *mut TransferOfferHandle,
    asset: *const Asset,
    error: *mut Error,
) -> bool {
    add_to(
        error,
        "transfer_offer_add_asset",
        offer,
        asset,
        TransferOffer::add_asset,
    )
}

handle_free!(assetasm_transfer_offer_free, TransferOfferHandle);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capi::tests::{c, last_message};
    use crate::capi::{assetasm_error_free, assetasm_error_new};
    use std::ptr;

    fn keys() -> (std::ffi::CString, std::ffi::CString) {
        (c(&"01".repeat(32)), c(&"02".repeat(32)))
    }

    #[test]
    fn test_exchange_offer_rejects_unknown_fee_strategy() {
        let (sender, recipient) = keys();
        unsafe {
            let error = assetasm_error_new();
            let offer =
                assetasm_exchange_offer_create(sender.as_ptr(), 0, recipient.as_ptr(), 5, error);
            assert!(offer.is_null());
            assert!(last_message(error).contains("fee_strategy"));
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_exchange_offer_accumulates_both_sides() {
        let (sender, recipient) = keys();
        let asset = Asset::from_hex(&"ab".repeat(32), 3).unwrap();
        unsafe {
            let offer = assetasm_exchange_offer_create(
                sender.as_ptr(),
                9,
                recipient.as_ptr(),
                1,
                ptr::null_mut(),
            );
            assert!(assetasm_exchange_offer_add_sender_asset(offer, &asset, ptr::null_mut()));
            assert!(assetasm_exchange_offer_add_recipient_asset(offer, &asset, ptr::null_mut()));
            assert!(assetasm_exchange_offer_add_recipient_asset(offer, &asset, ptr::null_mut()));

            let terms = (*offer).take().unwrap();
            assert_eq!(terms.sender_assets().len(), 1);
            assert_eq!(terms.recipient_assets().len(), 2);
            assert_eq!(terms.sender_value(), 9);
            assetasm_exchange_offer_free(offer);
        }
    }

    #[test]
    fn test_add_to_consumed_offer_is_invalid_state() {
        let (seller, buyer) = keys();
        let asset = TradeAsset::from_hex(&"ab".repeat(32), 1, 1).unwrap();
        unsafe {
            let error = assetasm_error_new();
            let offer = assetasm_trade_offer_create(seller.as_ptr(), buyer.as_ptr(), 2, error);
            (*offer).take().unwrap();
            assert!((*offer).is_consumed());

            assert!(!assetasm_trade_offer_add_asset(offer, &asset, error));
            assert!(last_message(error).starts_with("Invalid state"));
            assetasm_trade_offer_free(offer);
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_add_null_asset_is_invalid_argument() {
        let (seller, buyer) = keys();
        unsafe {
            let error = assetasm_error_new();
            let offer = assetasm_trade_offer_create(seller.as_ptr(), buyer.as_ptr(), 2, error);
            assert!(!assetasm_trade_offer_add_asset(offer, ptr::null(), error));
            assert!(last_message(error).contains("asset"));
            assetasm_trade_offer_free(offer);
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_intermediary_offers_require_intermediary() {
        let (seller, buyer) = keys();
        unsafe {
            let error = assetasm_error_new();
            let offer = assetasm_trade_offer_intermediary_create(
                ptr::null(),
                seller.as_ptr(),
                buyer.as_ptr(),
                4,
                error,
            );
            assert!(offer.is_null());
            assert!(last_message(error).contains("intermediary"));

            let intermediary = Intermediary::from_hex(&"03".repeat(32), 7).unwrap();
            let offer = assetasm_exchange_offer_intermediary_create(
                &intermediary,
                seller.as_ptr(),
                0,
                buyer.as_ptr(),
                4,
                error,
            );
            assert!(!offer.is_null());
            assert_eq!((*offer).take().unwrap().intermediary().commission(), 7);
            assetasm_exchange_offer_intermediary_free(offer);
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_intermediary_offers_accumulate_assets() {
        let (seller, buyer) = keys();
        let intermediary = Intermediary::from_hex(&"03".repeat(32), 1).unwrap();
        let asset = Asset::from_hex(&"ab".repeat(32), 3).unwrap();
        let lot = TradeAsset::from_hex(&"cd".repeat(32), 2, 5).unwrap();
        unsafe {
            let error = assetasm_error_new();
            let exchange = assetasm_exchange_offer_intermediary_create(
                &intermediary,
                seller.as_ptr(),
                0,
                buyer.as_ptr(),
                4,
                error,
            );
            assert!(assetasm_exchange_offer_intermediary_add_sender_asset(exchange, &asset, error));
            assert!(assetasm_exchange_offer_intermediary_add_recipient_asset(
                exchange, &asset, error
            ));
            assert!(assetasm_exchange_offer_intermediary_add_recipient_asset(
                exchange, &asset, error
            ));
            let terms = (*exchange).take().unwrap();
            assert_eq!(terms.terms().sender_assets().len(), 1);
            assert_eq!(terms.terms().recipient_assets().len(), 2);
            assert!(!assetasm_exchange_offer_intermediary_add_sender_asset(
                exchange, &asset, error
            ));
            assert!(last_message(error).starts_with("Invalid state"));

            let trade = assetasm_trade_offer_intermediary_create(
                &intermediary,
                seller.as_ptr(),
                buyer.as_ptr(),
                4,
                error,
            );
            assert!(assetasm_trade_offer_intermediary_add_asset(trade, &lot, error));
            assert!(!assetasm_trade_offer_intermediary_add_asset(trade, ptr::null(), error));
            let terms = (*trade).take().unwrap();
            assert_eq!(terms.assets(), &[lot]);
            assert_eq!(terms.seller().as_bytes(), &[1; 32]);

            assetasm_exchange_offer_intermediary_free(exchange);
            assetasm_trade_offer_intermediary_free(trade);
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_transfer_offer_names_bad_fees_payer() {
        let (from, to) = keys();
        let (payer, memo) = (c("00"), c(""));
        unsafe {
            let error = assetasm_error_new();
            let offer = assetasm_transfer_offer_create(
                from.as_ptr(),
                to.as_ptr(),
                payer.as_ptr(),
                1,
                0,
                memo.as_ptr(),
                error,
            );
            assert!(offer.is_null());
            assert!(last_message(error).contains("fees_payer"));
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_offer_free_accepts_null() {
        unsafe {
            assetasm_exchange_offer_free(ptr::null_mut());
            assetasm_transfer_offer_free(ptr::null_mut());
            assetasm_trade_offer_intermediary_free(ptr::null_mut());
        }
    }
}
