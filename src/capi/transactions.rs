//! Transaction handles: create, add, into_bytes, free.

use super::offers::{
    ExchangeOfferHandle, ExchangeOfferIntermediaryHandle, TradeOfferHandle,
    TradeOfferIntermediaryHandle, TransferOfferHandle,
};
use super::{
    check, handle_free, handle_mut, handle_ref, into_handle, parse_public_key, parse_signature,
    parse_str, Error,
};
use crate::assets::{Asset, TradeAsset};
use crate::error::Result;
use crate::exchange::{Exchange, ExchangeIntermediary};
use crate::fees::Fees;
use crate::message::Transaction;
use crate::trade::{Trade, TradeIntermediary};
use crate::transaction::{
    AddAssets, AskOffer, BidOffer, DeleteAssets, Transfer, TransferWithFeesPayer,
};
use std::os::raw::c_char;
use std::ptr;

/// Encode the transaction into a caller-owned buffer released with
/// `assetasm_bytes_free`. Repeated calls return equal buffers.
unsafe fn finalize_into<T: Transaction>(
    error: *mut Error,
    operation: &str,
    tx: *mut T,
    length: *mut usize,
) -> *mut u8 {
    let result = (|| -> Result<_> {
        let length = handle_mut("length", length)?;
        let raw = handle_mut("transaction", tx)?.finalize()?.into_boxed_slice();
        *length = raw.len();
        Ok(Box::into_raw(raw).cast::<u8>())
    })();
    check(error, operation, result).unwrap_or(ptr::null_mut())
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_add_assets_create(
    public_key: *const c_char,
    seed: u64,
    error: *mut Error,
) -> *mut AddAssets {
    let result = parse_public_key("public key", public_key).map(|key| AddAssets::new(key, seed));
    into_handle(error, "add_assets_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_add_assets_add_asset(
    tx: *mut AddAssets,
    meta: *const c_char,
    amount: u64,
    fees: *const Fees,
    receiver: *const c_char,
    error: *mut Error,
) -> bool {
    let result = (|| -> Result<_> {
        let meta = parse_str("meta", meta)?;
        let fees = *handle_ref("fees", fees)?;
        let receiver = parse_public_key("receiver", receiver)?;
        handle_mut("transaction", tx)?.add_asset_parts(meta, amount, fees, receiver)
    })();
    check(error, "add_assets_add_asset", result).is_some()
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_add_assets_into_bytes(
    tx: *mut AddAssets,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "add_assets_into_bytes", tx, length)
}

handle_free!(assetasm_add_assets_free, AddAssets);

#[no_mangle]
pub unsafe extern "C" fn assetasm_delete_assets_create(
    public_key: *const c_char,
    seed: u64,
    error: *mut Error,
) -> *mut DeleteAssets {
    let result =
        parse_public_key("public key", public_key).map(|key| DeleteAssets::new(key, seed));
    into_handle(error, "delete_assets_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_delete_assets_add_asset(
    tx: *mut DeleteAssets,
    asset: *const Asset,
    error: *mut Error,
) -> bool {
    let result = (|| -> Result<_> {
        let asset = *handle_ref("asset", asset)?;
        handle_mut("transaction", tx)?.add_asset(asset)
    })();
    check(error, "delete_assets_add_asset", result).is_some()
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_delete_assets_into_bytes(
    tx: *mut DeleteAssets,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "delete_assets_into_bytes", tx, length)
}

handle_free!(assetasm_delete_assets_free, DeleteAssets);

#[no_mangle]
pub unsafe extern "C" fn assetasm_transfer_create(
    from: *const c_char,
    to: *const c_char,
    amount: u64,
    seed: u64,
    memo: *const c_char,
    error: *mut Error,
) -> *mut Transfer {
    let result = (|| -> Result<_> {
        Ok(Transfer::new(
            parse_public_key("from", from)?,
            parse_public_key("to", to)?,
            amount,
            seed,
            parse_str("memo", memo)?,
        ))
    })();
    into_handle(error, "transfer_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_transfer_add_asset(
    tx: *mut Transfer,
    asset: *const Asset,
    error: *mut Error,
) -> bool {
    let result = (|| -> Result<_> {
        let asset = *handle_ref("asset", asset)?;
        handle_mut("transaction", tx)?.add_asset(asset)
    })();
    check(error, "transfer_add_asset", result).is_some()
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_transfer_into_bytes(
    tx: *mut Transfer,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "transfer_into_bytes", tx, length)
}

handle_free!(assetasm_transfer_free, Transfer);

/// Takes the terms out of `offer`; the offer handle must still be freed.
#[no_mangle]
pub unsafe extern "C" fn assetasm_transfer_fees_payer_create(
    offer: *mut TransferOfferHandle,
    fees_payer_signature: *const c_char,
    error: *mut Error,
) -> *mut TransferWithFeesPayer {
    let result = (|| -> Result<_> {
        let signature = parse_signature("fees_payer_signature", fees_payer_signature)?;
        let offer = handle_mut("offer", offer)?.take()?;
        Ok(TransferWithFeesPayer::new(offer, signature))
    })();
    into_handle(error, "transfer_fees_payer_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_transfer_fees_payer_into_bytes(
    tx: *mut TransferWithFeesPayer,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "transfer_fees_payer_into_bytes", tx, length)
}

handle_free!(assetasm_transfer_fees_payer_free, TransferWithFeesPayer);

/// Takes the terms out of `offer`; the offer handle must still be freed.
#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_create(
    offer: *mut ExchangeOfferHandle,
    sender_signature: *const c_char,
    seed: u64,
    memo: *const c_char,
    error: *mut Error,
) -> *mut Exchange {
    let result = (|| -> Result<_> {
        let signature = parse_signature("sender_signature", sender_signature)?;
        let memo = parse_str("memo", memo)?;
        let offer = handle_mut("offer", offer)?.take()?;
        Ok(Exchange::new(offer, signature, seed, memo))
    })();
    into_handle(error, "exchange_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_into_bytes(
    tx: *mut Exchange,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "exchange_into_bytes", tx, length)
}

handle_free!(assetasm_exchange_free, Exchange);

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_intermediary_create(
    offer: *mut ExchangeOfferIntermediaryHandle,
    sender_signature: *const c_char,
    intermediary_signature: *const c_char,
    seed: u64,
    memo: *const c_char,
    error: *mut Error,
) -> *mut ExchangeIntermediary {
    let result = (|| -> Result<_> {
        let sender_signature = parse_signature("sender_signature", sender_signature)?;
        let intermediary_signature =
            parse_signature("intermediary_signature", intermediary_signature)?;
        let memo = parse_str("memo", memo)?;
        let offer = handle_mut("offer", offer)?.take()?;
        Ok(ExchangeIntermediary::new(
            offer,
            sender_signature,
            intermediary_signature,
            seed,
            memo,
        ))
    })();
    into_handle(error, "exchange_intermediary_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_exchange_intermediary_into_bytes(
    tx: *mut ExchangeIntermediary,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "exchange_intermediary_into_bytes", tx, length)
}

handle_free!(assetasm_exchange_intermediary_free, ExchangeIntermediary);

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_create(
    offer: *mut TradeOfferHandle,
    seller_signature: *const c_char,
    seed: u64,
    error: *mut Error,
) -> *mut Trade {
    let result = (|| -> Result<_> {
        let signature = parse_signature("seller_signature", seller_signature)?;
        let offer = handle_mut("offer", offer)?.take()?;
        Ok(Trade::new(offer, signature, seed))
    })();
    into_handle(error, "trade_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_into_bytes(
    tx: *mut Trade,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "trade_into_bytes", tx, length)
}

handle_free!(assetasm_trade_free, Trade);

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_intermediary_create(
    offer: *mut TradeOfferIntermediaryHandle,
    seller_signature: *const c_char,
    intermediary_signature: *const c_char,
    seed: u64,
    memo: *const c_char,
    error: *mut Error,
) -> *mut TradeIntermediary {
    let result = (|| -> Result<_> {
        let seller_signature = parse_signature("seller_signature", seller_signature)?;
        let intermediary_signature =
            parse_signature("intermediary_signature", intermediary_signature)?;
        let memo = parse_str("memo", memo)?;
        let offer = handle_mut("offer", offer)?.take()?;
        Ok(TradeIntermediary::new(
            offer,
            seller_signature,
            intermediary_signature,
            seed,
            memo,
        ))
    })();
    into_handle(error, "trade_intermediary_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_intermediary_into_bytes(
    tx: *mut TradeIntermediary,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "trade_intermediary_into_bytes", tx, length)
}

handle_free!(assetasm_trade_intermediary_free, TradeIntermediary);

#[no_mangle]
pub unsafe extern "C" fn assetasm_ask_offer_create(
    public_key: *const c_char,
    asset: *const TradeAsset,
    seed: u64,
    memo: *const c_char,
    error: *mut Error,
) -> *mut AskOffer {
    let result = (|| -> Result<_> {
        Ok(AskOffer::new(
            parse_public_key("public key", public_key)?,
            *handle_ref("asset", asset)?,
            seed,
            parse_str("memo", memo)?,
        ))
    })();
    into_handle(error, "ask_offer_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_ask_offer_into_bytes(
    tx: *mut AskOffer,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "ask_offer_into_bytes", tx, length)
}

handle_free!(assetasm_ask_offer_free, AskOffer);

#[no_mangle]
pub unsafe extern "C" fn assetasm_bid_offer_create(
    public_key: *const c_char,
    asset: *const TradeAsset,
    seed: u64,
    memo: *const c_char,
    error: *mut Error,
) -> *mut BidOffer {
    let result = (|| -> Result<_> {
        Ok(BidOffer::new(
            parse_public_key("public key", public_key)?,
            *handle_ref("asset", asset)?,
            seed,
            parse_str("memo", memo)?,
        ))
    })();
    into_handle(error, "bid_offer_create", result)
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_bid_offer_into_bytes(
    tx: *mut BidOffer,
    length: *mut usize,
    error: *mut Error,
) -> *mut u8 {
    finalize_into(error, "bid_offer_into_bytes", tx, length)
}

handle_free!(assetasm_bid_offer_free, BidOffer);
