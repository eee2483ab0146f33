//! Value constructors: assets, trade assets, fees, intermediaries.

use super::{handle_free, into_handle, parse_str, Error};
use crate::assets::{Asset, TradeAsset};
use crate::error::Result;
use crate::fees::Fees;
use crate::intermediary::Intermediary;
use std::os::raw::c_char;

#[no_mangle]
pub unsafe extern "C" fn assetasm_asset_create(
    id: *const c_char,
    amount: u64,
    error: *mut Error,
) -> *mut Asset {
    let result = parse_str("asset id", id).and_then(|id| Asset::from_hex(id, amount));
    into_handle(error, "asset_create", result)
}

handle_free!(assetasm_asset_free, Asset);

#[no_mangle]
pub unsafe extern "C" fn assetasm_trade_asset_create(
    id: *const c_char,
    amount: u64,
    price: u64,
    error: *mut Error,
) -> *mut TradeAsset {
    let result = parse_str("asset id", id).and_then(|id| TradeAsset::from_hex(id, amount, price));
    into_handle(error, "trade_asset_create", result)
}

handle_free!(assetasm_trade_asset_free, TradeAsset);

/// Fractions accept `"0.25"`, `".25"` or `"1/4"`.
#[no_mangle]
pub unsafe extern "C" fn assetasm_fees_create(
    trade_fixed: u64,
    trade_fraction: *const c_char,
    exchange_fixed: u64,
    exchange_fraction: *const c_char,
    transfer_fixed: u64,
    transfer_fraction: *const c_char,
    error: *mut Error,
) -> *mut Fees {
    let result = (|| -> Result<Fees> {
        Fees::parse(
            trade_fixed,
            parse_str("trade fraction", trade_fraction)?,
            exchange_fixed,
            parse_str("exchange fraction", exchange_fraction)?,
            transfer_fixed,
            parse_str("transfer fraction", transfer_fraction)?,
        )
    })();
    into_handle(error, "fees_create", result)
}

handle_free!(assetasm_fees_free, Fees);

#[no_mangle]
pub unsafe extern "C" fn assetasm_intermediary_create(
    wallet: *const c_char,
    commission: u64,
    error: *mut Error,
) -> *mut Intermediary {
    let result = parse_str("intermediary wallet", wallet)
        .and_then(|wallet| Intermediary::from_hex(wallet, commission));
    into_handle(error, "intermediary_create", result)
}

handle_free!(assetasm_intermediary_free, Intermediary);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capi::tests::{c, last_message};
    use crate::capi::{assetasm_error_free, assetasm_error_new};
    use std::ptr;

    #[test]
    fn test_asset_create() {
        let id = c(&"0f".repeat(32));
        unsafe {
            let asset = assetasm_asset_create(id.as_ptr(), 12, ptr::null_mut());
            assert!(!asset.is_null());
            assert_eq!((*asset).amount(), 12);
            assert_eq!((*asset).id().as_bytes(), &[0x0f; 32]);
            assetasm_asset_free(asset);
        }
    }

    #[test]
    fn test_asset_rejects_uppercase_id() {
        let id = c(&"0F".repeat(32));
        unsafe {
            let error = assetasm_error_new();
            assert!(assetasm_asset_create(id.as_ptr(), 1, error).is_null());
            assert!(last_message(error).contains("asset id"));
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_trade_asset_allows_zero_price() {
        let id = c(&"aa".repeat(32));
        unsafe {
            let asset = assetasm_trade_asset_create(id.as_ptr(), 1, 0, ptr::null_mut());
            assert_eq!((*asset).price(), 0);
            assetasm_trade_asset_free(asset);
        }
    }

    #[test]
    fn test_fees_create() {
        let (half, quarter, zero) = (c("0.5"), c("1/4"), c("0"));
        unsafe {
            let fees = assetasm_fees_create(
                10,
                half.as_ptr(),
                20,
                quarter.as_ptr(),
                30,
                zero.as_ptr(),
                ptr::null_mut(),
            );
            assert!(!fees.is_null());
            assert_eq!((*fees).trade.fraction.denominator(), 2);
            assert_eq!((*fees).exchange.fraction.denominator(), 4);
            assert_eq!((*fees).transfer.fixed, 30);
            assetasm_fees_free(fees);
        }
    }

    #[test]
    fn test_fees_reject_bad_fraction() {
        let (good, bad) = (c("0.1"), c("-1"));
        unsafe {
            let error = assetasm_error_new();
            let fees = assetasm_fees_create(
                0,
                good.as_ptr(),
                0,
                bad.as_ptr(),
                0,
                good.as_ptr(),
                error,
            );
            assert!(fees.is_null());
            assert!(last_message(error).starts_with("Invalid argument"));
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_intermediary_rejects_null_wallet() {
        unsafe {
            let error = assetasm_error_new();
            assert!(assetasm_intermediary_create(ptr::null(), 5, error).is_null());
            assert!(last_message(error).contains("intermediary wallet"));
            assetasm_error_free(error);
        }
    }
}
