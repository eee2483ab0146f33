//! Flat C ABI over the builders.
//!
//! Every object crosses the boundary as a boxed handle. Fallible functions
//! take a trailing `*mut Error` (may be null) and signal failure with a null
//! handle or `false`; the error text is then available through
//! [`assetasm_error_message`].
//!
//! # Safety
//!
//! All pointer arguments must be null or point to live objects created by
//! this library (strings: NUL-terminated). Handles must not be shared across
//! threads without external synchronisation and must be freed exactly once.
#![allow(clippy::missing_safety_doc)]

pub mod offers;
pub mod transactions;
pub mod values;

use crate::crypto::{PublicKey, Signature};
use crate::error::{AssetAsmError, Result};
use crate::fees::FeeStrategy;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use tracing::warn;

/// Last-error slot owned by the caller.
#[derive(Debug, Default)]
pub struct Error {
    message: Option<CString>,
}

impl Error {
    fn record(&mut self, err: &AssetAsmError) {
        let text = err.to_string().replace('\0', "");
        self.message = CString::new(text).ok();
    }

    pub fn message(&self) -> Option<&CStr> {
        self.message.as_deref()
    }
}

#[no_mangle]
pub extern "C" fn assetasm_error_new() -> *mut Error {
    Box::into_raw(Box::default())
}

/// Message of the last failed call, null if none was recorded. The pointer
/// stays valid until the next call that takes this sink.
#[no_mangle]
pub unsafe extern "C" fn assetasm_error_message(error: *const Error) -> *const c_char {
    match error.as_ref().and_then(Error::message) {
        Some(message) => message.as_ptr(),
        None => ptr::null(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn assetasm_error_free(error: *mut Error) {
    if error.is_null() {
        return;
    }
    drop(Box::from_raw(error));
}

/// Release a buffer returned by one of the `*_into_bytes` functions.
#[no_mangle]
pub unsafe extern "C" fn assetasm_bytes_free(bytes: *mut u8, length: usize) {
    if bytes.is_null() {
        return;
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(bytes, length)));
}

/// Unpack `result`, recording a failure in the caller's sink.
pub(crate) unsafe fn check<T>(error: *mut Error, operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(operation, error = %err, "call rejected");
            if let Some(sink) = error.as_mut() {
                sink.record(&err);
            }
            None
        }
    }
}

/// Box a fallible result into a handle, null on failure.
pub(crate) unsafe fn into_handle<T>(error: *mut Error, operation: &str, result: Result<T>) -> *mut T {
    match check(error, operation, result) {
        Some(value) => Box::into_raw(Box::new(value)),
        None => ptr::null_mut(),
    }
}

pub(crate) unsafe fn parse_str<'a>(field: &str, text: *const c_char) -> Result<&'a str> {
    if text.is_null() {
        return Err(AssetAsmError::invalid_argument(field, "null pointer"));
    }
    CStr::from_ptr(text)
        .to_str()
        .map_err(|e| AssetAsmError::invalid_argument(field, e))
}

pub(crate) unsafe fn parse_public_key(field: &str, text: *const c_char) -> Result<PublicKey> {
    PublicKey::from_hex_field(field, parse_str(field, text)?)
}

pub(crate) unsafe fn parse_signature(field: &str, text: *const c_char) -> Result<Signature> {
    Signature::from_hex_field(field, parse_str(field, text)?)
}

pub(crate) fn parse_fee_strategy(value: u8) -> Result<FeeStrategy> {
    FeeStrategy::try_from(value)
}

pub(crate) unsafe fn handle_ref<'a, T>(field: &str, handle: *const T) -> Result<&'a T> {
    handle
        .as_ref()
        .ok_or_else(|| AssetAsmError::invalid_argument(field, "null handle"))
}

pub(crate) unsafe fn handle_mut<'a, T>(field: &str, handle: *mut T) -> Result<&'a mut T> {
    handle
        .as_mut()
        .ok_or_else(|| AssetAsmError::invalid_argument(field, "null handle"))
}

/// Generates a destructor that is a no-op on null.
macro_rules! handle_free {
    ($name:ident, $ty:ty) => {
        #[no_mangle]
        pub unsafe extern "C" fn $name(handle: *mut $ty) {
            if handle.is_null() {
                return;
            }
            drop(Box::from_raw(handle));
        }
    };
}
pub(crate) use handle_free;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn c(text: &str) -> CString {
        CString::new(text).unwrap()
    }

    pub(crate) unsafe fn last_message(error: *const Error) -> String {
        let message = assetasm_error_message(error);
        assert!(!message.is_null());
        CStr::from_ptr(message).to_string_lossy().into_owned()
    }

    #[test]
    fn test_error_sink_starts_empty() {
        unsafe {
            let error = assetasm_error_new();
            assert!(assetasm_error_message(error).is_null());
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_failure_is_recorded_and_overwritten() {
        unsafe {
            let error = assetasm_error_new();
            let first: Option<()> = check(
                error,
                "first",
                Err(AssetAsmError::invalid_argument("a", "bad")),
            );
            assert!(first.is_none());
            assert_eq!(last_message(error), "Invalid argument: a: bad");

            check::<()>(error, "second", Err(AssetAsmError::invalid_argument("b", "bad")));
            assert!(last_message(error).contains("b: bad"));
            assetasm_error_free(error);
        }
    }

    #[test]
    fn test_null_sink_is_accepted() {
        unsafe {
            let handle: *mut u64 = into_handle(
                ptr::null_mut(),
                "test",
                Err(AssetAsmError::OutOfMemory),
            );
            assert!(handle.is_null());
        }
    }

    #[test]
    fn test_parse_str_rejects_null() {
        unsafe {
            let err = parse_str("memo", ptr::null()).unwrap_err();
            assert!(err.to_string().contains("memo"));
        }
    }

    #[test]
    fn test_parse_signature_names_field() {
        let short = c(&"1".repeat(63));
        unsafe {
            let err = parse_signature("sender_signature", short.as_ptr()).unwrap_err();
            assert!(err.to_string().contains("signature"));
        }
    }

    #[test]
    fn test_frees_accept_null() {
        unsafe {
            assetasm_error_free(ptr::null_mut());
            assetasm_bytes_free(ptr::null_mut(), 0);
        }
    }
}
