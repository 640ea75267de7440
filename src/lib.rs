//! Codec for the standard inbound memo
//!
//! Non-EVM chains carry cross-chain instructions as a binary memo attached to
//! the inbound transaction. A memo is a 4-byte [`Header`] followed by the
//! version 0 fields ([`FieldsV0`]), packed either with the Ethereum ABI or
//! with a compact length-prefixed encoding.
//!
//! ```
//! use memo_codec::{address, EncodingFormat, FieldsV0, Header, InboundMemo, OpCode};
//!
//! let mut memo = InboundMemo {
//!     header: Header {
//!         encoding_fmt: EncodingFormat::COMPACT_SHORT,
//!         op_code: OpCode::DEPOSIT,
//!         ..Default::default()
//!     },
//!     fields_v0: FieldsV0 {
//!         receiver: address!("ef221ec80f004e6a2ee4e5f5d800699c1c68cd6f"),
//!         ..Default::default()
//!     },
//! };
//!
//! let data = memo.encode_to_bytes().unwrap();
//! assert_eq!(data.len(), 24);
//! assert_eq!(InboundMemo::decode_from_bytes(&data).unwrap(), memo);
//! ```
//!
//! With the `ffi` feature (on by default) the crate also exports a C ABI so
//! that Go code can link it through CGO.
//!
//! # Safety
//!
//! All FFI functions are `unsafe` and require careful handling of memory and
//! pointer lifetimes. Everything returned by pointer must be released with the
//! matching `memo_free_*` function.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[cfg(feature = "ffi")]
use std::ffi::CString;
#[cfg(feature = "ffi")]
use std::os::raw::{c_char, c_uint};
#[cfg(feature = "ffi")]
use std::ptr;

mod arg;
mod bits;
mod codec;
mod error;
mod fields_v0;
mod header;
mod memo;
#[cfg(feature = "ffi")]
mod types;
mod utils;

#[cfg(test)]
mod test_utils;

pub use alloy_primitives::{address, Address};
pub use arg::*;
pub use bits::*;
pub use codec::{get_codec, Codec, CodecAbi, CodecCompact};
pub use error::{CodecError, MemoError};
pub use fields_v0::*;
pub use header::*;
pub use memo::InboundMemo;
#[cfg(feature = "ffi")]
pub use types::*;
pub use utils::*;
#[cfg(feature = "ffi")]
use utils::{bytes_from_raw, c_str_to_string};

/// Create a new codec handle
#[cfg(feature = "ffi")]
#[no_mangle]
pub extern "C" fn memo_codec_new() -> *mut MemoCodecInstance {
    Box::into_raw(Box::new(MemoCodecInstance::default()))
}

/// Free a codec handle
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_codec_free(instance: *mut MemoCodecInstance) {
    if !instance.is_null() {
        let _ = Box::from_raw(instance);
    }
}

/// Encode a memo
///
/// The data flags of `memo.header` are ignored and recomputed from the fields.
/// Returns null on failure; the reason is available from [`memo_get_last_error`].
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_encode(
    instance: *mut MemoCodecInstance,
    memo: *const InboundMemoFFI,
) -> *mut EncodedMemoFFI {
    if instance.is_null() || memo.is_null() {
        return ptr::null_mut();
    }

    let instance = &mut *instance;
    instance.last_error = None;

    match encode_impl(&*memo) {
        Ok(encoded) => Box::into_raw(Box::new(encoded)),
        Err(e) => {
            instance.set_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Encode a memo into a `0x`-prefixed hex string
///
/// The string must be released with [`memo_free_string`].
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_encode_hex(
    instance: *mut MemoCodecInstance,
    memo: *const InboundMemoFFI,
) -> *mut c_char {
    if instance.is_null() || memo.is_null() {
        return ptr::null_mut();
    }

    let instance = &mut *instance;
    instance.last_error = None;

    let result = (*memo)
        .to_memo()
        .and_then(|mut memo| Ok(memo.encode_to_bytes()?))
        .and_then(|data| Ok(CString::new(bytes_to_hex(&data))?));

    match result {
        Ok(hex) => hex.into_raw(),
        Err(e) => {
            instance.set_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Decode a memo from raw bytes
///
/// Returns null on failure; the reason is available from [`memo_get_last_error`].
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_decode(
    instance: *mut MemoCodecInstance,
    data: *const u8,
    data_len: c_uint,
) -> *mut InboundMemoFFI {
    if instance.is_null() || data.is_null() {
        return ptr::null_mut();
    }

    let instance = &mut *instance;
    instance.last_error = None;

    let data = bytes_from_raw(data, data_len as usize);
    let result = InboundMemo::decode_from_bytes(&data)
        .map_err(anyhow::Error::from)
        .and_then(InboundMemoFFI::from_memo);

    match result {
        Ok(memo) => Box::into_raw(Box::new(memo)),
        Err(e) => {
            instance.set_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Decode a memo from hex text, with or without a `0x` prefix
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_decode_hex(
    instance: *mut MemoCodecInstance,
    memo_hex: *const c_char,
) -> *mut InboundMemoFFI {
    if instance.is_null() || memo_hex.is_null() {
        return ptr::null_mut();
    }

    let instance = &mut *instance;
    instance.last_error = None;

    let result = c_str_to_string(memo_hex)
        .and_then(|text| Ok(InboundMemo::decode_from_hex(&text)?))
        .and_then(InboundMemoFFI::from_memo);

    match result {
        Ok(memo) => Box::into_raw(Box::new(memo)),
        Err(e) => {
            instance.set_error(e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the last error message
///
/// The string is owned by the handle and stays valid until the next call on it.
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_get_last_error(instance: *mut MemoCodecInstance) -> *const c_char {
    if instance.is_null() {
        return ptr::null();
    }

    let instance = &*instance;

    match &instance.last_error {
        Some(error) => error.as_ptr(),
        None => ptr::null(),
    }
}

/// Free a C string allocated by this library
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Free an encoded memo
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_free_encoded(encoded: *mut EncodedMemoFFI) {
    if !encoded.is_null() {
        let mut encoded = Box::from_raw(encoded);
        encoded.release();
    }
}

/// Free a decoded memo
#[cfg(feature = "ffi")]
#[no_mangle]
pub unsafe extern "C" fn memo_free_decoded(memo: *mut InboundMemoFFI) {
    if !memo.is_null() {
        let mut memo = Box::from_raw(memo);
        memo.release();
    }
}

#[cfg(feature = "ffi")]
unsafe fn encode_impl(memo: &InboundMemoFFI) -> anyhow::Result<EncodedMemoFFI> {
    let mut memo = memo.to_memo()?;
    let data = memo.encode_to_bytes()?;
    EncodedMemoFFI::from_bytes(&data)
}
