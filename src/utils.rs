//! Address conversion and FFI marshalling helpers

#[cfg(feature = "ffi")]
use std::ffi::CStr;
#[cfg(feature = "ffi")]
use std::os::raw::{c_char, c_uint};
#[cfg(feature = "ffi")]
use std::{ptr, slice};

use alloy_primitives::Address;
#[cfg(feature = "ffi")]
use anyhow::{anyhow, Result};

use crate::error::MemoError;

/// Strip a `0x` or `0X` prefix, if any
pub fn strip_hex_prefix(hex_str: &str) -> &str {
    hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str)
}

/// Convert a hex string to Address
///
/// Accepts an optional `0x` or `0X` prefix and either letter case; the
/// checksum is not enforced.
pub fn hex_to_address(hex_str: &str) -> Result<Address, MemoError> {
    let invalid = |reason: &str| MemoError::InvalidAddress {
        address: hex_str.to_string(),
        reason: reason.to_string(),
    };

    let stripped = strip_hex_prefix(hex_str);
    if stripped.len() != 40 {
        return Err(invalid("invalid address length"));
    }

    let mut addr_bytes = [0u8; 20];
    hex::decode_to_slice(stripped, &mut addr_bytes).map_err(|e| invalid(&e.to_string()))?;
    Ok(Address::from(addr_bytes))
}

/// Convert Address to its EIP-55 checksummed hex string
pub fn address_to_hex(addr: Address) -> String {
    addr.to_checksum(None)
}

/// Convert bytes to hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(feature = "ffi")]
/// Convert a C string to a Rust string
///
/// # Safety
/// `c_str` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn c_str_to_string(c_str: *const c_char) -> Result<String> {
    if c_str.is_null() {
        return Err(anyhow!("Null pointer"));
    }

    let c_str = CStr::from_ptr(c_str);
    c_str
        .to_str()
        .map(|s| s.to_string())
        .map_err(|e| anyhow!("Invalid UTF-8: {}", e))
}

#[cfg(feature = "ffi")]
/// Like [`c_str_to_string`] but maps a null pointer to an empty string.
///
/// # Safety
/// See [`c_str_to_string`].
pub(crate) unsafe fn opt_c_str_to_string(c_str: *const c_char) -> Result<String> {
    if c_str.is_null() {
        return Ok(String::new());
    }
    c_str_to_string(c_str)
}

#[cfg(feature = "ffi")]
/// Copy `len` bytes from a raw buffer; a null pointer or zero length yields an empty vector.
///
/// # Safety
/// When non-null, `data` must be valid for reads of `len` bytes.
pub(crate) unsafe fn bytes_from_raw(data: *const u8, len: usize) -> Vec<u8> {
    if data.is_null() || len == 0 {
        Vec::new()
    } else {
        slice::from_raw_parts(data, len).to_vec()
    }
}

#[cfg(feature = "ffi")]
/// Copy bytes into a `malloc`ed buffer.
///
/// Empty input yields a null pointer and a zero length.
pub(crate) fn malloc_bytes(data: &[u8]) -> Result<(*mut u8, c_uint)> {
    if data.is_empty() {
        return Ok((ptr::null_mut(), 0));
    }
    let len = c_uint::try_from(data.len()).map_err(|_| anyhow!("Buffer too large: {} bytes", data.len()))?;

    unsafe {
        let buf = libc::malloc(data.len()) as *mut u8;
        if buf.is_null() {
            return Err(anyhow!("Failed to allocate {} bytes", data.len()));
        }
        ptr::copy_nonoverlapping(data.as_ptr(), buf, data.len());
        Ok((buf, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn hex_to_address_accepts_prefix_and_case() {
        let expected = address!("a029d053e13223e2442e28be80b3ceda27ecbe31");
        assert_eq!(hex_to_address("0xA029D053E13223E2442E28be80b3CeDA27ecbE31").unwrap(), expected);
        assert_eq!(hex_to_address("a029d053e13223e2442e28be80b3ceda27ecbe31").unwrap(), expected);
        assert_eq!(hex_to_address("0XA029D053E13223E2442E28BE80B3CEDA27ECBE31").unwrap(), expected);
    }

    #[test]
    fn strip_hex_prefix_either_case() {
        assert_eq!(strip_hex_prefix("0x5a00"), "5a00");
        assert_eq!(strip_hex_prefix("0X5a00"), "5a00");
        assert_eq!(strip_hex_prefix("5a00"), "5a00");
        // only one prefix is stripped
        assert_eq!(strip_hex_prefix("0x0X5a"), "0X5a");
    }

    #[test]
    fn hex_to_address_rejects_bad_input() {
        let err = hex_to_address("0x1234").unwrap_err();
        assert!(err.to_string().contains("invalid address length"));

        let err = hex_to_address("0xZZ29D053E13223E2442E28be80b3CeDA27ecbE31").unwrap_err();
        assert!(err.to_string().contains("invalid address"));

        assert!(hex_to_address("invalid abort address").is_err());
    }

    #[test]
    fn address_to_hex_is_checksummed() {
        let addr = hex_to_address("0xa029d053e13223e2442e28be80b3ceda27ecbe31").unwrap();
        assert_eq!(address_to_hex(addr), "0xA029D053E13223E2442E28be80b3CeDA27ecbE31");
    }

    #[test]
    fn bytes_to_hex_is_prefixed() {
        assert_eq!(bytes_to_hex(&[0x5a, 0x00, 0x10]), "0x5a0010");
        assert_eq!(bytes_to_hex(&[]), "0x");
    }

    #[cfg(feature = "ffi")]
    #[test]
    fn raw_helpers_tolerate_null() {
        unsafe {
            assert!(c_str_to_string(std::ptr::null()).is_err());
            assert_eq!(opt_c_str_to_string(std::ptr::null()).unwrap(), "");
            assert!(bytes_from_raw(std::ptr::null(), 10).is_empty());
        }
    }

    #[cfg(feature = "ffi")]
    #[test]
    fn malloc_bytes_copies() {
        let (buf, len) = malloc_bytes(b"memo").unwrap();
        assert_eq!(len, 4);
        unsafe {
            assert_eq!(bytes_from_raw(buf, len as usize), b"memo");
            libc::free(buf as *mut libc::c_void);
        }
        assert!(malloc_bytes(&[]).unwrap().0.is_null());
    }
}
