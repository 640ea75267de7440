//! FFI-compatible types for the memo codec.
//!
//! These structs are the wire format shared between Go <-> C (CGO) <-> Rust.
//! Do not change their memory layout without updating the Go side.
//!
//! Byte buffers handed out by this library are allocated with `malloc` and
//! strings with Rust's allocator. Both go back through the `memo_free_*`
//! functions, never through `C.free` alone.

use std::ffi::CString;
use std::os::raw::{c_char, c_uint};
use std::ptr;

use alloy_primitives::Address;
use anyhow::Context;

use crate::fields_v0::{FieldsV0, RevertOptions};
use crate::header::{EncodingFormat, Header, OpCode};
use crate::memo::InboundMemo;
use crate::utils::{bytes_from_raw, malloc_bytes, opt_c_str_to_string};

/// Codec handle. Holds the message of the last failed call.
#[derive(Debug, Default)]
pub struct MemoCodecInstance {
    pub last_error: Option<CString>,
}

impl MemoCodecInstance {
    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        // interior NULs cannot cross as a C string
        let message = message.into().replace('\0', " ");
        self.last_error = CString::new(message).ok();
    }
}

/// 160-bit address (20 raw bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FFIAddress {
    pub bytes: [u8; 20],
}

impl From<Address> for FFIAddress {
    fn from(address: Address) -> Self {
        Self { bytes: address.into() }
    }
}

impl From<FFIAddress> for Address {
    fn from(address: FFIAddress) -> Self {
        Address::from(address.bytes)
    }
}

/// Memo header, one byte per field.
///
/// The reserved nibble is not carried: it is always encoded as zero, and a
/// memo with non-zero reserved bits never decodes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FFIHeader {
    pub version: u8,
    pub encoding_fmt: u8,
    pub op_code: u8,
    /// Ignored by `memo_encode`, which derives the flags from the fields.
    pub data_flags: u8,
}

impl From<Header> for FFIHeader {
    fn from(header: Header) -> Self {
        Self {
            version: header.version,
            encoding_fmt: header.encoding_fmt.0,
            op_code: header.op_code.0,
            data_flags: header.data_flags,
        }
    }
}

impl From<FFIHeader> for Header {
    fn from(header: FFIHeader) -> Self {
        Self {
            version: header.version,
            encoding_fmt: EncodingFormat(header.encoding_fmt),
            op_code: OpCode(header.op_code),
            reserved: 0,
            data_flags: header.data_flags,
        }
    }
}

/// FFI-compatible inbound memo.
///
/// As an input, null pointers mean empty values. As an output of
/// `memo_decode`, empty buffers are null with a zero length and
/// `abort_address` is always allocated.
///
/// `revert_address` is a UTF-8 buffer with a length rather than a C string,
/// since a decoded one may contain NUL bytes.
#[repr(C)]
#[derive(Debug)]
pub struct InboundMemoFFI {
    pub header: FFIHeader,
    pub receiver: FFIAddress,
    pub payload: *mut u8,
    pub payload_len: c_uint,
    pub revert_address: *mut u8,
    pub revert_address_len: c_uint,
    pub call_on_revert: bool,
    pub abort_address: *mut c_char,
    pub revert_message: *mut u8,
    pub revert_message_len: c_uint,
}

/// Encoded memo bytes.
#[repr(C)]
#[derive(Debug)]
pub struct EncodedMemoFFI {
    pub data: *mut u8,
    pub len: c_uint,
}

impl InboundMemoFFI {
    /// Copies the memo out of C memory.
    ///
    /// # Safety
    /// Every non-null pointer must be valid for its declared length, and
    /// `abort_address` must be NUL-terminated.
    pub unsafe fn to_memo(&self) -> anyhow::Result<InboundMemo> {
        let revert_address =
            bytes_from_raw(self.revert_address, self.revert_address_len as usize);
        let revert_address =
            String::from_utf8(revert_address).context("revert address is not valid UTF-8")?;

        Ok(InboundMemo {
            header: self.header.into(),
            fields_v0: FieldsV0 {
                receiver: self.receiver.into(),
                payload: bytes_from_raw(self.payload, self.payload_len as usize),
                revert_options: RevertOptions {
                    revert_address,
                    call_on_revert: self.call_on_revert,
                    abort_address: opt_c_str_to_string(self.abort_address)?,
                    revert_message: bytes_from_raw(
                        self.revert_message,
                        self.revert_message_len as usize,
                    ),
                },
            },
        })
    }

    /// Moves a decoded memo into C memory, to be released with
    /// `memo_free_decoded`.
    pub fn from_memo(memo: InboundMemo) -> anyhow::Result<Self> {
        let fields = memo.fields_v0;

        let mut out = Self {
            header: memo.header.into(),
            receiver: fields.receiver.into(),
            payload: ptr::null_mut(),
            payload_len: 0,
            revert_address: ptr::null_mut(),
            revert_address_len: 0,
            call_on_revert: fields.revert_options.call_on_revert,
            abort_address: ptr::null_mut(),
            revert_message: ptr::null_mut(),
            revert_message_len: 0,
        };

        if let Err(e) = out.fill(&fields) {
            // buffers set before the failure are owned by `out`
            unsafe { out.release() };
            return Err(e);
        }
        Ok(out)
    }

    fn fill(&mut self, fields: &FieldsV0) -> anyhow::Result<()> {
        let options = &fields.revert_options;

        self.abort_address = CString::new(options.abort_address.as_str())
            .context("abort address contains a NUL byte")?
            .into_raw();
        (self.payload, self.payload_len) = malloc_bytes(&fields.payload)?;
        (self.revert_address, self.revert_address_len) =
            malloc_bytes(options.revert_address.as_bytes())?;
        (self.revert_message, self.revert_message_len) = malloc_bytes(&options.revert_message)?;
        Ok(())
    }
}

impl InboundMemoFFI {
    /// Releases the buffers allocated by [`InboundMemoFFI::from_memo`].
    ///
    /// # Safety
    /// Only valid on values built by `from_memo`, and only once.
    pub(crate) unsafe fn release(&mut self) {
        libc::free(self.payload as *mut libc::c_void);
        libc::free(self.revert_address as *mut libc::c_void);
        libc::free(self.revert_message as *mut libc::c_void);
        if !self.abort_address.is_null() {
            let _ = CString::from_raw(self.abort_address);
        }
        self.payload = ptr::null_mut();
        self.payload_len = 0;
        self.revert_address = ptr::null_mut();
        self.revert_address_len = 0;
        self.abort_address = ptr::null_mut();
        self.revert_message = ptr::null_mut();
        self.revert_message_len = 0;
    }
}

impl EncodedMemoFFI {
    pub fn from_bytes(data: &[u8]) -> anyhow::Result<Self> {
        let (data, len) = malloc_bytes(data)?;
        Ok(Self { data, len })
    }
}

impl EncodedMemoFFI {
    /// # Safety
    /// Only valid on values built by [`EncodedMemoFFI::from_bytes`], and only once.
    pub(crate) unsafe fn release(&mut self) {
        libc::free(self.data as *mut libc::c_void);
        self.data = ptr::null_mut();
    }
}
