//! Error types for memo encoding and decoding.
//!
//! Every variant that wraps another error repeats the inner message in its own
//! `Display` output, so a rendered error always carries the full chain of
//! context from the outermost layer down to the failing byte.

use thiserror::Error;

/// Errors raised by a [`Codec`](crate::Codec) while packing or unpacking arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The encoding format does not select any codec.
    #[error("invalid encoding format: {0}")]
    InvalidEncodingFormat(u8),
    /// A type name does not map to a supported argument type.
    #[error("unsupported argument type: {0}")]
    UnsupportedArgType(String),
    /// The synthesized ABI method could not be parsed.
    #[error("failed to parse ABI string: {0}")]
    AbiParse(String),
    /// The generic ABI encoder rejected the argument list.
    #[error("failed to pack ABI arguments: {0}")]
    AbiPack(String),
    /// The ABI data does not decode into the declared argument slots.
    #[error("failed to unpack ABI encoded data: {0}")]
    AbiUnpack(String),
    /// A length prefix does not fit into the compact length width.
    #[error("failed to pack {kind} argument: {name}: data length {len} exceeds {max} bytes")]
    LengthOverflow {
        /// Argument kind (`bytes` or `string`).
        kind: &'static str,
        /// Argument name.
        name: String,
        /// Actual content length.
        len: usize,
        /// Largest length representable by the prefix.
        max: usize,
    },
    /// Not enough bytes left to read a length prefix.
    #[error("failed to unpack {kind} argument: {name}: expected {expected} bytes to decode length, got {got}")]
    ShortLength {
        /// Argument kind (`bytes` or `string`).
        kind: &'static str,
        /// Argument name.
        name: String,
        /// Width of the length prefix.
        expected: usize,
        /// Bytes remaining.
        got: usize,
    },
    /// The declared content length runs past the end of the data.
    #[error("failed to unpack {kind} argument: {name}: expected {expected} bytes, got {got}")]
    ShortData {
        /// Argument kind (`bytes` or `string`).
        kind: &'static str,
        /// Argument name.
        name: String,
        /// Declared content length.
        expected: usize,
        /// Bytes remaining.
        got: usize,
    },
    /// Fewer than 20 bytes left for an address.
    #[error("failed to unpack address argument: {name}: expected address, got {got} bytes")]
    ShortAddress {
        /// Argument name.
        name: String,
        /// Bytes remaining.
        got: usize,
    },
    /// A string argument is not UTF-8.
    #[error("failed to unpack string argument: {0} is not valid UTF-8")]
    InvalidUtf8(String),
    /// Compact data was not consumed exactly.
    #[error("consumed bytes ({consumed}) != total bytes ({total})")]
    TrailingBytes {
        /// Bytes read by the declared arguments.
        consumed: usize,
        /// Bytes supplied.
        total: usize,
    },
}

/// Errors raised while encoding, decoding or validating a memo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError {
    /// The memo holds no field data after the header.
    #[error("memo is too short: {0} bytes")]
    TooShort(usize),
    /// The first byte is not the memo identifier.
    #[error("invalid memo identifier: {0:#04x}")]
    InvalidIdentifier(u8),
    /// Only version 0 is defined.
    #[error("invalid memo version: {0}")]
    InvalidVersion(u8),
    /// Encoding format nibble is out of range.
    #[error("invalid encoding format: {0}")]
    InvalidEncodingFormat(u8),
    /// Operation code nibble is out of range.
    #[error("invalid operation code: {0}")]
    InvalidOpCode(u8),
    /// The low nibble of byte 2 is not zero.
    #[error("reserved control bits are not zero: {0:#06b}")]
    ReservedBitsNotZero(u8),
    /// The memo text is not valid hex.
    #[error("invalid memo hex: {0}")]
    InvalidHex(String),
    /// An address string does not hold 20 hex-encoded bytes.
    #[error("invalid address {address}: {reason}")]
    InvalidAddress {
        /// The offending input.
        address: String,
        /// Why it was rejected.
        reason: String,
    },
    /// No codec exists for the encoding format.
    #[error("unable to get codec: {0}")]
    Codec(CodecError),
    /// The codec failed to pack the field arguments.
    #[error("failed to pack arguments: {0}")]
    Pack(CodecError),
    /// The codec failed to unpack the field arguments.
    #[error("failed to unpack arguments: {0}")]
    Unpack(CodecError),
    /// A field-level rule was violated.
    #[error("{0}")]
    InvalidField(String),
    /// The fields of a decoded memo are inconsistent with its header.
    #[error("invalid memo fields: {0}")]
    InvalidFields(Box<MemoError>),
}

impl MemoError {
    pub(crate) fn field(msg: impl Into<String>) -> Self {
        Self::InvalidField(msg.into())
    }
}
