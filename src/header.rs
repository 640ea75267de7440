//! The fixed 4-byte memo header.
//!
//! ```text
//! byte 0: identifier 0x5A ('Z')
//! byte 1: version (high nibble) | encoding format (low nibble)
//! byte 2: operation code (high nibble) | reserved, must be zero (low nibble)
//! byte 3: data flags
//! ```
//!
//! Encoding and decoding share [`Header::validate`], so a value rejected on one
//! side is rejected on the other with the same error.

use std::fmt;

use crate::bits::{get_bits, set_bits};
use crate::error::MemoError;

/// First byte of every standard memo.
pub const MEMO_IDENTIFIER: u8 = 0x5A;

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 4;

/// The only memo version defined so far.
pub const MEMO_VERSION_0: u8 = 0b0000;

const MASK_HIGH_NIBBLE: u8 = 0b1111_0000;
const MASK_LOW_NIBBLE: u8 = 0b0000_1111;

/// Encoding format of the memo fields (low nibble of byte 1).
///
/// Kept as a raw nibble so that out-of-range values read off the wire can be
/// represented and rejected by validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EncodingFormat(pub u8);

impl EncodingFormat {
    /// Ethereum ABI encoding.
    pub const ABI: Self = Self(0b0000);
    /// Compact encoding with 1-byte length prefixes.
    pub const COMPACT_SHORT: Self = Self(0b0001);
    /// Compact encoding with 2-byte little-endian length prefixes.
    pub const COMPACT_LONG: Self = Self(0b0010);

    pub const fn is_valid(self) -> bool {
        self.0 < 0b0011
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ABI => f.write_str("abi"),
            Self::COMPACT_SHORT => f.write_str("compact_short"),
            Self::COMPACT_LONG => f.write_str("compact_long"),
            Self(other) => write!(f, "unknown({other:#06b})"),
        }
    }
}

/// Operation code (high nibble of byte 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OpCode(pub u8);

impl OpCode {
    pub const DEPOSIT: Self = Self(0b0000);
    pub const DEPOSIT_AND_CALL: Self = Self(0b0001);
    pub const CALL: Self = Self(0b0010);

    pub const fn is_valid(self) -> bool {
        self.0 < 0b0011
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DEPOSIT => f.write_str("deposit"),
            Self::DEPOSIT_AND_CALL => f.write_str("deposit_and_call"),
            Self::CALL => f.write_str("call"),
            Self(other) => write!(f, "unknown({other:#06b})"),
        }
    }
}

/// Decoded memo header. The identifier byte is implied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub encoding_fmt: EncodingFormat,
    pub op_code: OpCode,
    pub reserved: u8,
    pub data_flags: u8,
}

impl Header {
    /// Validates and packs the header into its 4-byte wire form.
    pub fn encode_to_bytes(&self) -> Result<[u8; HEADER_SIZE], MemoError> {
        self.validate()?;

        let mut data = [0u8; HEADER_SIZE];
        data[0] = MEMO_IDENTIFIER;
        data[1] = set_bits(data[1], MASK_HIGH_NIBBLE, self.version);
        data[1] = set_bits(data[1], MASK_LOW_NIBBLE, self.encoding_fmt.0);
        data[2] = set_bits(data[2], MASK_HIGH_NIBBLE, self.op_code.0);
        data[2] = set_bits(data[2], MASK_LOW_NIBBLE, self.reserved);
        data[3] = self.data_flags;

        Ok(data)
    }

    /// Parses and validates the header at the start of `data`.
    ///
    /// The header alone is not a memo: at least one byte of field data must
    /// follow it.
    pub fn decode_from_bytes(data: &[u8]) -> Result<Self, MemoError> {
        if data.len() <= HEADER_SIZE {
            return Err(MemoError::TooShort(data.len()));
        }
        if data[0] != MEMO_IDENTIFIER {
            return Err(MemoError::InvalidIdentifier(data[0]));
        }

        let header = Self {
            version: get_bits(data[1], MASK_HIGH_NIBBLE),
            encoding_fmt: EncodingFormat(get_bits(data[1], MASK_LOW_NIBBLE)),
            op_code: OpCode(get_bits(data[2], MASK_HIGH_NIBBLE)),
            reserved: get_bits(data[2], MASK_LOW_NIBBLE),
            data_flags: data[3],
        };
        header.validate()?;

        Ok(header)
    }

    pub fn validate(&self) -> Result<(), MemoError> {
        if self.version != MEMO_VERSION_0 {
            return Err(MemoError::InvalidVersion(self.version));
        }
        if !self.encoding_fmt.is_valid() {
            return Err(MemoError::InvalidEncodingFormat(self.encoding_fmt.0));
        }
        if !self.op_code.is_valid() {
            return Err(MemoError::InvalidOpCode(self.op_code.0));
        }
        if self.reserved != 0 {
            return Err(MemoError::ReservedBitsNotZero(self.reserved));
        }
        Ok(())
    }
}
