//! The standard inbound memo: a [`Header`] followed by version-specific fields.

use tracing::debug;

use crate::error::MemoError;
use crate::fields_v0::FieldsV0;
use crate::header::{Header, HEADER_SIZE, MEMO_VERSION_0};
use crate::utils::strip_hex_prefix;

/// A decoded inbound memo.
///
/// Decoding either yields a complete memo or an error; there is no partially
/// decoded state to inspect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundMemo {
    pub header: Header,
    pub fields_v0: FieldsV0,
}

impl InboundMemo {
    /// Encodes the memo into its wire form.
    ///
    /// The header's data flags are recomputed from the populated fields before
    /// the header is encoded, so the stored value is overwritten.
    pub fn encode_to_bytes(&mut self) -> Result<Vec<u8>, MemoError> {
        self.header.data_flags = self.fields_v0.data_flags();
        let header = self.header.encode_to_bytes()?;

        let fields = match self.header.version {
            MEMO_VERSION_0 => self.fields_v0.pack(
                self.header.op_code,
                self.header.encoding_fmt,
                self.header.data_flags,
            )?,
            version => return Err(MemoError::InvalidVersion(version)),
        };

        let mut data = Vec::with_capacity(HEADER_SIZE + fields.len());
        data.extend_from_slice(&header);
        data.extend_from_slice(&fields);
        Ok(data)
    }

    /// Decodes a memo, header first.
    pub fn decode_from_bytes(data: &[u8]) -> Result<Self, MemoError> {
        Self::decode(data).inspect_err(|e| debug!(len = data.len(), error = %e, "rejected memo"))
    }

    /// Decodes a memo carried as hex text, with or without a `0x`/`0X` prefix.
    pub fn decode_from_hex(memo_hex: &str) -> Result<Self, MemoError> {
        let data =
            hex::decode(strip_hex_prefix(memo_hex)).map_err(|e| MemoError::InvalidHex(e.to_string()))?;
        Self::decode_from_bytes(&data)
    }

    fn decode(data: &[u8]) -> Result<Self, MemoError> {
        let header = Header::decode_from_bytes(data)?;

        let mut memo = Self { header, fields_v0: FieldsV0::default() };
        match header.version {
            MEMO_VERSION_0 => {
                memo.fields_v0.unpack(header.encoding_fmt, header.data_flags, &data[HEADER_SIZE..])?;
                memo.fields_v0
                    .validate(header.op_code, header.data_flags)
                    .map_err(|e| MemoError::InvalidFields(Box::new(e)))?;
            }
            version => return Err(MemoError::InvalidVersion(version)),
        }

        Ok(memo)
    }
}
