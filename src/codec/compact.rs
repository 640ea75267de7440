//! Compact codec: raw 20-byte addresses, length-prefixed bytes and strings.
//!
//! The length prefix is 1 byte for [`EncodingFormat::COMPACT_SHORT`] and
//! 2 bytes little-endian for [`EncodingFormat::COMPACT_LONG`]. Unpacking must
//! consume the input exactly.

use alloy_primitives::Address;

use crate::arg::{ArgValue, CodecArg};
use crate::codec::Codec;
use crate::error::CodecError;
use crate::header::EncodingFormat;

const ADDRESS_LEN: usize = 20;

/// Compact [`Codec`].
#[derive(Clone, Debug)]
pub struct CodecCompact {
    len_bytes: usize,
    args: Vec<CodecArg>,
}

impl CodecCompact {
    /// Creates a compact codec; only the two compact formats are accepted.
    pub fn new(encoding_fmt: EncodingFormat) -> Result<Self, CodecError> {
        let len_bytes = match encoding_fmt {
            EncodingFormat::COMPACT_SHORT => 1,
            EncodingFormat::COMPACT_LONG => 2,
            EncodingFormat(other) => return Err(CodecError::InvalidEncodingFormat(other)),
        };
        Ok(Self { len_bytes, args: Vec::new() })
    }

    /// Width of the length prefix in bytes.
    pub fn len_bytes(&self) -> usize {
        self.len_bytes
    }

    fn max_len(&self) -> usize {
        if self.len_bytes == 1 {
            u8::MAX as usize
        } else {
            u16::MAX as usize
        }
    }

    fn pack_length(
        &self,
        out: &mut Vec<u8>,
        kind: &'static str,
        name: &str,
        len: usize,
    ) -> Result<(), CodecError> {
        let max = self.max_len();
        if len > max {
            return Err(CodecError::LengthOverflow { kind, name: name.to_string(), len, max });
        }
        match self.len_bytes {
            1 => out.push(len as u8),
            _ => out.extend_from_slice(&(len as u16).to_le_bytes()),
        }
        Ok(())
    }

    /// Reads one length-prefixed item starting at `offset`, returning an owned
    /// copy of the content and the new offset.
    fn unpack_dynamic(
        &self,
        data: &[u8],
        offset: usize,
        kind: &'static str,
        name: &str,
    ) -> Result<(Vec<u8>, usize), CodecError> {
        let remaining = data.len() - offset;
        if remaining < self.len_bytes {
            return Err(CodecError::ShortLength {
                kind,
                name: name.to_string(),
                expected: self.len_bytes,
                got: remaining,
            });
        }

        let len = match self.len_bytes {
            1 => data[offset] as usize,
            _ => u16::from_le_bytes([data[offset], data[offset + 1]]) as usize,
        };
        let start = offset + self.len_bytes;
        let available = data.len() - start;
        if available < len {
            return Err(CodecError::ShortData {
                kind,
                name: name.to_string(),
                expected: len,
                got: available,
            });
        }

        Ok((data[start..start + len].to_vec(), start + len))
    }
}

impl Codec for CodecCompact {
    fn add_arguments(&mut self, args: Vec<CodecArg>) {
        self.args.extend(args);
    }

    fn pack_arguments(&self) -> Result<Vec<u8>, CodecError> {
        let mut packed = Vec::new();

        for arg in &self.args {
            match &arg.value {
                ArgValue::Address(addr) => packed.extend_from_slice(addr.as_slice()),
                ArgValue::Bytes(bytes) => {
                    self.pack_length(&mut packed, "bytes", &arg.name, bytes.len())?;
                    packed.extend_from_slice(bytes);
                }
                ArgValue::String(s) => {
                    self.pack_length(&mut packed, "string", &arg.name, s.len())?;
                    packed.extend_from_slice(s.as_bytes());
                }
            }
        }

        Ok(packed)
    }

    fn unpack_arguments(&mut self, data: &[u8]) -> Result<(), CodecError> {
        let mut offset = 0;

        for i in 0..self.args.len() {
            let arg = &self.args[i];
            let (value, next) = match &arg.value {
                ArgValue::Address(_) => {
                    let remaining = data.len() - offset;
                    if remaining < ADDRESS_LEN {
                        return Err(CodecError::ShortAddress {
                            name: arg.name.clone(),
                            got: remaining,
                        });
                    }
                    let addr = Address::from_slice(&data[offset..offset + ADDRESS_LEN]);
                    (ArgValue::Address(addr), offset + ADDRESS_LEN)
                }
                ArgValue::Bytes(_) => {
                    let (bytes, next) = self.unpack_dynamic(data, offset, "bytes", &arg.name)?;
                    (ArgValue::Bytes(bytes), next)
                }
                ArgValue::String(_) => {
                    let (bytes, next) = self.unpack_dynamic(data, offset, "string", &arg.name)?;
                    let s = String::from_utf8(bytes)
                        .map_err(|_| CodecError::InvalidUtf8(arg.name.clone()))?;
                    (ArgValue::String(s), next)
                }
            };
            self.args[i].value = value;
            offset = next;
        }

        if offset != data.len() {
            return Err(CodecError::TrailingBytes { consumed: offset, total: data.len() });
        }
        Ok(())
    }

    fn arguments(&self) -> &[CodecArg] {
        &self.args
    }

    fn into_arguments(self: Box<Self>) -> Vec<CodecArg> {
        self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::{arg_payload, arg_receiver, arg_revert_address, ArgType};
    use crate::test_utils::compact_pack;
    use alloy_primitives::address;

    const ARG_ADDRESS: Address = address!("855efd3c54f9ed106c6c3fb343539c89df042e0b");

    fn slots_like(args: &[CodecArg]) -> Vec<CodecArg> {
        args.iter().map(|a| CodecArg::slot(a.name.clone(), a.arg_type())).collect()
    }

    #[test]
    fn new_rejects_abi_and_unknown_formats() {
        assert_eq!(CodecCompact::new(EncodingFormat::COMPACT_SHORT).unwrap().len_bytes(), 1);
        assert_eq!(CodecCompact::new(EncodingFormat::COMPACT_LONG).unwrap().len_bytes(), 2);
        assert!(CodecCompact::new(EncodingFormat::ABI).is_err());
        assert!(CodecCompact::new(EncodingFormat(0b11)).is_err());
    }

    #[test]
    fn pack_matches_reference_layout() {
        let args = vec![
            arg_receiver(ARG_ADDRESS),
            arg_payload(b"here is a bytes argument".to_vec()),
            arg_revert_address("some other string argument"),
        ];

        let mut short = CodecCompact::new(EncodingFormat::COMPACT_SHORT).unwrap();
        short.add_arguments(args.clone());
        let packed = short.pack_arguments().unwrap();
        assert_eq!(packed.len(), 20 + 1 + 24 + 1 + 26);
        assert_eq!(packed, compact_pack(1, &args));

        let mut long = CodecCompact::new(EncodingFormat::COMPACT_LONG).unwrap();
        long.add_arguments(args.clone());
        let packed = long.pack_arguments().unwrap();
        assert_eq!(packed.len(), 20 + 2 + 24 + 2 + 26);
        assert_eq!(packed, compact_pack(2, &args));
    }

    #[test]
    fn pack_empty_bytes_and_string() {
        let mut codec = CodecCompact::new(EncodingFormat::COMPACT_SHORT).unwrap();
        codec.add_arguments(vec![arg_payload(Vec::new()), arg_revert_address("")]);
        assert_eq!(codec.pack_arguments().unwrap(), vec![0, 0]);
    }

    #[test]
    fn pack_length_capacity_boundaries() {
        let cases = [
            (EncodingFormat::COMPACT_SHORT, 255, None),
            (EncodingFormat::COMPACT_SHORT, 256, Some("exceeds 255 bytes")),
            (EncodingFormat::COMPACT_LONG, 256, None),
            (EncodingFormat::COMPACT_LONG, 65535, None),
            (EncodingFormat::COMPACT_LONG, 65536, Some("exceeds 65535 bytes")),
        ];

        for (fmt, len, err) in cases {
            for arg in [arg_payload(vec![b'a'; len]), arg_revert_address("b".repeat(len))] {
                let mut codec = CodecCompact::new(fmt).unwrap();
                codec.add_arguments(vec![arg]);
                match err {
                    Some(msg) => {
                        let e = codec.pack_arguments().unwrap_err();
                        assert!(e.to_string().contains(msg), "{e}");
                        assert!(e.to_string().contains(&format!("data length {len}")), "{e}");
                    }
                    None => {
                        let packed = codec.pack_arguments().unwrap();
                        assert_eq!(packed.len(), codec.len_bytes() + len);
                    }
                }
            }
        }
    }

    #[test]
    fn unpack_round_trips_in_any_order() {
        let args = vec![
            arg_revert_address("some other string argument"),
            arg_receiver(ARG_ADDRESS),
            arg_payload(b"some test bytes argument".to_vec()),
        ];

        for (fmt, len_bytes) in [(EncodingFormat::COMPACT_SHORT, 1), (EncodingFormat::COMPACT_LONG, 2)] {
            let mut codec = CodecCompact::new(fmt).unwrap();
            codec.add_arguments(slots_like(&args));
            codec.unpack_arguments(&compact_pack(len_bytes, &args)).unwrap();
            assert_eq!(codec.arguments(), args.as_slice());
        }
    }

    #[test]
    fn unpack_copies_out_of_input() {
        let mut data = compact_pack(1, &[arg_payload(b"abc".to_vec())]);
        let mut codec = CodecCompact::new(EncodingFormat::COMPACT_SHORT).unwrap();
        codec.add_arguments(vec![CodecArg::slot("payload", ArgType::Bytes)]);
        codec.unpack_arguments(&data).unwrap();
        data[1] = b'z';
        assert_eq!(codec.arguments()[0].value, ArgValue::Bytes(b"abc".to_vec()));
    }

    #[test]
    fn unpack_errors() {
        let cases: Vec<(Vec<u8>, ArgType, &str)> = vec![
            (vec![1, 2, 3, 4, 5], ArgType::Address, "expected address, got 5 bytes"),
            (vec![], ArgType::String, "expected 1 bytes to decode length, got 0"),
            (vec![0x05, 0x0a, 0x0b, 0x0c, 0x0d], ArgType::Bytes, "expected 5 bytes, got 4"),
            (vec![0x02, 0xff, 0xfe], ArgType::String, "is not valid UTF-8"),
        ];

        for (data, arg_type, msg) in cases {
            let mut codec = CodecCompact::new(EncodingFormat::COMPACT_SHORT).unwrap();
            codec.add_arguments(vec![CodecArg::slot("arg", arg_type)]);
            let err = codec.unpack_arguments(&data).unwrap_err();
            assert!(err.to_string().contains(msg), "{err}");
        }

        let mut codec = CodecCompact::new(EncodingFormat::COMPACT_LONG).unwrap();
        codec.add_arguments(vec![CodecArg::slot("payload", ArgType::Bytes)]);
        let err = codec.unpack_arguments(&[0x01]).unwrap_err();
        assert!(err.to_string().contains("expected 2 bytes to decode length, got 1"), "{err}");
    }

    #[test]
    fn unpack_rejects_trailing_bytes() {
        let args = vec![arg_receiver(ARG_ADDRESS), arg_payload(b"some test bytes argument".to_vec())];
        let mut data = compact_pack(1, &args);
        data.push(0x00);

        let mut codec = CodecCompact::new(EncodingFormat::COMPACT_SHORT).unwrap();
        codec.add_arguments(slots_like(&args));
        let err = codec.unpack_arguments(&data).unwrap_err();
        assert_eq!(err.to_string(), "consumed bytes (45) != total bytes (46)");
    }
}
