//! Reference packers used by the unit tests.
//!
//! They are written out by hand, independently of the codecs, so that tests
//! compare codec output against the wire layout rather than against itself.

use crate::arg::{ArgValue, CodecArg};

pub(crate) const ABI_ALIGNMENT: usize = 32;

/// Left-pads `data` to one 32-byte word.
pub(crate) fn pad_left(data: &[u8]) -> Vec<u8> {
    let mut word = vec![0u8; ABI_ALIGNMENT - data.len()];
    word.extend_from_slice(data);
    word
}

/// Right-pads `data` to a multiple of 32 bytes.
pub(crate) fn pad_right(data: &[u8]) -> Vec<u8> {
    let mut word = data.to_vec();
    word.resize(data.len().div_ceil(ABI_ALIGNMENT) * ABI_ALIGNMENT, 0);
    word
}

/// ABI layout for `bytes`, `string` and `address` arguments: one head word per
/// argument (address inline, offset for dynamic types), then each dynamic
/// value as a length word plus right-padded content.
pub(crate) fn abi_pack(args: &[CodecArg]) -> Vec<u8> {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let head_len = ABI_ALIGNMENT * args.len();

    for arg in args {
        let content: &[u8] = match &arg.value {
            ArgValue::Address(addr) => {
                head.extend(pad_left(addr.as_slice()));
                continue;
            }
            ArgValue::Bytes(b) => b,
            ArgValue::String(s) => s.as_bytes(),
        };
        let offset = (head_len + tail.len()) as u64;
        head.extend(pad_left(&offset.to_be_bytes()));
        tail.extend(pad_left(&(content.len() as u64).to_be_bytes()));
        tail.extend(pad_right(content));
    }

    head.extend(tail);
    head
}

/// Compact layout with `len_bytes`-wide little-endian length prefixes.
pub(crate) fn compact_pack(len_bytes: usize, args: &[CodecArg]) -> Vec<u8> {
    let mut out = Vec::new();
    for arg in args {
        let content: &[u8] = match &arg.value {
            ArgValue::Address(a) => {
                out.extend_from_slice(a.as_slice());
                continue;
            }
            ArgValue::Bytes(b) => b,
            ArgValue::String(s) => s.as_bytes(),
        };
        if len_bytes == 1 {
            out.push(content.len() as u8);
        } else {
            out.extend_from_slice(&(content.len() as u16).to_le_bytes());
        }
        out.extend_from_slice(content);
    }
    out
}
