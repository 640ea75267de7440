//! Argument codecs selected by the header's encoding format.

mod abi;
mod compact;

pub use abi::CodecAbi;
pub use compact::CodecCompact;

use crate::arg::CodecArg;
use crate::error::CodecError;
use crate::header::EncodingFormat;

/// Packs an ordered list of typed arguments into bytes and back.
///
/// Arguments are positional: unpacking must add slots in the same order the
/// values were packed. A codec instance accumulates arguments and is meant to
/// be used for a single pack or unpack call.
pub trait Codec {
    /// Appends arguments to the list.
    fn add_arguments(&mut self, args: Vec<CodecArg>);

    /// Serializes the arguments in the order they were added.
    fn pack_arguments(&self) -> Result<Vec<u8>, CodecError>;

    /// Decodes `data` into the argument slots, in order.
    fn unpack_arguments(&mut self, data: &[u8]) -> Result<(), CodecError>;

    /// Current arguments; after a successful unpack they hold the decoded values.
    fn arguments(&self) -> &[CodecArg];

    /// Consumes the codec, yielding its arguments.
    fn into_arguments(self: Box<Self>) -> Vec<CodecArg>;
}

/// Returns a fresh codec for the given encoding format.
pub fn get_codec(encoding_fmt: EncodingFormat) -> Result<Box<dyn Codec>, CodecError> {
    match encoding_fmt {
        EncodingFormat::ABI => Ok(Box::new(CodecAbi::new())),
        EncodingFormat::COMPACT_SHORT | EncodingFormat::COMPACT_LONG => {
            Ok(Box::new(CodecCompact::new(encoding_fmt)?))
        }
        EncodingFormat(other) => Err(CodecError::InvalidEncodingFormat(other)),
    }
}
