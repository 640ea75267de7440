//! Typed, named arguments shared by both codecs.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;

use crate::error::CodecError;

/// Argument type tag. The string forms are the generic ABI type names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgType {
    Bytes,
    String,
    Address,
}

impl ArgType {
    /// ABI type name used when synthesizing method signatures.
    pub const fn abi_name(self) -> &'static str {
        match self {
            ArgType::Bytes => "bytes",
            ArgType::String => "string",
            ArgType::Address => "address",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abi_name())
    }
}

impl FromStr for ArgType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bytes" => Ok(ArgType::Bytes),
            "string" => Ok(ArgType::String),
            "address" => Ok(ArgType::Address),
            other => Err(CodecError::UnsupportedArgType(other.to_string())),
        }
    }
}

/// Value carried by a [`CodecArg`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Bytes(Vec<u8>),
    String(String),
    Address(Address),
}

impl ArgValue {
    /// Empty value of the given type, used as an unpack output slot.
    pub fn empty(arg_type: ArgType) -> Self {
        match arg_type {
            ArgType::Bytes => ArgValue::Bytes(Vec::new()),
            ArgType::String => ArgValue::String(String::new()),
            ArgType::Address => ArgValue::Address(Address::ZERO),
        }
    }

    pub fn arg_type(&self) -> ArgType {
        match self {
            ArgValue::Bytes(_) => ArgType::Bytes,
            ArgValue::String(_) => ArgType::String,
            ArgValue::Address(_) => ArgType::Address,
        }
    }
}

/// A named positional argument.
///
/// When packing, `value` is the input. When unpacking, the argument is an
/// output slot: the codec replaces `value` with what it decoded, keeping the
/// slot's type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecArg {
    pub name: String,
    pub value: ArgValue,
}

impl CodecArg {
    pub fn new(name: impl Into<String>, value: ArgValue) -> Self {
        Self { name: name.into(), value }
    }

    /// Output slot of type `arg_type`.
    pub fn slot(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self::new(name, ArgValue::empty(arg_type))
    }

    pub fn arg_type(&self) -> ArgType {
        self.value.arg_type()
    }
}

pub(crate) const ARG_RECEIVER: &str = "receiver";
pub(crate) const ARG_PAYLOAD: &str = "payload";
pub(crate) const ARG_REVERT_ADDRESS: &str = "revertAddress";
pub(crate) const ARG_ABORT_ADDRESS: &str = "abortAddress";
pub(crate) const ARG_REVERT_MESSAGE: &str = "revertMessage";

/// Receiver argument.
pub fn arg_receiver(receiver: Address) -> CodecArg {
    CodecArg::new(ARG_RECEIVER, ArgValue::Address(receiver))
}

/// Payload argument.
pub fn arg_payload(payload: impl Into<Vec<u8>>) -> CodecArg {
    CodecArg::new(ARG_PAYLOAD, ArgValue::Bytes(payload.into()))
}

/// Revert address argument.
pub fn arg_revert_address(revert_address: impl Into<String>) -> CodecArg {
    CodecArg::new(ARG_REVERT_ADDRESS, ArgValue::String(revert_address.into()))
}

/// Abort address argument.
pub fn arg_abort_address(abort_address: Address) -> CodecArg {
    CodecArg::new(ARG_ABORT_ADDRESS, ArgValue::Address(abort_address))
}

/// Revert message argument.
pub fn arg_revert_message(revert_message: impl Into<Vec<u8>>) -> CodecArg {
    CodecArg::new(ARG_REVERT_MESSAGE, ArgValue::Bytes(revert_message.into()))
}
