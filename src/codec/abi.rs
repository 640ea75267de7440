//! ABI codec backed by the generic Ethereum ABI encoder.
//!
//! The argument list is turned into a throwaway method signature,
//! `function memo(<types>) returns (<types>)`. Packing encodes the inputs and
//! drops the 4-byte selector, which means nothing outside a real call.
//! Unpacking decodes the same types as the method's outputs.

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::Function;
use tracing::trace;

use crate::arg::{ArgValue, CodecArg};
use crate::codec::Codec;
use crate::error::CodecError;

/// Method name used for the synthesized signature.
const ABI_METHOD_NAME: &str = "memo";

/// Length of the method selector stripped from packed data.
const SELECTOR_LEN: usize = 4;

/// ABI [`Codec`].
#[derive(Clone, Debug, Default)]
pub struct CodecAbi {
    args: Vec<CodecArg>,
}

impl CodecAbi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signature of the synthesized method for the current argument types.
    pub fn method_signature(&self) -> String {
        let types = self
            .args
            .iter()
            .map(|arg| arg.arg_type().abi_name())
            .collect::<Vec<_>>()
            .join(",");

        if types.is_empty() {
            format!("function {ABI_METHOD_NAME}()")
        } else {
            format!("function {ABI_METHOD_NAME}({types}) returns ({types})")
        }
    }

    fn method(&self) -> Result<Function, CodecError> {
        let signature = self.method_signature();
        Function::parse(&signature).map_err(|e| CodecError::AbiParse(format!("{signature}: {e}")))
    }
}

fn to_sol_value(value: &ArgValue) -> DynSolValue {
    match value {
        ArgValue::Bytes(bytes) => DynSolValue::Bytes(bytes.clone()),
        ArgValue::String(s) => DynSolValue::String(s.clone()),
        ArgValue::Address(addr) => DynSolValue::Address(*addr),
    }
}

fn from_sol_value(slot: &CodecArg, value: DynSolValue) -> Result<ArgValue, CodecError> {
    match (&slot.value, value) {
        (ArgValue::Bytes(_), DynSolValue::Bytes(bytes)) => Ok(ArgValue::Bytes(bytes)),
        (ArgValue::String(_), DynSolValue::String(s)) => Ok(ArgValue::String(s)),
        (ArgValue::Address(_), DynSolValue::Address(addr)) => Ok(ArgValue::Address(addr)),
        (_, other) => Err(CodecError::AbiUnpack(format!(
            "argument ({}) expects {}, got {:?}",
            slot.name,
            slot.arg_type(),
            other.sol_type_name()
        ))),
    }
}

impl Codec for CodecAbi {
    fn add_arguments(&mut self, args: Vec<CodecArg>) {
        self.args.extend(args);
    }

    fn pack_arguments(&self) -> Result<Vec<u8>, CodecError> {
        let method = self.method()?;
        let values = self.args.iter().map(|arg| to_sol_value(&arg.value)).collect::<Vec<_>>();

        let mut packed = method
            .abi_encode_input(&values)
            .map_err(|e| CodecError::AbiPack(e.to_string()))?;
        packed.drain(..SELECTOR_LEN);

        trace!(args = self.args.len(), bytes = packed.len(), "packed ABI arguments");
        Ok(packed)
    }

    fn unpack_arguments(&mut self, data: &[u8]) -> Result<(), CodecError> {
        let method = self.method()?;
        let values = method
            .abi_decode_output(data)
            .map_err(|e| CodecError::AbiUnpack(e.to_string()))?;

        if values.len() != self.args.len() {
            return Err(CodecError::AbiUnpack(format!(
                "expected {} values, got {}",
                self.args.len(),
                values.len()
            )));
        }

        for (slot, value) in self.args.iter_mut().zip(values) {
            slot.value = from_sol_value(slot, value)?;
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
    use crate::test_utils::{abi_pack, pad_left, ABI_ALIGNMENT};
    use alloy_primitives::{address, Address};

    const ARG_ADDRESS: Address = address!("ef221ec80f004e6a2ee4e5f5d800699c1c68cd6f");

    fn sample_args() -> Vec<CodecArg> {
        vec![
            arg_receiver(ARG_ADDRESS),
            arg_payload(b"some test bytes argument".to_vec()),
            arg_revert_address("some test string argument"),
        ]
    }

    #[test]
    fn method_signature_follows_argument_types() {
        let mut codec = CodecAbi::new();
        assert_eq!(codec.method_signature(), "function memo()");
        codec.add_arguments(sample_args());
        assert_eq!(
            codec.method_signature(),
            "function memo(address,bytes,string) returns (address,bytes,string)"
        );
    }

    #[test]
    fn pack_single_address() {
        let mut codec = CodecAbi::new();
        codec.add_arguments(vec![arg_receiver(ARG_ADDRESS)]);
        let packed = codec.pack_arguments().unwrap();
        assert_eq!(packed, pad_left(ARG_ADDRESS.as_slice()));
    }

    #[test]
    fn pack_matches_reference_in_any_order() {
        let args = sample_args();
        let reordered = vec![args[2].clone(), args[0].clone(), args[1].clone()];

        for args in [args, reordered] {
            let mut codec = CodecAbi::new();
            codec.add_arguments(args.clone());
            assert_eq!(codec.pack_arguments().unwrap(), abi_pack(&args));
        }
    }

    #[test]
    fn pack_empty_bytes_and_string() {
        let args = vec![arg_payload(Vec::new()), arg_revert_address("")];
        let mut codec = CodecAbi::new();
        codec.add_arguments(args.clone());
        let packed = codec.pack_arguments().unwrap();
        // two offsets followed by two zero lengths
        assert_eq!(packed.len(), 4 * ABI_ALIGNMENT);
        assert_eq!(packed, abi_pack(&args));
    }

    #[test]
    fn unpack_round_trips() {
        let args = sample_args();
        let mut codec = CodecAbi::new();
        codec.add_arguments(args.iter().map(|a| CodecArg::slot(a.name.clone(), a.arg_type())).collect());
        codec.unpack_arguments(&abi_pack(&args)).unwrap();
        assert_eq!(codec.arguments(), args.as_slice());
    }

    #[test]
    fn unpack_rejects_truncated_data() {
        let args = sample_args();
        let data = abi_pack(&args);
        let mut codec = CodecAbi::new();
        codec.add_arguments(args.iter().map(|a| CodecArg::slot(a.name.clone(), a.arg_type())).collect());
        let err = codec.unpack_arguments(&data[..data.len() - 40]).unwrap_err();
        assert!(err.to_string().contains("failed to unpack ABI encoded data"), "{err}");
    }

    #[test]
    fn unpack_rejects_empty_data() {
        let mut codec = CodecAbi::new();
        codec.add_arguments(vec![CodecArg::slot("receiver", ArgType::Address)]);
        let err = codec.unpack_arguments(&[]).unwrap_err();
        assert!(err.to_string().contains("failed to unpack ABI encoded data"), "{err}");
    }

    // Unlike the compact codec, ABI decoding does not require exact
    // consumption and ignores the high bytes of an address word.
    #[test]
    fn unpack_ignores_trailing_words() {
        let args = sample_args();
        let mut data = abi_pack(&args);
        data.extend_from_slice(&[0xEE; ABI_ALIGNMENT]);

        let mut codec = CodecAbi::new();
        codec.add_arguments(args.iter().map(|a| CodecArg::slot(a.name.clone(), a.arg_type())).collect());
        codec.unpack_arguments(&data).unwrap();
        assert_eq!(codec.arguments(), args.as_slice());
    }

    #[test]
    fn unpack_ignores_address_padding() {
        let mut data = pad_left(ARG_ADDRESS.as_slice());
        data[0] = 0xFF;
        data[11] = 0x01;

        let mut codec = CodecAbi::new();
        codec.add_arguments(vec![CodecArg::slot("receiver", ArgType::Address)]);
        codec.unpack_arguments(&data).unwrap();
        assert_eq!(codec.arguments()[0].value, ArgValue::Address(ARG_ADDRESS));
    }
}
