//! Version 0 memo fields.
//!
//! The receiver is always encoded first. The optional fields follow in data
//! flag bit order, each one present on the wire only when its bit is set:
//!
//! | bit | field           | type      |
//! |-----|-----------------|-----------|
//! | 0   | `payload`       | `bytes`   |
//! | 1   | `revertAddress` | `string`  |
//! | 2   | `abortAddress`  | `address` |
//! | 3   | `revertMessage` | `bytes`   |
//!
//! Bits 4..7 are reserved and must be zero. Bit 3 doubles as the
//! `call_on_revert` switch.

use alloy_primitives::Address;
use tracing::trace;

use crate::arg::{
    arg_receiver, ArgType, ArgValue, CodecArg, ARG_ABORT_ADDRESS, ARG_PAYLOAD, ARG_RECEIVER,
    ARG_REVERT_ADDRESS, ARG_REVERT_MESSAGE,
};
use crate::bits::{is_bit_set, set_bit};
use crate::codec::get_codec;
use crate::error::MemoError;
use crate::header::{EncodingFormat, OpCode};
use crate::utils::{address_to_hex, hex_to_address};

/// Data flag bit of the payload.
pub const BIT_PAYLOAD: u8 = 0;
/// Data flag bit of the revert address.
pub const BIT_REVERT_ADDRESS: u8 = 1;
/// Data flag bit of the abort address.
pub const BIT_ABORT_ADDRESS: u8 = 2;
/// Data flag bit of the revert message, also meaning `call_on_revert`.
pub const BIT_REVERT_MESSAGE: u8 = 3;

const MASK_RESERVED_FLAGS: u8 = 0b1111_0000;

/// What to do when the cross-chain call reverts or aborts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevertOptions {
    pub revert_address: String,
    pub call_on_revert: bool,
    /// Hex address, checksummed after a decode.
    pub abort_address: String,
    pub revert_message: Vec<u8>,
}

/// Fields carried by a version 0 memo.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldsV0 {
    pub receiver: Address,
    /// An empty payload is encoded as no payload.
    pub payload: Vec<u8>,
    pub revert_options: RevertOptions,
}

/// One optional field: its flag bit, argument name and type, and how it is
/// read from and written back to [`FieldsV0`].
struct OptionalField {
    bit: u8,
    name: &'static str,
    arg_type: ArgType,
    present: fn(&FieldsV0) -> bool,
    to_arg: fn(&FieldsV0) -> Result<ArgValue, MemoError>,
    from_arg: fn(&mut FieldsV0, ArgValue),
}

static OPTIONAL_FIELDS: [OptionalField; 4] = [
    OptionalField {
        bit: BIT_PAYLOAD,
        name: ARG_PAYLOAD,
        arg_type: ArgType::Bytes,
        present: has_payload,
        to_arg: payload_arg,
        from_arg: set_payload,
    },
    OptionalField {
        bit: BIT_REVERT_ADDRESS,
        name: ARG_REVERT_ADDRESS,
        arg_type: ArgType::String,
        present: has_revert_address,
        to_arg: revert_address_arg,
        from_arg: set_revert_address,
    },
    OptionalField {
        bit: BIT_ABORT_ADDRESS,
        name: ARG_ABORT_ADDRESS,
        arg_type: ArgType::Address,
        present: has_abort_address,
        to_arg: abort_address_arg,
        from_arg: set_abort_address,
    },
    OptionalField {
        bit: BIT_REVERT_MESSAGE,
        name: ARG_REVERT_MESSAGE,
        arg_type: ArgType::Bytes,
        present: calls_on_revert,
        to_arg: revert_message_arg,
        from_arg: set_revert_message,
    },
];

fn has_payload(fields: &FieldsV0) -> bool {
    !fields.payload.is_empty()
}

fn payload_arg(fields: &FieldsV0) -> Result<ArgValue, MemoError> {
    Ok(ArgValue::Bytes(fields.payload.clone()))
}

fn set_payload(fields: &mut FieldsV0, value: ArgValue) {
    if let ArgValue::Bytes(payload) = value {
        fields.payload = payload;
    }
}

fn has_revert_address(fields: &FieldsV0) -> bool {
    !fields.revert_options.revert_address.is_empty()
}

fn revert_address_arg(fields: &FieldsV0) -> Result<ArgValue, MemoError> {
    Ok(ArgValue::String(fields.revert_options.revert_address.clone()))
}

fn set_revert_address(fields: &mut FieldsV0, value: ArgValue) {
    if let ArgValue::String(address) = value {
        fields.revert_options.revert_address = address;
    }
}

fn has_abort_address(fields: &FieldsV0) -> bool {
    !fields.revert_options.abort_address.is_empty()
}

fn abort_address_arg(fields: &FieldsV0) -> Result<ArgValue, MemoError> {
    hex_to_address(&fields.revert_options.abort_address).map(ArgValue::Address)
}

fn set_abort_address(fields: &mut FieldsV0, value: ArgValue) {
    if let ArgValue::Address(address) = value {
        fields.revert_options.abort_address = address_to_hex(address);
    }
}

fn calls_on_revert(fields: &FieldsV0) -> bool {
    fields.revert_options.call_on_revert
}

fn revert_message_arg(fields: &FieldsV0) -> Result<ArgValue, MemoError> {
    Ok(ArgValue::Bytes(fields.revert_options.revert_message.clone()))
}

fn set_revert_message(fields: &mut FieldsV0, value: ArgValue) {
    if let ArgValue::Bytes(message) = value {
        fields.revert_options.revert_message = message;
    }
}

fn flagged(data_flags: u8) -> impl Iterator<Item = &'static OptionalField> {
    OPTIONAL_FIELDS.iter().filter(move |field| is_bit_set(data_flags, field.bit))
}

impl FieldsV0 {
    /// Data flags describing which optional fields are populated.
    pub fn data_flags(&self) -> u8 {
        let mut flags = 0;
        for field in OPTIONAL_FIELDS.iter().filter(|field| (field.present)(self)) {
            set_bit(&mut flags, field.bit);
        }
        flags
    }

    /// Validates the fields and packs the receiver plus every field flagged in
    /// `data_flags` with the codec for `encoding_fmt`.
    pub fn pack(
        &self,
        op_code: OpCode,
        encoding_fmt: EncodingFormat,
        data_flags: u8,
    ) -> Result<Vec<u8>, MemoError> {
        self.validate(op_code, data_flags)?;

        let mut codec = get_codec(encoding_fmt).map_err(MemoError::Codec)?;

        let mut args = vec![arg_receiver(self.receiver)];
        for field in flagged(data_flags) {
            args.push(CodecArg::new(field.name, (field.to_arg)(self)?));
        }
        codec.add_arguments(args);

        let packed = codec.pack_arguments().map_err(MemoError::Pack)?;
        trace!(%encoding_fmt, data_flags, bytes = packed.len(), "packed memo fields");
        Ok(packed)
    }

    /// Unpacks the receiver plus every field flagged in `data_flags` from
    /// `data`, which must hold exactly the field bytes.
    ///
    /// `call_on_revert` is taken from the revert message bit. Fields whose bit
    /// is clear are left untouched.
    pub fn unpack(
        &mut self,
        encoding_fmt: EncodingFormat,
        data_flags: u8,
        data: &[u8],
    ) -> Result<(), MemoError> {
        let mut codec = get_codec(encoding_fmt).map_err(MemoError::Codec)?;

        let mut slots = vec![CodecArg::slot(ARG_RECEIVER, ArgType::Address)];
        slots.extend(flagged(data_flags).map(|field| CodecArg::slot(field.name, field.arg_type)));
        codec.add_arguments(slots);

        codec.unpack_arguments(data).map_err(MemoError::Unpack)?;

        let mut args = codec.into_arguments().into_iter();
        if let Some(CodecArg { value: ArgValue::Address(receiver), .. }) = args.next() {
            self.receiver = receiver;
        }
        for (field, arg) in flagged(data_flags).zip(args) {
            (field.from_arg)(self, arg.value);
        }
        self.revert_options.call_on_revert = is_bit_set(data_flags, BIT_REVERT_MESSAGE);

        Ok(())
    }

    /// Checks the fields against the operation and the data flags.
    pub fn validate(&self, op_code: OpCode, data_flags: u8) -> Result<(), MemoError> {
        if data_flags & MASK_RESERVED_FLAGS != 0 {
            return Err(MemoError::field("reserved flags are not zero"));
        }

        if self.receiver.is_zero() {
            return Err(MemoError::field("receiver address is empty"));
        }

        if op_code == OpCode::DEPOSIT && !self.payload.is_empty() {
            return Err(MemoError::field("payload is not allowed for deposit operation"));
        }

        let options = &self.revert_options;
        if options.call_on_revert && options.revert_address.is_empty() {
            return Err(MemoError::field("revert address is empty"));
        }

        if !options.abort_address.is_empty() {
            let abort = hex_to_address(&options.abort_address)
                .map_err(|e| MemoError::field(format!("invalid abort address: {e}")))?;
            if abort.is_zero() {
                return Err(MemoError::field("abort address is empty"));
            }
        }

        Ok(())
    }
}
