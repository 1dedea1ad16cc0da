//! Protocol module containing the register table, dual-notation parsing and
//! the report codec.

pub mod codec;
pub mod notation;
pub mod registers;

pub use codec::{
    decode_interrupt, decode_register, encode_interrupt, encode_register, parse_register_value,
    CodecError,
};
pub use registers::{Register, RegisterKind, IR_CODE_INTERRUPT_ID};
