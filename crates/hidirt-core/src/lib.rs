//! # hidirt-core
//!
//! Shared library for the HIDIRT host bridge containing the report codec,
//! the register table, the rule table types and the dispatch engine.
//!
//! It has zero dependencies on OS APIs, USB stacks, or desktop automation
//! tools, so everything here can be tested as plain functions.
//!
//! # Architecture overview (for beginners)
//!
//! HIDIRT is a small USB infrared transceiver.  It shows up on the host as a
//! HID device and talks to it with *reports*: short byte buffers whose first
//! byte is a report identifier.  When a remote control button is pressed the
//! device pushes an *interrupt report* carrying the decoded IR code; the host
//! can also read and write *feature reports* that act as configuration
//! registers (enable flags, stored IR codes, clock values).
//!
//! This crate (`hidirt-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How bytes travel over the USB wire.  Each register has
//!   a fixed payload layout that is encoded to and decoded from typed values.
//!
//! - **`domain`** – Pure business logic with no OS dependencies: the decoded
//!   [`IrCode`], the user's [`MappingRule`] table, the global [`Settings`] and
//!   the [`dispatch`] function that decides which actions an IR code triggers.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `hidirt_core::IrCode` instead of `hidirt_core::domain::ir_code::IrCode`.
pub use domain::dispatch::{dispatch, Action};
pub use domain::ir_code::{DeviceTime, IrCode, RegisterValue};
pub use domain::rules::{MappingRule, Settings};
pub use protocol::codec::{
    decode_interrupt, decode_register, encode_interrupt, encode_register, parse_register_value,
    CodecError,
};
pub use protocol::registers::{Register, RegisterKind, IR_CODE_INTERRUPT_ID};
