//! Device transports.
//!
//! `usb_hid` talks to the real transceiver through hidapi; `mock` is a
//! scripted in-memory device used by unit and integration tests.

pub mod mock;
pub mod usb_hid;
