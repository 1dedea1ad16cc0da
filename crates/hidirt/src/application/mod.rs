//! Application layer use cases for the bridge.
//!
//! # What use cases does the bridge have?
//!
//! - **`device_session`** – Owns the open device handle, performs single
//!   report transactions and re-opens the device after it was unplugged.
//!   The USB access itself is injected as a `DeviceConnector`.
//!
//! - **`register_access`** – One-shot reads and writes of configuration
//!   registers requested on the command line, IR code transmission and the
//!   device details shown in verbose mode.
//!
//! - **`execute_actions`** – Carries out the actions chosen by
//!   `hidirt_core::dispatch` through injected key and process actuators.
//!
//! - **`session_loop`** – Polls for IR codes until shutdown and ties the
//!   other use cases together.

pub mod device_session;
pub mod execute_actions;
pub mod register_access;
pub mod session_loop;
