//! hidirt library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does hidirt do? (for beginners)
//!
//! A HIDIRT transceiver decodes the infrared signals of ordinary remote
//! controls and reports each button press to the PC over USB.  This program
//! turns those button presses into desktop actions:
//!
//! 1. Opens the transceiver (USB vendor 0x0483, product 0x6611) through
//!    hidapi.
//! 2. Optionally reads or writes configuration registers requested on the
//!    command line (enable flags, stored power codes, clock values).
//! 3. Polls the device every 25 ms for interrupt reports carrying an IR code.
//! 4. Looks the code up in the user's rule table and, for every matching
//!    rule, types a key sequence into the active window and/or starts a
//!    program.
//! 5. Waits for the device to come back if it is unplugged, and exits
//!    cleanly on Ctrl+C.

/// Application layer: use cases for the bridge.
pub mod application;

/// Infrastructure layer: USB access, actuators and configuration storage.
pub mod infrastructure;
