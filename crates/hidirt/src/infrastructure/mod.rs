//! Infrastructure layer for the bridge.
//!
//! Contains OS-facing adapters: USB HID access, desktop actuators and the
//! configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `hidirt_core`, but MUST NOT be imported by the `application` or domain
//! layers outside of tests.
//!
//! # Sub-modules
//!
//! - **`device`** – `HidTransport`/`DeviceConnector` implementations.  The
//!   hidapi-backed pair talks to the real transceiver; `ScriptedDevice` is an
//!   in-memory stand-in that replays a script of interrupt reports and
//!   unplug events.
//!
//! - **`actuators`** – `KeySequenceInjector` via X11/XTest and
//!   `ProcessLauncher` via the platform shell, plus recording mocks.
//!
//! - **`storage`** – loading and first-run creation of the TOML file holding
//!   the settings, the device identifiers and the rule table.

pub mod actuators;
pub mod device;
pub mod storage;
