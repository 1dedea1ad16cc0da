//! The user-editable rule table and global settings.
//!
//! Both types are read once from the configuration file at startup and are
//! never mutated afterwards.  They derive `Serialize`/`Deserialize` so the
//! storage layer can map them straight to and from TOML:
//!
//! ```toml
//! [settings]
//! send_keys = true
//! start_apps = false
//!
//! [[mappings]]
//! description = "volume up"
//! ir_protocol = 0x01
//! ir_address = 0x02
//! ir_command = 0x03
//! key = "XF86AudioRaiseVolume"
//! ```
//!
//! Every field is optional in the file.  A mapping that lacks any of the
//! three IR fields never matches.

use serde::{Deserialize, Serialize};

/// One IR-code-to-action mapping.
///
/// The IR fields are stored as wide signed integers so that a value outside
/// the wire range (say, a negative address) simply never matches instead of
/// failing to load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MappingRule {
    /// Free-form label shown in log output.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ir_protocol: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ir_address: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ir_command: Option<i64>,
    /// Whitespace-separated chords of `+`-joined KeySym names, e.g. `"ctrl+alt+t"`.
    #[serde(default, rename = "key", alias = "key_sequence", skip_serializing_if = "Option::is_none")]
    pub key_sequence: Option<String>,
    /// Program to start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    /// Argument string appended to `application`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl MappingRule {
    /// Returns the `(protocol, address, command)` triple, or `None` when any
    /// of the three fields is missing.
    pub fn ir_triple(&self) -> Option<(i64, i64, i64)> {
        Some((self.ir_protocol?, self.ir_address?, self.ir_command?))
    }
}

/// Global switches gating what dispatch is allowed to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Inject key sequences for matching rules.
    #[serde(default)]
    pub send_keys: bool,
    /// Launch applications for matching rules.
    #[serde(default)]
    pub start_apps: bool,
    /// Keep the device clock in sync with the PC clock.
    #[serde(default)]
    pub sync_clocks: bool,
    /// When syncing, the PC clock is the reference.
    #[serde(default = "default_true")]
    pub pc_clock_is_origin: bool,
    /// Unix timestamp at which clock calibration started (0 = never).
    #[serde(default)]
    pub calibration_start_time: i64,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            send_keys: false,
            start_apps: false,
            sync_clocks: false,
            pc_clock_is_origin: default_true(),
            calibration_start_time: 0,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
