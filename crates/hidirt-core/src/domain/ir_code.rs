//! Typed register values.
//!
//! These are the values the codec produces from report payloads and consumes
//! when building reports.  Each type's `Display` implementation is the
//! canonical textual rendering printed by the command-line tool.

use std::fmt;

/// A decoded infrared remote-control code.
///
/// Produced from the 6-byte IR code layout shared by the interrupt report
/// and the stored-code registers:
///
/// ```text
/// [protocol:1][address:2 LE][command:2 LE][flags:1]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IrCode {
    /// IR protocol number as reported by the device's decoder (e.g. NEC).
    pub protocol: u8,
    /// Device address encoded in the IR frame.
    pub address: u16,
    /// Command (button) encoded in the IR frame.
    pub command: u16,
    /// Decoder flags, e.g. the repetition bit.
    pub flags: u8,
}

impl IrCode {
    /// Serialises the code into its 6-byte wire layout.
    pub fn to_bytes(self) -> [u8; 6] {
        let [addr_lo, addr_hi] = self.address.to_le_bytes();
        let [cmd_lo, cmd_hi] = self.command.to_le_bytes();
        [self.protocol, addr_lo, addr_hi, cmd_lo, cmd_hi, self.flags]
    }

    /// Reconstructs a code from its 6-byte wire layout.
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self {
            protocol: bytes[0],
            address: u16::from_le_bytes([bytes[1], bytes[2]]),
            command: u16::from_le_bytes([bytes[3], bytes[4]]),
            flags: bytes[5],
        }
    }
}

impl fmt::Display for IrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:02x},0x{:04x},0x{:04x},0x{:02x}",
            self.protocol, self.address, self.command, self.flags
        )
    }
}

/// The device's real-time clock reading.
///
/// On the wire the sub-second part is stored as milliseconds × 10; decoding
/// divides by ten with integer truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceTime {
    pub seconds: u32,
    pub milliseconds: u16,
}

impl fmt::Display for DeviceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.seconds, self.milliseconds)
    }
}

/// A decoded register payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterValue {
    Byte(u8),
    IrCode(IrCode),
    DeviceTime(DeviceTime),
    Signed32(i32),
    Text(String),
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterValue::Byte(v) => write!(f, "{v}"),
            RegisterValue::IrCode(code) => code.fmt(f),
            RegisterValue::DeviceTime(time) => time.fmt(f),
            RegisterValue::Signed32(v) => write!(f, "{v}"),
            RegisterValue::Text(text) => f.write_str(text),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
