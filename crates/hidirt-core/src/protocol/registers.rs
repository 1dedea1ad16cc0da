//! The fixed table of HIDIRT device registers.
//!
//! Every register is a feature report with a one-byte report identifier and
//! a fixed payload size.  The identifier is always the first byte on the
//! wire; the payload follows immediately:
//!
//! ```text
//! [report_id:1][payload:N]
//! ```
//!
//! | Id   | Register          | Kind        | Payload |
//! |------|-------------------|-------------|---------|
//! | 0x10 | firmware version  | text        | ≤ 15    |
//! | 0x11 | control PC enable | byte        | 1       |
//! | 0x12 | forward IR enable | byte        | 1       |
//! | 0x13 | power-on code     | IR code     | 6       |
//! | 0x14 | power-off code    | IR code     | 6       |
//! | 0x15 | reset code        | IR code     | 6       |
//! | 0x16 | minimum repeats   | byte        | 1       |
//! | 0x17 | device time       | device time | 6       |
//! | 0x18 | clock deviation   | signed 32   | 4       |
//! | 0x19 | wakeup time       | signed 32   | 4       |
//! | 0x1a | wakeup time span  | signed 32   | 4       |
//! | 0x50 | bootloader request| byte        | 1       |
//! | 0x51 | watchdog enable   | byte        | 1       |
//! | 0x52 | watchdog reset    | byte        | 1       |
//!
//! The IR code interrupt report (id 0x01) is not a register: it is pushed by
//! the device and carries the same 6-byte IR code layout.

use std::fmt;

/// Report identifier of the asynchronous IR code interrupt report.
pub const IR_CODE_INTERRUPT_ID: u8 = 0x01;

/// Payload size of an IR code, both as register and as interrupt report.
pub const IR_CODE_PAYLOAD_LEN: usize = 6;

/// Largest feature report the device answers with, including the id byte.
pub const MAX_FEATURE_REPORT_LEN: usize = 16;

/// Payload shape of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    /// One unsigned byte (flags, counters, triggers).
    Byte,
    /// Six bytes: protocol, address (LE), command (LE), flags.
    IrCode,
    /// Six bytes: seconds (u32 LE) + milliseconds×10 (u16 LE).
    DeviceTime,
    /// Four bytes, two's-complement little-endian.
    Signed32,
    /// NUL-terminated text of at most 15 bytes.
    Text,
}

impl RegisterKind {
    /// Number of payload bytes following the report identifier.
    ///
    /// For [`RegisterKind::Text`] this is the maximum length.
    pub const fn payload_len(self) -> usize {
        match self {
            RegisterKind::Byte => 1,
            RegisterKind::IrCode | RegisterKind::DeviceTime => 6,
            RegisterKind::Signed32 => 4,
            RegisterKind::Text => MAX_FEATURE_REPORT_LEN - 1,
        }
    }
}

/// All device registers reachable through feature reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    FirmwareVersion = 0x10,
    ControlPcEnable = 0x11,
    ForwardIrEnable = 0x12,
    PowerOnCode = 0x13,
    PowerOffCode = 0x14,
    ResetCode = 0x15,
    MinRepeats = 0x16,
    DeviceTime = 0x17,
    ClockDeviation = 0x18,
    WakeupTime = 0x19,
    WakeupTimeSpan = 0x1a,
    RequestBootloader = 0x50,
    WatchdogEnable = 0x51,
    WatchdogReset = 0x52,
}

impl Register {
    /// Every register, in report identifier order.
    pub const ALL: [Register; 14] = [
        Register::FirmwareVersion,
        Register::ControlPcEnable,
        Register::ForwardIrEnable,
        Register::PowerOnCode,
        Register::PowerOffCode,
        Register::ResetCode,
        Register::MinRepeats,
        Register::DeviceTime,
        Register::ClockDeviation,
        Register::WakeupTime,
        Register::WakeupTimeSpan,
        Register::RequestBootloader,
        Register::WatchdogEnable,
        Register::WatchdogReset,
    ];

    /// The one-byte report identifier prefixed to every transaction.
    pub const fn report_id(self) -> u8 {
        self as u8
    }

    /// Payload shape of this register.
    pub const fn kind(self) -> RegisterKind {
        match self {
            Register::FirmwareVersion => RegisterKind::Text,
            Register::ControlPcEnable
            | Register::ForwardIrEnable
            | Register::MinRepeats
            | Register::RequestBootloader
            | Register::WatchdogEnable
            | Register::WatchdogReset => RegisterKind::Byte,
            Register::PowerOnCode | Register::PowerOffCode | Register::ResetCode => {
                RegisterKind::IrCode
            }
            Register::DeviceTime => RegisterKind::DeviceTime,
            Register::ClockDeviation | Register::WakeupTime | Register::WakeupTimeSpan => {
                RegisterKind::Signed32
            }
        }
    }

    /// Number of payload bytes following the report identifier.
    pub const fn payload_len(self) -> usize {
        self.kind().payload_len()
    }

    /// Total feature report size (identifier + payload).
    pub const fn report_len(self) -> usize {
        1 + self.payload_len()
    }

    /// Whether the host may write this register.
    ///
    /// The firmware version is read-only and the device-time write
    /// transaction is not implemented.
    pub const fn is_writable(self) -> bool {
        !matches!(self, Register::FirmwareVersion | Register::DeviceTime)
    }

    /// Human-readable register name used in log output.
    pub const fn name(self) -> &'static str {
        match self {
            Register::FirmwareVersion => "firmware version",
            Register::ControlPcEnable => "control PC enable",
            Register::ForwardIrEnable => "forward IR enable",
            Register::PowerOnCode => "power-on code",
            Register::PowerOffCode => "power-off code",
            Register::ResetCode => "reset code",
            Register::MinRepeats => "minimum repeats",
            Register::DeviceTime => "device time",
            Register::ClockDeviation => "clock deviation",
            Register::WakeupTime => "wakeup time",
            Register::WakeupTimeSpan => "wakeup time span",
            Register::RequestBootloader => "bootloader request",
            Register::WatchdogEnable => "watchdog enable",
            Register::WatchdogReset => "watchdog reset",
        }
    }
}

impl TryFrom<u8> for Register {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        Register::ALL
            .into_iter()
            .find(|r| r.report_id() == value)
            .ok_or(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.name(), self.report_id())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
