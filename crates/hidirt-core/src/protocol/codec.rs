//! Report codec for HIDIRT feature and interrupt reports.
//!
//! Wire format (every report):
//! ```text
//! [report_id:1][payload:N]
//! ```
//! `N` is fixed per register (see [`crate::protocol::registers`]).  All
//! multi-byte integers are little-endian.
//!
//! The codec is a table-driven tagged dispatch: the register's
//! [`RegisterKind`] selects the encode/decode routine and the payload size.
//! It owns no state and performs no I/O.

use thiserror::Error;

use crate::domain::ir_code::{DeviceTime, IrCode, RegisterValue};
use crate::protocol::notation::{parse_dual_notation, parse_ir_code_fields};
use crate::protocol::registers::{Register, RegisterKind, IR_CODE_INTERRUPT_ID, IR_CODE_PAYLOAD_LEN};

/// Errors that can occur while encoding or decoding reports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The report does not have the register's fixed size.
    #[error("malformed report for {register}: expected {expected} bytes, got {actual}")]
    MalformedReport {
        register: String,
        expected: usize,
        actual: usize,
    },

    /// A textual value could not be parsed as an integer.
    #[error("invalid argument '{token}': {reason}")]
    InvalidArgument { token: String, reason: String },

    /// The report's identifier byte is not the one that was requested.
    #[error("unexpected report id: expected 0x{expected:02x}, got 0x{actual:02x}")]
    UnexpectedReportId { expected: u8, actual: u8 },

    /// An interrupt report arrived with an identifier this host does not know.
    #[error("unknown report id: 0x{0:02x}")]
    UnknownReport(u8),

    /// The value does not fit the register's wire representation.
    #[error("value {value:?} cannot be encoded for {register}")]
    ValueOutOfRange { register: String, value: String },

    /// The requested direction is not implemented for this register.
    #[error("writing {0} is not supported")]
    NotSupported(String),
}

impl CodecError {
    pub(crate) fn invalid(token: &str, reason: impl Into<String>) -> Self {
        CodecError::InvalidArgument {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    fn malformed(label: impl ToString, expected: usize, actual: usize) -> Self {
        CodecError::MalformedReport {
            register: label.to_string(),
            expected,
            actual,
        }
    }

    fn out_of_range(register: Register, value: &RegisterValue) -> Self {
        CodecError::ValueOutOfRange {
            register: register.to_string(),
            value: format!("{value:?}"),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `value` into a complete feature report for `register`.
///
/// The returned buffer starts with the register's report identifier and is
/// exactly [`Register::report_len`] bytes long.
///
/// # Errors
///
/// - [`CodecError::NotSupported`] for the read-only firmware version.
/// - [`CodecError::ValueOutOfRange`] if `value`'s variant does not match the
///   register kind, or a device time's milliseconds exceed the wire field.
///
/// # Examples
///
/// ```rust
/// use hidirt_core::{encode_register, decode_register, Register, RegisterValue};
///
/// let report = encode_register(Register::ClockDeviation, &RegisterValue::Signed32(-2)).unwrap();
/// assert_eq!(report, vec![0x18, 0xfe, 0xff, 0xff, 0xff]);
/// assert_eq!(
///     decode_register(Register::ClockDeviation, &report).unwrap(),
///     RegisterValue::Signed32(-2)
/// );
/// ```
pub fn encode_register(register: Register, value: &RegisterValue) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(register.report_len());
    buf.push(register.report_id());

    match (register.kind(), value) {
        (RegisterKind::Byte, RegisterValue::Byte(v)) => buf.push(*v),
        (RegisterKind::IrCode, RegisterValue::IrCode(code)) => buf.extend_from_slice(&code.to_bytes()),
        (RegisterKind::DeviceTime, RegisterValue::DeviceTime(time)) => {
            let tenths = time
                .milliseconds
                .checked_mul(10)
                .ok_or_else(|| CodecError::out_of_range(register, value))?;
            buf.extend_from_slice(&time.seconds.to_le_bytes());
            buf.extend_from_slice(&tenths.to_le_bytes());
        }
        (RegisterKind::Signed32, RegisterValue::Signed32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (RegisterKind::Text, _) => return Err(CodecError::NotSupported(register.to_string())),
        _ => return Err(CodecError::out_of_range(register, value)),
    }

    Ok(buf)
}

/// Decodes a complete feature report (identifier + payload) for `register`.
///
/// # Errors
///
/// - [`CodecError::MalformedReport`] if the report length does not equal the
///   register's fixed report size (text registers accept any length up to
///   the maximum).
/// - [`CodecError::UnexpectedReportId`] if the first byte is not the
///   register's identifier.
pub fn decode_register(register: Register, report: &[u8]) -> Result<RegisterValue, CodecError> {
    let Some((&id, payload)) = report.split_first() else {
        return Err(CodecError::malformed(register, register.report_len(), 0));
    };
    if id != register.report_id() {
        return Err(CodecError::UnexpectedReportId {
            expected: register.report_id(),
            actual: id,
        });
    }

    let kind = register.kind();
    let size_ok = match kind {
        RegisterKind::Text => payload.len() <= kind.payload_len(),
        _ => payload.len() == kind.payload_len(),
    };
    if !size_ok {
        return Err(CodecError::malformed(register, register.report_len(), report.len()));
    }

    let value = match kind {
        RegisterKind::Byte => RegisterValue::Byte(payload[0]),
        RegisterKind::IrCode => RegisterValue::IrCode(ir_code_from_payload(payload)),
        RegisterKind::DeviceTime => {
            let seconds = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
            let tenths = u16::from_le_bytes([payload[4], payload[5]]);
            RegisterValue::DeviceTime(DeviceTime {
                seconds,
                milliseconds: tenths / 10,
            })
        }
        RegisterKind::Signed32 => {
            RegisterValue::Signed32(i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]))
        }
        RegisterKind::Text => RegisterValue::Text(decode_text(payload)),
    };

    Ok(value)
}

/// Parses textual CLI input into a typed value for `register`.
///
/// Byte registers take one integer (truncated to 8 bits), signed registers
/// one integer (truncated to 32 bits), IR code registers the positional
/// four-field form.  Every integer accepts dual hex/decimal notation.
///
/// # Errors
///
/// - [`CodecError::InvalidArgument`] if a token cannot be parsed.
/// - [`CodecError::NotSupported`] for registers that cannot be written.
pub fn parse_register_value(register: Register, text: &str) -> Result<RegisterValue, CodecError> {
    match register.kind() {
        RegisterKind::Byte => Ok(RegisterValue::Byte(parse_dual_notation(text)? as u8)),
        RegisterKind::Signed32 => Ok(RegisterValue::Signed32(parse_dual_notation(text)? as i32)),
        RegisterKind::IrCode => Ok(RegisterValue::IrCode(parse_ir_code_fields(text)?)),
        RegisterKind::DeviceTime | RegisterKind::Text => {
            Err(CodecError::NotSupported(register.to_string()))
        }
    }
}

/// Encodes `code` as a 7-byte IR code output report (identifier 0x01).
pub fn encode_interrupt(code: &IrCode) -> [u8; 1 + IR_CODE_PAYLOAD_LEN] {
    let mut report = [0u8; 1 + IR_CODE_PAYLOAD_LEN];
    report[0] = IR_CODE_INTERRUPT_ID;
    report[1..].copy_from_slice(&code.to_bytes());
    report
}

/// Decodes an interrupt report received from the device.
///
/// # Errors
///
/// - [`CodecError::UnknownReport`] if the identifier is not the IR code
///   interrupt (or the report is empty, reported as id 0).
/// - [`CodecError::MalformedReport`] if the report is not exactly 7 bytes.
pub fn decode_interrupt(report: &[u8]) -> Result<IrCode, CodecError> {
    let Some((&id, payload)) = report.split_first() else {
        return Err(CodecError::UnknownReport(0));
    };
    if id != IR_CODE_INTERRUPT_ID {
        return Err(CodecError::UnknownReport(id));
    }
    if payload.len() != IR_CODE_PAYLOAD_LEN {
        return Err(CodecError::malformed(
            "IR code interrupt (0x01)",
            1 + IR_CODE_PAYLOAD_LEN,
            report.len(),
        ));
    }
    Ok(ir_code_from_payload(payload))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Caller guarantees `payload.len() == IR_CODE_PAYLOAD_LEN`.
fn ir_code_from_payload(payload: &[u8]) -> IrCode {
    let mut bytes = [0u8; IR_CODE_PAYLOAD_LEN];
    bytes.copy_from_slice(&payload[..IR_CODE_PAYLOAD_LEN]);
    IrCode::from_bytes(bytes)
}

/// Text payloads are NUL-terminated; anything after the first NUL is padding.
fn decode_text(payload: &[u8]) -> String {
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    String::from_utf8_lossy(&payload[..end]).into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Byte registers ────────────────────────────────────────────────────────

    #[test]
    fn test_encode_byte_register_prefixes_report_id() {
        let report = encode_register(Register::ForwardIrEnable, &RegisterValue::Byte(1)).unwrap();
        assert_eq!(report, vec![0x12, 0x01]);
    }

    #[test]
    fn test_decode_byte_register_returns_payload_byte() {
        let value = decode_register(Register::MinRepeats, &[0x16, 0x03]).unwrap();
        assert_eq!(value, RegisterValue::Byte(3));
    }

    #[test]
    fn test_parse_byte_value_truncates_to_one_byte() {
        assert_eq!(
            parse_register_value(Register::WatchdogEnable, "=258").unwrap(),
            RegisterValue::Byte(2)
        );
        assert_eq!(
            parse_register_value(Register::RequestBootloader, "0x5a").unwrap(),
            RegisterValue::Byte(0x5a)
        );
    }

    // ── IR code registers ─────────────────────────────────────────────────────

    #[test]
    fn test_encode_ir_code_register_uses_little_endian_fields() {
        // Arrange
        let code = IrCode { protocol: 0x02, address: 0x0102, command: 0x0304, flags: 0x05 };

        // Act
        let report = encode_register(Register::PowerOffCode, &RegisterValue::IrCode(code)).unwrap();

        // Assert
        assert_eq!(report, vec![0x14, 0x02, 0x02, 0x01, 0x04, 0x03, 0x05]);
    }

    #[test]
    fn test_parse_ir_code_value_from_cli_text() {
        let value = parse_register_value(Register::PowerOnCode, "=0x01,0x0002,3,0").unwrap();
        assert_eq!(
            value,
            RegisterValue::IrCode(IrCode { protocol: 1, address: 2, command: 3, flags: 0 })
        );
    }

    // ── Device time ───────────────────────────────────────────────────────────

    #[test]
    fn test_decode_device_time_divides_tenths_field_by_ten() {
        // Arrange: seconds = 16, raw tenths = 0x0064 = 100 -> 10 ms
        let report = [0x17, 0x10, 0x00, 0x00, 0x00, 0x64, 0x00];

        // Act
        let value = decode_register(Register::DeviceTime, &report).unwrap();

        // Assert
        assert_eq!(
            value,
            RegisterValue::DeviceTime(DeviceTime { seconds: 16, milliseconds: 10 })
        );
        assert_eq!(value.to_string(), "16.010");
    }

    #[test]
    fn test_decode_device_time_truncates_fractional_milliseconds() {
        // raw tenths = 2569 -> 256.9 ms -> 256
        let [lo, hi] = 2569u16.to_le_bytes();
        let report = [0x17, 0x10, 0x00, 0x00, 0x00, lo, hi];

        let value = decode_register(Register::DeviceTime, &report).unwrap();

        assert_eq!(value.to_string(), "16.256");
    }

    #[test]
    fn test_encode_device_time_rejects_milliseconds_that_overflow_field() {
        let time = DeviceTime { seconds: 1, milliseconds: 7000 };
        assert!(matches!(
            encode_register(Register::DeviceTime, &RegisterValue::DeviceTime(time)),
            Err(CodecError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_device_time_value_is_not_supported() {
        assert!(matches!(
            parse_register_value(Register::DeviceTime, "=12"),
            Err(CodecError::NotSupported(_))
        ));
    }

    // ── Signed 32-bit registers ───────────────────────────────────────────────

    #[test]
    fn test_decode_negative_signed_value_is_sign_correct() {
        let value = decode_register(Register::ClockDeviation, &[0x18, 0x00, 0x00, 0x00, 0x80]).unwrap();
        assert_eq!(value, RegisterValue::Signed32(i32::MIN));
    }

    #[test]
    fn test_parse_signed_value_accepts_hex_twos_complement() {
        assert_eq!(
            parse_register_value(Register::WakeupTime, "0xffffffff").unwrap(),
            RegisterValue::Signed32(-1)
        );
        assert_eq!(
            parse_register_value(Register::WakeupTimeSpan, "-3600").unwrap(),
            RegisterValue::Signed32(-3600)
        );
    }

    // ── Firmware version ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_firmware_version_stops_at_nul() {
        let mut report = vec![0x10];
        report.extend_from_slice(b"1.2.3\0\0\0");
        let value = decode_register(Register::FirmwareVersion, &report).unwrap();
        assert_eq!(value, RegisterValue::Text("1.2.3".to_string()));
    }

    #[test]
    fn test_encode_firmware_version_is_not_supported() {
        assert!(matches!(
            encode_register(Register::FirmwareVersion, &RegisterValue::Text("x".into())),
            Err(CodecError::NotSupported(_))
        ));
    }

    // ── Malformed input ───────────────────────────────────────────────────────

    #[test]
    fn test_decode_wrong_length_returns_malformed_report() {
        let err = decode_register(Register::ClockDeviation, &[0x18, 0x00, 0x00]).unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedReport {
                register: Register::ClockDeviation.to_string(),
                expected: 5,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_decode_empty_report_returns_malformed_report() {
        assert!(matches!(
            decode_register(Register::ControlPcEnable, &[]),
            Err(CodecError::MalformedReport { actual: 0, .. })
        ));
    }

    #[test]
    fn test_decode_wrong_report_id_is_rejected() {
        assert_eq!(
            decode_register(Register::ControlPcEnable, &[0x12, 0x01]),
            Err(CodecError::UnexpectedReportId { expected: 0x11, actual: 0x12 })
        );
    }

    #[test]
    fn test_encode_mismatched_value_kind_is_rejected() {
        assert!(matches!(
            encode_register(Register::PowerOnCode, &RegisterValue::Byte(1)),
            Err(CodecError::ValueOutOfRange { .. })
        ));
    }

    // ── Interrupt reports ─────────────────────────────────────────────────────

    #[test]
    fn test_decode_interrupt_returns_ir_code() {
        let code = decode_interrupt(&[0x01, 0x01, 0x02, 0x00, 0x03, 0x00, 0x00]).unwrap();
        assert_eq!(code, IrCode { protocol: 1, address: 2, command: 3, flags: 0 });
    }

    #[test]
    fn test_decode_interrupt_rejects_unknown_report_id() {
        assert_eq!(
            decode_interrupt(&[0x07, 0, 0, 0, 0, 0, 0]),
            Err(CodecError::UnknownReport(0x07))
        );
    }

    #[test]
    fn test_decode_interrupt_rejects_short_report() {
        assert!(matches!(
            decode_interrupt(&[0x01, 0x01, 0x02]),
            Err(CodecError::MalformedReport { expected: 7, actual: 3, .. })
        ));
    }

    #[test]
    fn test_encode_interrupt_uses_report_id_one() {
        let code = IrCode { protocol: 0x11, address: 0x12, command: 0x13, flags: 0 };
        assert_eq!(encode_interrupt(&code), [0x01, 0x11, 0x12, 0x00, 0x13, 0x00, 0x00]);
    }
}
