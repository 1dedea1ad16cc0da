//! Register access use cases: one-shot reads and writes of the device's
//! configuration registers, IR code transmission and device details.
//!
//! These run before the session loop starts, in the order the command line
//! lists them.  A failing request is reported to the caller and does not
//! prevent later requests from running.

use hidirt_core::protocol::notation::parse_ir_code_fields;
use hidirt_core::{
    decode_register, encode_interrupt, encode_register, parse_register_value, IrCode, Register,
    RegisterValue,
};
use tracing::{debug, warn};

use super::device_session::{DeviceDescription, DeviceError, DeviceSession};

/// A read (`value == None`) or write of one register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub register: Register,
    pub value: Option<String>,
}

impl RegisterRequest {
    pub fn read(register: Register) -> Self {
        Self { register, value: None }
    }

    pub fn write(register: Register, value: impl Into<String>) -> Self {
        Self {
            register,
            value: Some(value.into()),
        }
    }
}

/// Result of a successfully executed [`RegisterRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The register was read and decoded.
    Read(RegisterValue),
    /// The value was encoded and written.
    Written(RegisterValue),
    /// The register cannot be written; nothing was sent to the device.
    NotSupported(Register),
}

/// Executes one register request against the open device.
///
/// # Errors
///
/// [`DeviceError::Codec`] when the argument cannot be parsed or the report
/// cannot be decoded; [`DeviceError::Io`] when the transaction fails.
pub fn execute_request(
    session: &mut DeviceSession,
    request: &RegisterRequest,
) -> Result<RegisterOutcome, DeviceError> {
    let register = request.register;
    match &request.value {
        None => {
            let report = session.read_register(register)?;
            let value = decode_register(register, &report)?;
            debug!("{register} = {value}");
            Ok(RegisterOutcome::Read(value))
        }
        Some(text) => {
            if !register.is_writable() {
                warn!("writing {register} is not implemented");
                return Ok(RegisterOutcome::NotSupported(register));
            }
            let value = parse_register_value(register, text)?;
            let report = encode_register(register, &value)?;
            session.write_register(&report)?;
            debug!("{register} <- {value}");
            Ok(RegisterOutcome::Written(value))
        }
    }
}

/// Parses an IR code argument and sends it as an output report for the
/// device to transmit.
///
/// # Errors
///
/// [`DeviceError::Codec`] for an unparsable argument, [`DeviceError::Io`]
/// when the write fails.
pub fn transmit_ir_code(session: &mut DeviceSession, text: &str) -> Result<IrCode, DeviceError> {
    let code = parse_ir_code_fields(text)?;
    session.transmit(&encode_interrupt(&code))?;
    debug!("transmitted IR code {code}");
    Ok(code)
}

/// Identification shown in verbose mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDetails {
    pub firmware_version: String,
    pub description: DeviceDescription,
}

/// Reads the firmware version register and the USB descriptor strings.
///
/// # Errors
///
/// Propagates the firmware version read failure.
pub fn read_device_details(session: &mut DeviceSession) -> Result<DeviceDetails, DeviceError> {
    let firmware_version = match execute_request(session, &RegisterRequest::read(Register::FirmwareVersion))? {
        RegisterOutcome::Read(RegisterValue::Text(text)) => text,
        RegisterOutcome::Read(other) => other.to_string(),
        RegisterOutcome::Written(_) | RegisterOutcome::NotSupported(_) => String::new(),
    };
    let description = session.describe()?;
    Ok(DeviceDetails {
        firmware_version,
        description,
    })
}
