//! Textual integer input in dual hex/decimal notation.
//!
//! Register values typed on the command line may be written either way:
//!
//! - A token containing an `x` anywhere is hexadecimal.  Only the text
//!   *after* the first `x` is parsed, so `0x1A`, `x1A` and `1x1a` all mean 26.
//! - Any other token is decimal and may carry a leading sign.
//!
//! IR codes are written as up to four positional fields separated by `,`,
//! `;` or `-`: protocol, address, command, flags.  Empty fields between
//! delimiters are skipped, missing trailing fields are zero and surplus fields
//! are ignored.

use crate::domain::ir_code::IrCode;
use crate::protocol::codec::CodecError;

/// Characters that separate the positional fields of an IR code.
pub const IR_CODE_DELIMITERS: [char; 3] = [',', ';', '-'];

/// Parses one integer token in dual notation.
///
/// A single leading `=` is tolerated (as left behind by `-b=1` style flags).
///
/// # Errors
///
/// Returns [`CodecError::InvalidArgument`] if the token is empty or its
/// digits cannot be parsed in the selected base.
///
/// # Examples
///
/// ```rust
/// use hidirt_core::protocol::notation::parse_dual_notation;
///
/// assert_eq!(parse_dual_notation("0x1A").unwrap(), 26);
/// assert_eq!(parse_dual_notation("26").unwrap(), 26);
/// assert_eq!(parse_dual_notation("-5").unwrap(), -5);
/// ```
pub fn parse_dual_notation(token: &str) -> Result<i64, CodecError> {
    let trimmed = strip_assignment(token).trim();
    if trimmed.is_empty() {
        return Err(CodecError::invalid(token, "empty value"));
    }

    match trimmed.find('x') {
        Some(pos) => {
            let digits = &trimmed[pos + 1..];
            i64::from_str_radix(digits, 16)
                .map_err(|e| CodecError::invalid(token, format!("not a hexadecimal number: {e}")))
        }
        None => trimmed
            .parse::<i64>()
            .map_err(|e| CodecError::invalid(token, format!("not a decimal number: {e}"))),
    }
}

/// Splits `text` into IR code fields and returns them as a typed [`IrCode`].
///
/// Each field is parsed independently with [`parse_dual_notation`] and then
/// truncated to its wire width (8 bits for protocol/flags, 16 bits for
/// address/command).
///
/// # Errors
///
/// Returns [`CodecError::InvalidArgument`] if any present field cannot be
/// parsed, or if the text contains no field at all.
pub fn parse_ir_code_fields(text: &str) -> Result<IrCode, CodecError> {
    let tokens: Vec<&str> = strip_assignment(text)
        .split(&IR_CODE_DELIMITERS[..])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(CodecError::invalid(text, "no IR code fields"));
    }

    ir_code_from_tokens(&tokens)
}

/// Builds an [`IrCode`] from positional tokens.
fn ir_code_from_tokens(tokens: &[&str]) -> Result<IrCode, CodecError> {
    let field = |idx: usize| -> Result<i64, CodecError> {
        match tokens.get(idx) {
            Some(token) => parse_dual_notation(token),
            None => Ok(0),
        }
    };

    Ok(IrCode {
        protocol: field(0)? as u8,
        address: field(1)? as u16,
        command: field(2)? as u16,
        flags: field(3)? as u8,
    })
}

fn strip_assignment(text: &str) -> &str {
    text.strip_prefix('=').unwrap_or(text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_dual_notation ───────────────────────────────────────────────────

    #[test]
    fn test_hex_and_decimal_forms_parse_to_same_value() {
        assert_eq!(
            parse_dual_notation("0x1A").unwrap(),
            parse_dual_notation("26").unwrap()
        );
    }

    #[test]
    fn test_hex_digits_are_read_after_first_x() {
        assert_eq!(parse_dual_notation("x1a").unwrap(), 26);
        assert_eq!(parse_dual_notation("99x10").unwrap(), 16);
    }

    #[test]
    fn test_leading_equals_sign_is_tolerated() {
        assert_eq!(parse_dual_notation("=7").unwrap(), 7);
        assert_eq!(parse_dual_notation("=0xff").unwrap(), 255);
    }

    #[test]
    fn test_negative_decimal_is_accepted() {
        assert_eq!(parse_dual_notation("-1200").unwrap(), -1200);
    }

    #[test]
    fn test_garbage_token_returns_invalid_argument() {
        let err = parse_dual_notation("abc").unwrap_err();
        assert!(matches!(err, CodecError::InvalidArgument { .. }));
    }

    #[test]
    fn test_bad_hex_digits_return_invalid_argument() {
        assert!(matches!(
            parse_dual_notation("0xzz"),
            Err(CodecError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_empty_token_returns_invalid_argument() {
        assert!(parse_dual_notation("").is_err());
        assert!(parse_dual_notation("=").is_err());
    }

    // ── parse_ir_code_fields ──────────────────────────────────────────────────

    #[test]
    fn test_ir_code_fields_accept_mixed_notation_per_field() {
        // Arrange
        let text = "0x01,2;0x0003-4";

        // Act
        let code = parse_ir_code_fields(text).unwrap();

        // Assert
        assert_eq!(
            code,
            IrCode { protocol: 1, address: 2, command: 3, flags: 4 }
        );
    }

    #[test]
    fn test_ir_code_missing_trailing_fields_are_zero() {
        let code = parse_ir_code_fields("=7,0x1234").unwrap();
        assert_eq!(
            code,
            IrCode { protocol: 7, address: 0x1234, command: 0, flags: 0 }
        );
    }

    #[test]
    fn test_ir_code_empty_fields_are_skipped() {
        let code = parse_ir_code_fields("1,,2,,3").unwrap();
        assert_eq!(code.address, 2);
        assert_eq!(code.command, 3);
    }

    #[test]
    fn test_ir_code_surplus_fields_are_ignored() {
        let code = parse_ir_code_fields("1,2,3,4,5,6").unwrap();
        assert_eq!(code.flags, 4);
    }

    #[test]
    fn test_ir_code_fields_are_truncated_to_wire_width() {
        let code = parse_ir_code_fields("0x1ff,0x12345,0,256").unwrap();
        assert_eq!(code.protocol, 0xff);
        assert_eq!(code.address, 0x2345);
        assert_eq!(code.flags, 0);
    }

    #[test]
    fn test_ir_code_unparsable_field_is_rejected() {
        assert!(matches!(
            parse_ir_code_fields("1,two,3"),
            Err(CodecError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_ir_code_without_fields_is_rejected() {
        assert!(parse_ir_code_fields(",;-").is_err());
    }
}
