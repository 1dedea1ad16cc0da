//! Integration tests for the hidirt-core report codec and dispatch engine.
//!
//! These tests exercise the public API the bridge binary uses: register
//! encode/decode across each register's value range, dual-notation parsing,
//! and the dispatch properties (totality, multiplicity, settings gating).

use hidirt_core::{
    decode_register, dispatch, encode_register, parse_register_value, Action, CodecError,
    DeviceTime, IrCode, MappingRule, Register, RegisterKind, RegisterValue, Settings,
};

/// Encodes a value and then decodes it, asserting the report has the
/// register's fixed size.
fn roundtrip(register: Register, value: &RegisterValue) -> RegisterValue {
    let report = encode_register(register, value).expect("encode must succeed");
    assert_eq!(report.len(), register.report_len(), "report size must be fixed");
    assert_eq!(report[0], register.report_id());
    decode_register(register, &report).expect("decode must succeed")
}

fn registers_of(kind: RegisterKind) -> impl Iterator<Item = Register> {
    Register::ALL.into_iter().filter(move |r| r.kind() == kind)
}

// ── Round-trips over representable ranges ─────────────────────────────────────

#[test]
fn test_roundtrip_every_byte_value_on_every_byte_register() {
    for register in registers_of(RegisterKind::Byte) {
        for v in 0..=u8::MAX {
            let value = RegisterValue::Byte(v);
            assert_eq!(roundtrip(register, &value), value, "{register} value {v}");
        }
    }
}

#[test]
fn test_roundtrip_ir_code_boundaries() {
    let corners = [
        IrCode { protocol: 0, address: 0, command: 0, flags: 0 },
        IrCode { protocol: u8::MAX, address: u16::MAX, command: u16::MAX, flags: u8::MAX },
        IrCode { protocol: 0x80, address: 0x00ff, command: 0xff00, flags: 0x01 },
    ];
    for register in registers_of(RegisterKind::IrCode) {
        for code in corners {
            let value = RegisterValue::IrCode(code);
            assert_eq!(roundtrip(register, &value), value);
        }
    }
}

#[test]
fn test_roundtrip_signed_boundaries_including_negatives() {
    let samples = [i32::MIN, i32::MIN + 1, -65_536, -1, 0, 1, 255, 65_536, i32::MAX];
    for register in registers_of(RegisterKind::Signed32) {
        for v in samples {
            let value = RegisterValue::Signed32(v);
            assert_eq!(roundtrip(register, &value), value, "{register} value {v}");
        }
    }
}

#[test]
fn test_roundtrip_device_time_within_field_range() {
    for milliseconds in [0u16, 1, 999, 6_553] {
        let value = RegisterValue::DeviceTime(DeviceTime { seconds: u32::MAX, milliseconds });
        assert_eq!(roundtrip(Register::DeviceTime, &value), value);
    }
}

#[test]
fn test_payload_sizes_are_symmetric_for_writable_registers() {
    for register in Register::ALL.into_iter().filter(|r| r.is_writable()) {
        let value = match register.kind() {
            RegisterKind::Byte => RegisterValue::Byte(0),
            RegisterKind::IrCode => RegisterValue::IrCode(IrCode::default()),
            RegisterKind::Signed32 => RegisterValue::Signed32(0),
            other => panic!("unexpected writable kind {other:?}"),
        };
        let report = encode_register(register, &value).expect("encode must succeed");
        assert_eq!(report.len(), 1 + register.payload_len());
    }
}

// ── Dual notation ─────────────────────────────────────────────────────────────

#[test]
fn test_hex_and_decimal_notation_agree_for_every_writable_register() {
    for register in Register::ALL.into_iter().filter(|r| r.is_writable()) {
        let (hex, dec) = match register.kind() {
            RegisterKind::IrCode => ("0x1A,0x1A,0x1A,0x1A", "26,26,26,26"),
            _ => ("0x1A", "26"),
        };
        assert_eq!(
            parse_register_value(register, hex).expect("hex"),
            parse_register_value(register, dec).expect("decimal"),
            "{register}"
        );
    }
}

#[test]
fn test_unparsable_value_is_invalid_argument() {
    assert!(matches!(
        parse_register_value(Register::MinRepeats, "many"),
        Err(CodecError::InvalidArgument { .. })
    ));
}

// ── Dispatch properties ───────────────────────────────────────────────────────

fn binding(key: &str, app: Option<&str>) -> MappingRule {
    MappingRule {
        description: key.to_string(),
        ir_protocol: Some(0x01),
        ir_address: Some(0x02),
        ir_command: Some(0x03),
        key_sequence: Some(key.to_string()),
        application: app.map(str::to_string),
        parameter: app.map(|_| "--flag".to_string()),
    }
}

#[test]
fn test_dispatch_two_distinct_matching_rules_both_fire() {
    // Arrange
    let rules = vec![binding("ctrl+alt+t", None), binding("super", Some("/usr/bin/gedit"))];
    let settings = Settings { send_keys: true, start_apps: true, ..Default::default() };
    let code = IrCode { protocol: 0x01, address: 0x02, command: 0x03, flags: 0x00 };

    // Act
    let actions = dispatch(&code, &rules, &settings);

    // Assert
    assert!(actions.contains(&Action::SendKeys("ctrl+alt+t".into())));
    assert!(actions.contains(&Action::SendKeys("super".into())));
    assert!(actions.contains(&Action::LaunchProcess {
        application: "/usr/bin/gedit".into(),
        parameter: "--flag".into(),
    }));
    assert_eq!(actions.len(), 3);
}

#[test]
fn test_dispatch_settings_gate_each_action_kind() {
    let rules = vec![binding("a", Some("/bin/true")), binding("b", Some("/bin/false"))];
    let code = IrCode { protocol: 0x01, address: 0x02, command: 0x03, flags: 0x00 };

    for send_keys in [false, true] {
        for start_apps in [false, true] {
            let settings = Settings { send_keys, start_apps, ..Default::default() };
            let actions = dispatch(&code, &rules, &settings);

            let keys = actions.iter().filter(|a| matches!(a, Action::SendKeys(_))).count();
            let launches = actions.iter().filter(|a| matches!(a, Action::LaunchProcess { .. })).count();
            assert_eq!(keys, if send_keys { 2 } else { 0 });
            assert_eq!(launches, if start_apps { 2 } else { 0 });
        }
    }
}

#[test]
fn test_dispatch_is_total_over_many_codes() {
    let rules = vec![binding("a", Some("/bin/true"))];
    let settings = Settings { send_keys: true, start_apps: true, ..Default::default() };

    for protocol in [0u8, 1, 255] {
        for address in [0u16, 2, u16::MAX] {
            for command in [0u16, 3, u16::MAX] {
                let code = IrCode { protocol, address, command, flags: 0 };
                let actions = dispatch(&code, &rules, &settings);
                let expected = if (protocol, address, command) == (1, 2, 3) { 2 } else { 0 };
                assert_eq!(actions.len(), expected);
            }
        }
    }
}
