//! Rule dispatch: decides which actions an incoming IR code triggers.
//!
//! Dispatch is a pure function.  It never performs I/O; it returns a list of
//! [`Action`] requests that the application layer hands to the key injector
//! and the process launcher.
//!
//! # Matching
//!
//! Every rule in the table is evaluated for every code.  A rule matches when
//! all three of its IR fields are present and equal the code's protocol,
//! address and command (the flags byte is ignored, so held-down repeats
//! match too).  All matching rules fire, in table order.

use tracing::debug;

use crate::domain::ir_code::IrCode;
use crate::domain::rules::{MappingRule, Settings};

/// An action requested by a matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send this key sequence to the active window.
    SendKeys(String),
    /// Run `application` with `parameter` appended.
    LaunchProcess {
        application: String,
        parameter: String,
    },
}

/// Returns the actions `code` triggers under `rules` and `settings`.
///
/// - `SendKeys` is emitted only when `settings.send_keys` is set and the
///   rule has a non-empty key sequence.
/// - `LaunchProcess` is emitted only when `settings.start_apps` is set and
///   the rule has a non-empty application and a parameter.
///
/// Never fails; no match yields an empty list.
///
/// # Examples
///
/// ```rust
/// use hidirt_core::{dispatch, Action, IrCode, MappingRule, Settings};
///
/// let rules = vec![MappingRule {
///     ir_protocol: Some(1),
///     ir_address: Some(2),
///     ir_command: Some(3),
///     key_sequence: Some("ctrl+alt+t".into()),
///     ..Default::default()
/// }];
/// let settings = Settings { send_keys: true, ..Default::default() };
/// let code = IrCode { protocol: 1, address: 2, command: 3, flags: 0 };
///
/// assert_eq!(
///     dispatch(&code, &rules, &settings),
///     vec![Action::SendKeys("ctrl+alt+t".into())]
/// );
/// ```
pub fn dispatch(code: &IrCode, rules: &[MappingRule], settings: &Settings) -> Vec<Action> {
    let mut actions = Vec::new();

    for rule in rules.iter().filter(|rule| matches_code(rule, code)) {
        debug!("IR code {code} matches mapping '{}'", rule.description);

        if settings.send_keys {
            if let Some(keys) = rule.key_sequence.as_deref().filter(|k| !k.is_empty()) {
                actions.push(Action::SendKeys(keys.to_string()));
            }
        }

        if settings.start_apps {
            let application = rule.application.as_deref().filter(|a| !a.is_empty());
            if let (Some(application), Some(parameter)) = (application, rule.parameter.as_deref()) {
                actions.push(Action::LaunchProcess {
                    application: application.to_string(),
                    parameter: parameter.to_string(),
                });
            }
        }
    }

    actions
}

fn matches_code(rule: &MappingRule, code: &IrCode) -> bool {
    rule.ir_triple() == Some((
        i64::from(code.protocol),
        i64::from(code.address),
        i64::from(code.command),
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(protocol: i64, address: i64, command: i64) -> MappingRule {
        MappingRule {
            description: format!("{protocol}/{address}/{command}"),
            ir_protocol: Some(protocol),
            ir_address: Some(address),
            ir_command: Some(command),
            ..Default::default()
        }
    }

    fn all_enabled() -> Settings {
        Settings { send_keys: true, start_apps: true, ..Default::default() }
    }

    const CODE: IrCode = IrCode { protocol: 0x01, address: 0x02, command: 0x03, flags: 0x00 };

    #[test]
    fn test_matching_rule_with_keys_emits_single_send_keys() {
        // Arrange
        let rules = vec![MappingRule {
            key_sequence: Some("ctrl+alt+t".to_string()),
            ..rule(1, 2, 3)
        }];
        let settings = Settings { send_keys: true, ..Default::default() };

        // Act
        let actions = dispatch(&CODE, &rules, &settings);

        // Assert
        assert_eq!(actions, vec![Action::SendKeys("ctrl+alt+t".to_string())]);
    }

    #[test]
    fn test_all_matching_rules_fire_in_table_order() {
        // Arrange
        let rules = vec![
            MappingRule { key_sequence: Some("a".into()), ..rule(1, 2, 3) },
            MappingRule { key_sequence: Some("z".into()), ..rule(9, 9, 9) },
            MappingRule {
                application: Some("/usr/bin/xterm".into()),
                parameter: Some("-e top".into()),
                ..rule(1, 2, 3)
            },
        ];

        // Act
        let actions = dispatch(&CODE, &rules, &all_enabled());

        // Assert
        assert_eq!(
            actions,
            vec![
                Action::SendKeys("a".into()),
                Action::LaunchProcess {
                    application: "/usr/bin/xterm".into(),
                    parameter: "-e top".into(),
                },
            ]
        );
    }

    #[test]
    fn test_rule_missing_any_ir_field_never_matches() {
        let mut incomplete = MappingRule { key_sequence: Some("a".into()), ..rule(1, 2, 3) };
        incomplete.ir_command = None;

        assert!(dispatch(&CODE, &[incomplete], &all_enabled()).is_empty());
    }

    #[test]
    fn test_flags_byte_does_not_affect_matching() {
        let rules = vec![MappingRule { key_sequence: Some("a".into()), ..rule(1, 2, 3) }];
        let repeat = IrCode { flags: 0x01, ..CODE };

        assert_eq!(dispatch(&repeat, &rules, &all_enabled()).len(), 1);
    }

    #[test]
    fn test_out_of_range_rule_fields_never_match() {
        let rules = vec![MappingRule { key_sequence: Some("a".into()), ..rule(1 + 256, 2, 3) }];
        assert!(dispatch(&CODE, &rules, &all_enabled()).is_empty());
    }

    #[test]
    fn test_send_keys_disabled_suppresses_key_actions() {
        // Arrange
        let rules = vec![MappingRule {
            key_sequence: Some("ctrl+c".into()),
            application: Some("true".into()),
            parameter: Some(String::new()),
            ..rule(1, 2, 3)
        }];
        let settings = Settings { send_keys: false, start_apps: true, ..Default::default() };

        // Act
        let actions = dispatch(&CODE, &rules, &settings);

        // Assert
        assert!(actions.iter().all(|a| !matches!(a, Action::SendKeys(_))));
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_start_apps_disabled_suppresses_launch_actions() {
        let rules = vec![MappingRule {
            key_sequence: Some("ctrl+c".into()),
            application: Some("true".into()),
            parameter: Some(String::new()),
            ..rule(1, 2, 3)
        }];
        let settings = Settings { send_keys: true, start_apps: false, ..Default::default() };

        let actions = dispatch(&CODE, &rules, &settings);

        assert_eq!(actions, vec![Action::SendKeys("ctrl+c".into())]);
    }

    #[test]
    fn test_empty_key_sequence_is_skipped() {
        let rules = vec![MappingRule { key_sequence: Some(String::new()), ..rule(1, 2, 3) }];
        assert!(dispatch(&CODE, &rules, &all_enabled()).is_empty());
    }

    #[test]
    fn test_application_without_parameter_is_skipped() {
        let rules = vec![MappingRule { application: Some("xterm".into()), ..rule(1, 2, 3) }];
        assert!(dispatch(&CODE, &rules, &all_enabled()).is_empty());
    }

    #[test]
    fn test_empty_rule_table_yields_no_actions() {
        assert!(dispatch(&CODE, &[], &all_enabled()).is_empty());
    }
}
