//! Linux X11 key sequence injection via the XTest extension.
//!
//! # How is a key sequence typed? (for beginners)
//!
//! A mapping rule's `key` field holds one or more *chords* separated by
//! whitespace, for example `ctrl+alt+t` or `ctrl+c ctrl+v`.  Each chord is a
//! list of X11 KeySym names joined with `+`.  The keys of a chord are pressed
//! in order and released in reverse order, then the next chord follows.
//!
//! `XTestFakeKeyEvent` takes an X11 *keycode*, not a KeySym, so every name
//! goes through two lookups:
//!
//! ```text
//! "t" → XStringToKeysym → 0x0074 → XKeysymToKeycode(display, keysym) → 28
//! ```
//!
//! Modifier shorthands (`ctrl`, `alt`, `shift`, `super`, `meta`) are mapped
//! to their left-hand KeySyms first; any other name must be a KeySym name the
//! X server knows (`Return`, `F5`, `XF86AudioPlay`, ...).
//!
//! # Permissions
//!
//! XTest requires access to the X display.  If `DISPLAY` is not set or the X
//! server is not reachable, [`X11KeySequenceInjector::open`] fails.  On
//! Wayland sessions only XWayland clients receive the events.

use std::ffi::CString;
use std::os::raw::{c_uint, c_ulong};
use std::ptr::{self, NonNull};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use x11::{xlib, xtest};

use crate::application::execute_actions::{ActuatorError, KeySequenceInjector};

/// Pause after each chord.
const CHORD_DELAY: Duration = Duration::from_millis(2);

/// `CurrentTime`: the server applies each event immediately.
const CURRENT_TIME: c_ulong = 0;

/// `NoSymbol` as returned by `XStringToKeysym` for unknown names.
const NO_SYMBOL: xlib::KeySym = 0;

/// Owned connection to the X server.
struct DisplayConnection(NonNull<xlib::Display>);

// Xlib connections are not thread safe; every access goes through the
// injector's mutex.
unsafe impl Send for DisplayConnection {}

impl Drop for DisplayConnection {
    fn drop(&mut self) {
        // SAFETY: the pointer came from XOpenDisplay and is closed only here.
        unsafe {
            xlib::XCloseDisplay(self.0.as_ptr());
        }
    }
}

/// Types key sequences into the focused X11 window.
pub struct X11KeySequenceInjector {
    display: Mutex<DisplayConnection>,
}

impl X11KeySequenceInjector {
    /// Connects to the display named by `DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError::Display`] if the display cannot be opened or
    /// lacks the XTest extension.
    pub fn open() -> Result<Self, ActuatorError> {
        Self::connect(None)
    }

    /// Connects to the display `name`, e.g. `":0"`.
    ///
    /// # Errors
    ///
    /// Same as [`X11KeySequenceInjector::open`].
    pub fn open_named(name: &str) -> Result<Self, ActuatorError> {
        Self::connect(Some(name))
    }

    fn connect(name: Option<&str>) -> Result<Self, ActuatorError> {
        let label = name.map_or_else(
            || std::env::var("DISPLAY").unwrap_or_else(|_| "<unset DISPLAY>".to_string()),
            str::to_string,
        );
        let name = name
            .map(CString::new)
            .transpose()
            .map_err(|_| ActuatorError::Display(format!("invalid display name {label:?}")))?;

        // SAFETY: a null name makes Xlib read DISPLAY; otherwise the CString
        // outlives the call.
        let raw = unsafe { xlib::XOpenDisplay(name.as_ref().map_or(ptr::null(), |n| n.as_ptr())) };
        let connection = NonNull::new(raw)
            .map(DisplayConnection)
            .ok_or_else(|| ActuatorError::Display(format!("cannot open X display {label}")))?;

        let (mut event, mut error, mut major, mut minor) = (0, 0, 0, 0);
        // SAFETY: the connection is open and the out pointers are valid.
        let has_xtest = unsafe {
            xtest::XTestQueryExtension(connection.0.as_ptr(), &mut event, &mut error, &mut major, &mut minor)
        };
        if has_xtest == xlib::False {
            return Err(ActuatorError::Display(format!("X display {label} lacks the XTEST extension")));
        }

        debug!("connected to X display {label} (XTEST {major}.{minor})");
        Ok(Self {
            display: Mutex::new(connection),
        })
    }

    fn lock(&self) -> MutexGuard<'_, DisplayConnection> {
        self.display.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolves every key of every chord to a keycode before anything is
    /// pressed, so an unknown name types nothing.
    fn keycodes(&self, sequence: &str) -> Result<Vec<Vec<c_uint>>, ActuatorError> {
        let chords = parse_key_sequence(sequence)?;
        let display = self.lock();
        chords
            .iter()
            .map(|chord| {
                chord
                    .iter()
                    .map(|name| keycode(&display, name))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    fn type_chord(&self, chord: &[c_uint]) {
        let guard = self.lock();
        let display = guard.0.as_ptr();
        // SAFETY: the display stays open while the guard is held.
        unsafe {
            for &code in chord {
                xtest::XTestFakeKeyEvent(display, code, xlib::True, CURRENT_TIME);
            }
            for &code in chord.iter().rev() {
                xtest::XTestFakeKeyEvent(display, code, xlib::False, CURRENT_TIME);
            }
            xlib::XFlush(display);
        }
    }
}

#[async_trait]
impl KeySequenceInjector for X11KeySequenceInjector {
    async fn send_key_sequence(&self, sequence: &str) -> Result<(), ActuatorError> {
        let chords = self.keycodes(sequence)?;
        for chord in &chords {
            self.type_chord(chord);
            tokio::time::sleep(CHORD_DELAY).await;
        }
        Ok(())
    }
}

fn keycode(display: &DisplayConnection, name: &str) -> Result<c_uint, ActuatorError> {
    let symbol = CString::new(keysym_name(name)).map_err(|_| ActuatorError::UnknownKey(name.to_string()))?;
    // SAFETY: the CString is NUL-terminated and outlives the call.
    let keysym = unsafe { xlib::XStringToKeysym(symbol.as_ptr()) };
    if keysym == NO_SYMBOL {
        return Err(ActuatorError::UnknownKey(name.to_string()));
    }
    // SAFETY: the display is open for as long as `display` is borrowed.
    let code = unsafe { xlib::XKeysymToKeycode(display.0.as_ptr(), keysym) };
    if code == 0 {
        return Err(ActuatorError::UnknownKey(format!("{name} (not on the current keyboard map)")));
    }
    Ok(c_uint::from(code))
}

/// Splits a sequence into chords and each chord into key names.
///
/// # Errors
///
/// Returns [`ActuatorError::UnknownKey`] for an empty sequence or an empty
/// key name such as the one in `ctrl++t`.
pub fn parse_key_sequence(sequence: &str) -> Result<Vec<Vec<&str>>, ActuatorError> {
    let chords: Vec<Vec<&str>> = sequence
        .split_whitespace()
        .map(|chord| chord.split('+').collect())
        .collect();
    if chords.is_empty() || chords.iter().flatten().any(|name| name.is_empty()) {
        return Err(ActuatorError::UnknownKey(sequence.to_string()));
    }
    Ok(chords)
}

/// Maps modifier shorthands to KeySym names; other names pass through.
pub fn keysym_name(name: &str) -> &str {
    match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => "Control_L",
        "alt" => "Alt_L",
        "shift" => "Shift_L",
        "super" | "win" => "Super_L",
        "meta" => "Meta_L",
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chords_split_on_whitespace_then_plus() {
        let chords = parse_key_sequence("ctrl+c  ctrl+v\tReturn").unwrap();
        assert_eq!(chords, vec![vec!["ctrl", "c"], vec!["ctrl", "v"], vec!["Return"]]);
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        assert!(matches!(parse_key_sequence("   "), Err(ActuatorError::UnknownKey(_))));
    }

    #[test]
    fn test_empty_key_name_is_rejected() {
        assert!(matches!(parse_key_sequence("ctrl++t"), Err(ActuatorError::UnknownKey(_))));
    }

    #[test]
    fn test_modifier_shorthands_map_to_left_keysyms() {
        assert_eq!(keysym_name("ctrl"), "Control_L");
        assert_eq!(keysym_name("CTRL"), "Control_L");
        assert_eq!(keysym_name("alt"), "Alt_L");
        assert_eq!(keysym_name("shift"), "Shift_L");
        assert_eq!(keysym_name("super"), "Super_L");
    }

    #[test]
    fn test_other_names_pass_through_unchanged() {
        assert_eq!(keysym_name("t"), "t");
        assert_eq!(keysym_name("XF86AudioPlay"), "XF86AudioPlay");
    }

    #[test]
    fn test_unreachable_display_fails_at_open() {
        let result = X11KeySequenceInjector::open_named(":4093");
        assert!(matches!(result, Err(ActuatorError::Display(_))));
    }
}
