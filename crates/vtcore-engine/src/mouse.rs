//! Mouse tracking: state+protocol matrix and report encoding.
//!
//! `state` and `protocol` are supplied by the caller on every call rather
//! than stored here, matching the read-once-into-locals pattern used at
//! the call site (a concurrent mode change only takes effect on the next
//! event, never mid-event).

use vtcore_common::types::{Modifiers, MouseProtocol, MouseTrackingState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    ButtonDown,
    ButtonUp,
    WheelUp,
    WheelDown,
    MouseMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub row: u16,
    pub col: u16,
}

/// Result of feeding one event through the tracker: whether the event
/// was consumed at all, and what (if anything) should be written to the
/// peer.
#[derive(Debug, Default)]
pub struct MouseOutcome {
    pub consumed: bool,
    pub bytes: Option<Vec<u8>>,
}

fn clamp_limit(protocol: MouseProtocol) -> u16 {
    match protocol {
        MouseProtocol::Normal => 255 - 32,
        _ => 2047 - 32,
    }
}

fn button_bits(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 0x00,
        MouseButton::Middle => 0x01,
        MouseButton::Right => 0x02,
    }
}

pub struct MouseTracker {
    pressed: Option<u8>,
    last_sent: Option<(u16, u16)>,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self {
            pressed: None,
            last_sent: None,
        }
    }

    pub fn handle(
        &mut self,
        state: MouseTrackingState,
        protocol: MouseProtocol,
        ev: MouseEvent,
    ) -> MouseOutcome {
        if state == MouseTrackingState::Off {
            self.pressed = None;
            self.last_sent = None;
            return MouseOutcome {
                consumed: false,
                bytes: None,
            };
        }

        let limit = clamp_limit(protocol);
        let row = ev.row.min(limit);
        let col = ev.col.min(limit);

        let cb = match ev.action {
            MouseAction::ButtonDown => {
                if self.pressed.is_some() {
                    return MouseOutcome {
                        consumed: true,
                        bytes: None,
                    };
                }
                let bits = button_bits(ev.button);
                self.pressed = Some(bits);
                bits
            }
            MouseAction::ButtonUp => {
                let bits = if protocol == MouseProtocol::Sgr {
                    self.pressed.unwrap_or(0x03)
                } else {
                    0x03
                };
                self.pressed = None;
                bits
            }
            MouseAction::WheelUp => 0x40,
            MouseAction::WheelDown => 0x41,
            MouseAction::MouseMove => {
                let allowed = state == MouseTrackingState::Any
                    || (state == MouseTrackingState::Drag && self.pressed.is_some());
                if !allowed || self.last_sent == Some((row, col)) {
                    return MouseOutcome {
                        consumed: true,
                        bytes: None,
                    };
                }
                self.last_sent = Some((row, col));
                0x20 + self.pressed.unwrap_or(0)
            }
        };

        let cb = cb | ev.modifiers.mouse_bits();
        let bytes = encode(protocol, ev.action, cb, row, col, limit);
        MouseOutcome {
            consumed: true,
            bytes: Some(bytes),
        }
    }
}

impl Default for MouseTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(protocol: MouseProtocol, action: MouseAction, cb: u8, row: u16, col: u16, limit: u16) -> Vec<u8> {
    match protocol {
        MouseProtocol::Normal => {
            let status = cb.wrapping_add(0x20);
            let col_byte = if col == limit { 0 } else { (col + 1 + 0x20) as u8 };
            let row_byte = if row == limit { 0 } else { (row + 1 + 0x20) as u8 };
            vec![0x1b, b'[', b'M', status, col_byte, row_byte]
        }
        MouseProtocol::Utf8 => {
            let status = cb.wrapping_add(0x20);
            let mut out = vec![0x1b, b'[', b'M', status];
            out.extend(encode_utf8_coord(col));
            out.extend(encode_utf8_coord(row));
            out
        }
        MouseProtocol::Urxvt => {
            let status = cb as u32 + 0x20;
            format!("\x1b[{};{};{}M", status, col + 1, row + 1).into_bytes()
        }
        MouseProtocol::Sgr => {
            let tail = if action == MouseAction::ButtonUp { 'm' } else { 'M' };
            format!("\x1b[<{};{};{}{}", cb, col + 1, row + 1, tail).into_bytes()
        }
    }
}

fn encode_utf8_coord(coord: u16) -> Vec<u8> {
    let value = coord as u32 + 0x20 + 1;
    if value < 127 {
        vec![value as u8]
    } else {
        char::from_u32(value)
            .map(|c| c.to_string().into_bytes())
            .unwrap_or_else(|| vec![value as u8])
    }
}
