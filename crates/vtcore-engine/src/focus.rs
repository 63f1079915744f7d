//! Focus-reporting and bracketed-paste byte envelopes. Both are pure
//! functions of the current mode flags — neither needs any state of its
//! own beyond what [`vtcore_common::types::TerminalModes`] already holds.

use vtcore_common::types::TerminalModes;

pub const PASTE_LEADER: &[u8] = b"\x1b[200~";
pub const PASTE_TRAILER: &[u8] = b"\x1b[201~";

/// Bytes to emit on a focus gain/loss event, or `None` if focus
/// reporting is currently disabled (the event is silently swallowed).
pub fn focus_bytes(modes: TerminalModes, focused: bool) -> Option<&'static [u8]> {
    if !modes.contains(TerminalModes::FOCUS_REPORTING) {
        return None;
    }
    Some(if focused { b"\x1b[I" } else { b"\x1b[O" })
}

pub fn paste_leader(modes: TerminalModes) -> &'static [u8] {
    if modes.contains(TerminalModes::BRACKETED_PASTE) {
        PASTE_LEADER
    } else {
        b""
    }
}

pub fn paste_trailer(modes: TerminalModes) -> &'static [u8] {
    if modes.contains(TerminalModes::BRACKETED_PASTE) {
        PASTE_TRAILER
    } else {
        b""
    }
}
