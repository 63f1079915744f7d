//! Sequence dispatcher: turns parser tokens into terminal-state
//! mutations. A zero-sized unit struct, the same shape as
//! [`crate::sgr::apply`] and [`crate::mouse::MouseTracker::handle`] — all
//! state it touches lives on the `Terminal` it's handed, so there is
//! nothing here to own.

use tracing::debug;
use unicode_width::UnicodeWidthChar;

use vtcore_common::traits::TransmitSink;
use vtcore_common::types::{Color, Decoration, EolKind, KeypadMode, LineFeedRule, MouseProtocol, MouseTrackingState, Position, TerminalModes};
use vtcore_parser::Sequence;

use crate::grid::{line_editor, Grid};
use crate::sgr;
use crate::terminal::{DeferredAction, Terminal};

pub struct Dispatcher;

impl Dispatcher {
    pub fn process(term: &mut Terminal, seq: Sequence, sink: &mut dyn TransmitSink) {
        match seq {
            Sequence::Print(ch) => {
                term.last_was_cr = false;
                print_char(term, ch)
            }
            Sequence::Control(ch) => control(term, ch),
            Sequence::EscFinal { intermediates, final_byte } => {
                term.last_was_cr = false;
                esc_final(term, &intermediates, final_byte)
            }
            Sequence::Csi { private, params, intermediates, final_byte } => {
                term.last_was_cr = false;
                csi(term, private, &params, &intermediates, final_byte, sink)
            }
            Sequence::Osc { raw } => {
                term.last_was_cr = false;
                osc(term, &raw)
            }
            Sequence::Dcs { .. } => {
                // Device-specific payloads are carried by the parser but
                // never interpreted here; nothing to dispatch.
            }
        }
    }
}

/// The grid currently receiving mutations: the alternate buffer when
/// active, the primary buffer otherwise.
fn grid(term: &mut Terminal) -> &mut Grid {
    if term.alt_active {
        term.alt_grid.as_mut().expect("alt grid present while alt_active")
    } else {
        &mut term.grid
    }
}

fn decoration(term: &Terminal) -> Decoration {
    term.cursor.decoration
}

// ---------------------------------------------------------------- print

fn print_char(term: &mut Terminal, ch: char) {
    term.notify_char(ch);

    let width = UnicodeWidthChar::width(ch).unwrap_or(1).max(1) as u16;
    let wide = width == 2;
    let last_col = term.size.cols.saturating_sub(1);

    if term.wrap_pending && term.modes.contains(TerminalModes::WRAP_AROUND) {
        term.wrap_pending = false;
        let wrapped_row = term.cursor.position.row;
        grid(term).line_mut(wrapped_row).eol = EolKind::Continue;
        new_line(term);
    }

    let deco = decoration(term);
    let col = term.cursor.position.col.min(last_col);
    let row = term.cursor.position.row;

    if term.modes.contains(TerminalModes::INSERT) {
        line_editor::insert_blanks(grid(term).line_mut(row), col, width, deco);
    }
    line_editor::put_char(grid(term).line_mut(row), col, ch, deco, wide);

    let next_col = col as u32 + width as u32;
    if next_col > last_col as u32 {
        term.cursor.position.col = last_col;
        term.wrap_pending = term.modes.contains(TerminalModes::WRAP_AROUND);
    } else {
        term.cursor.position.col = next_col as u16;
        term.wrap_pending = false;
    }
}

/// Advance to the next line, scrolling the active region if the cursor
/// sits at its bottom edge.
fn new_line(term: &mut Terminal) {
    term.cursor.position.col = 0;
    line_feed_row(term);
}

fn line_feed_row(term: &mut Terminal) {
    let (top, bottom) = term.region();
    if term.cursor.position.row >= bottom {
        scroll_region_up(term, top, bottom, 1);
    } else {
        term.cursor.position.row += 1;
    }
}

fn reverse_line_feed_row(term: &mut Terminal) {
    let (top, bottom) = term.region();
    if term.cursor.position.row <= top {
        let deco = decoration(term);
        grid(term).scroll_down(top, bottom, 1, deco);
    } else {
        term.cursor.position.row -= 1;
    }
}

/// Scroll `[top, bottom]` up by `n`, archiving removed lines to
/// scrollback only when they actually left the top of the whole window
/// (a mid-screen scrolling region doesn't feed scrollback) and only
/// while the alternate buffer isn't active.
fn scroll_region_up(term: &mut Terminal, top: u16, bottom: u16, n: u16) {
    let deco = decoration(term);
    let removed = grid(term).scroll_up(top, bottom, n, deco);
    if top == 0 && !term.alt_active {
        term.push_scrollback(removed);
    }
}

// -------------------------------------------------------------- control

fn control(term: &mut Terminal, ch: char) {
    let was_cr = term.last_was_cr;
    if ch != '\r' {
        term.last_was_cr = false;
    }
    match ch {
        '\n' | '\x0B' | '\x0C' => line_feed(term, ch, was_cr),
        '\r' => {
            carriage_return(term, ch);
            term.last_was_cr = true;
        }
        '\x08' => backspace(term),
        '\x09' => {
            let width = term.size.cols;
            let col = term.cursor.position.col;
            let next = term.tab_stops.next_stop(col, width);
            term.cursor.position.col = next;
            term.wrap_pending = false;
        }
        '\x07' | '\x0E' | '\x0F' | '\0' => {
            // Bell / charset shifts: out of scope, intentionally inert.
        }
        other => debug!("unhandled control byte: {:?}", other),
    }
}

/// Decrement the column; at the left edge, step back onto the previous
/// row's last column if that row wrapped into this one.
fn backspace(term: &mut Terminal) {
    let col = term.cursor.position.col;
    if col > 0 {
        term.cursor.position.col = col - 1;
    } else {
        let row = term.cursor.position.row;
        if row > 0 {
            let prev = row - 1;
            if grid(term).line(prev).eol == EolKind::Continue {
                term.cursor.position.row = prev;
                term.cursor.position.col = term.size.cols.saturating_sub(1);
            }
        }
    }
    term.wrap_pending = false;
}

fn line_feed(term: &mut Terminal, ch: char, was_cr: bool) {
    let tag = if was_cr { EolKind::CrLf } else { EolKind::Lf };
    let row = term.cursor.position.row;
    grid(term).line_mut(row).eol = tag;
    match (term.line_feed_rule, ch) {
        (LineFeedRule::Normal, '\n') | (LineFeedRule::Normal, '\x0B') | (LineFeedRule::Normal, '\x0C') => {
            line_feed_row(term);
        }
        (LineFeedRule::LfOnly, '\n') => new_line(term),
        (LineFeedRule::LfOnly, _) => line_feed_row(term),
        (LineFeedRule::CrOnly, '\n') => {}
        (LineFeedRule::CrOnly, _) => line_feed_row(term),
    }
    term.wrap_pending = false;
}

fn carriage_return(term: &mut Terminal, _ch: char) {
    match term.line_feed_rule {
        LineFeedRule::Normal => term.cursor.position.col = 0,
        LineFeedRule::LfOnly => {}
        LineFeedRule::CrOnly => {
            let row = term.cursor.position.row;
            grid(term).line_mut(row).eol = EolKind::Cr;
            new_line(term);
        }
    }
    term.wrap_pending = false;
}

// -------------------------------------------------------------- esc final

fn esc_final(term: &mut Terminal, _intermediates: &[char], final_byte: char) {
    match final_byte {
        '=' => term.keypad_mode = KeypadMode::Application,
        '>' => term.keypad_mode = KeypadMode::Normal,
        '7' => save_cursor(term),
        '8' => restore_cursor(term),
        'c' => term.full_reset(),
        'D' => line_feed_row(term),
        'M' => reverse_line_feed_row(term),
        'E' => new_line(term),
        'H' => {
            let col = term.cursor.position.col;
            term.tab_stops.set(col);
        }
        'F' => term.cursor.position = Position::new(0, 0),
        other => term.report_unknown(format!("ESC {}", other)),
    }
    term.wrap_pending = false;
}

fn save_cursor(term: &mut Terminal) {
    if term.alt_active {
        term.saved_cursor_alt = Some(term.cursor);
    } else {
        term.saved_cursor_main = Some(term.cursor);
    }
}

fn restore_cursor(term: &mut Terminal) {
    let slot = if term.alt_active { term.saved_cursor_alt } else { term.saved_cursor_main };
    if let Some(cursor) = slot {
        term.cursor = cursor;
        term.clamp_cursor();
    }
}

// -------------------------------------------------------------- csi

fn count(params: &[i64], idx: usize) -> u16 {
    let v = params.get(idx).copied().unwrap_or(0);
    if v <= 0 { 1 } else { v as u16 }
}

fn pos(params: &[i64], idx: usize) -> u16 {
    let v = params.get(idx).copied().unwrap_or(1);
    if v <= 0 { 1 } else { v as u16 }
}

fn raw(params: &[i64], idx: usize) -> i64 {
    params.get(idx).copied().unwrap_or(0)
}

fn csi(
    term: &mut Terminal,
    private: Option<char>,
    params: &[i64],
    intermediates: &[char],
    final_byte: char,
    sink: &mut dyn TransmitSink,
) {
    match private {
        Some('?') => return dec_private(term, params, final_byte),
        Some('>') if final_byte == 'c' => {
            sink.transmit(b"\x1b[>82;1;0c");
            return;
        }
        _ => {}
    }

    match final_byte {
        'A' => cursor_up(term, count(params, 0)),
        'B' => cursor_down(term, count(params, 0)),
        'C' => cursor_right(term, count(params, 0)),
        'D' => cursor_left(term, count(params, 0)),
        'E' => {
            term.cursor.position.col = 0;
            cursor_down(term, count(params, 0));
        }
        'F' => {
            term.cursor.position.col = 0;
            cursor_up(term, count(params, 0));
        }
        'H' | 'f' => cursor_to(term, pos(params, 0), pos(params, 1)),
        'd' => cursor_to(term, pos(params, 0), term.cursor.position.col + 1),
        'G' | '`' => column_to(term, pos(params, 0)),
        'J' => erase_in_display(term, raw(params, 0)),
        'K' => erase_in_line(term, raw(params, 0)),
        'L' => {
            let (top, bottom) = active_region(term);
            let deco = decoration(term);
            let at = term.cursor.position.row.max(top);
            grid(term).insert_lines(at, bottom, count(params, 0), deco);
        }
        'M' => {
            let (top, bottom) = active_region(term);
            let deco = decoration(term);
            let at = term.cursor.position.row.max(top);
            grid(term).delete_lines(at, bottom, count(params, 0), deco);
        }
        'S' => {
            let (top, bottom) = active_region(term);
            scroll_region_up(term, top, bottom, count(params, 0));
        }
        'T' => {
            let (top, bottom) = active_region(term);
            let deco = decoration(term);
            grid(term).scroll_down(top, bottom, count(params, 0), deco);
        }
        'X' => {
            let deco = decoration(term);
            let col = term.cursor.position.col;
            let n = count(params, 0);
            let row = term.cursor.position.row;
            line_editor::fill_space(grid(term).line_mut(row), col, col + n.saturating_sub(1), deco);
        }
        'P' => {
            let deco = decoration(term);
            let col = term.cursor.position.col;
            let row = term.cursor.position.row;
            line_editor::delete_chars(grid(term).line_mut(row), col, count(params, 0), deco);
        }
        '@' => {
            let deco = decoration(term);
            let col = term.cursor.position.col;
            let row = term.cursor.position.row;
            line_editor::insert_blanks(grid(term).line_mut(row), col, count(params, 0), deco);
        }
        'I' => {
            let width = term.size.cols;
            for _ in 0..count(params, 0) {
                let col = term.cursor.position.col;
                term.cursor.position.col = term.tab_stops.next_stop(col, width);
            }
        }
        'Z' => {
            for _ in 0..count(params, 0) {
                let col = term.cursor.position.col;
                term.cursor.position.col = term.tab_stops.prev_stop(col);
            }
        }
        'g' => match raw(params, 0) {
            0 => {
                let col = term.cursor.position.col;
                term.tab_stops.clear(col);
            }
            3 => term.tab_stops.clear_all(),
            other => term.report_unsupported(format!("CSI {}g", other)),
        },
        'm' => {
            let mut deco = term.cursor.decoration;
            sgr::apply(&mut deco, params);
            term.cursor.decoration = deco;
        }
        'h' | 'l' => ansi_mode(term, params, final_byte == 'h'),
        'r' if intermediates.is_empty() => set_scroll_region(term, params),
        'c' => sink.transmit(b"\x1b[?1;2c"),
        'n' => device_status_report(term, raw(params, 0), sink),
        'p' if intermediates.contains(&'!') => term.full_reset(),
        't' => {
            // Window-manipulation queries (resize/report/iconify): parsed
            // and acknowledged as a no-op, no reply emitted.
        }
        'U' => term.cursor.position = Position::new(term.size.rows.saturating_sub(1), 0),
        other => term.report_unknown(format!("CSI {}", other)),
    }
    term.wrap_pending = false;
}

fn active_region(term: &Terminal) -> (u16, u16) {
    term.region()
}

fn cursor_up(term: &mut Terminal, n: u16) {
    let (top, _bottom) = term.region();
    let min_row = if term.modes.contains(TerminalModes::ORIGIN) { top } else { 0 };
    term.cursor.position.row = term.cursor.position.row.saturating_sub(n).max(min_row);
}

fn cursor_down(term: &mut Terminal, n: u16) {
    let (_top, bottom) = term.region();
    let max_row = if term.modes.contains(TerminalModes::ORIGIN) {
        bottom
    } else {
        term.size.rows.saturating_sub(1)
    };
    term.cursor.position.row = (term.cursor.position.row + n).min(max_row);
}

fn cursor_right(term: &mut Terminal, n: u16) {
    let last = term.size.cols.saturating_sub(1);
    term.cursor.position.col = (term.cursor.position.col + n).min(last);
}

fn cursor_left(term: &mut Terminal, n: u16) {
    term.cursor.position.col = term.cursor.position.col.saturating_sub(n);
}

/// Move the cursor to an absolute column, leaving the row untouched.
/// Unlike [`cursor_to`], this never re-applies the origin-mode row
/// offset — CHA addresses the column within whatever row the cursor is
/// already on.
fn column_to(term: &mut Terminal, col1: u16) {
    let col0 = col1.saturating_sub(1);
    term.cursor.position.col = col0.min(term.size.cols.saturating_sub(1));
}

fn cursor_to(term: &mut Terminal, row1: u16, col1: u16) {
    let (top, bottom) = term.region();
    let row0 = row1.saturating_sub(1);
    let col0 = col1.saturating_sub(1);
    let row = if term.modes.contains(TerminalModes::ORIGIN) {
        (top + row0).min(bottom)
    } else {
        row0.min(term.size.rows.saturating_sub(1))
    };
    let col = col0.min(term.size.cols.saturating_sub(1));
    term.cursor.position = Position::new(row, col);
}

fn erase_in_display(term: &mut Terminal, mode: i64) {
    let deco = decoration(term);
    let row = term.cursor.position.row;
    let col = term.cursor.position.col;
    let (top, _) = (0u16, term.size.rows.saturating_sub(1));
    let bottom = term.size.rows.saturating_sub(1);
    let last_col = term.size.cols.saturating_sub(1);

    let at_top_left = row == top && col == 0;
    let at_bottom_right = row == bottom && col == last_col;

    let effective = if (mode == 0 && at_top_left) || (mode == 1 && at_bottom_right) {
        2
    } else {
        mode
    };

    match effective {
        0 => {
            line_editor::fill_space(grid(term).line_mut(row), col, last_col, deco);
            for r in (row + 1)..=bottom {
                line_editor::clear(grid(term).line_mut(r), deco);
            }
        }
        1 => {
            line_editor::fill_space(grid(term).line_mut(row), 0, col, deco);
            for r in top..row {
                line_editor::clear(grid(term).line_mut(r), deco);
            }
        }
        2 => {
            grid(term).clear_all(deco);
            term.application_mode_back_color = Some(deco.bg);
        }
        other => term.report_unknown(format!("CSI {}J", other)),
    }
}

fn erase_in_line(term: &mut Terminal, mode: i64) {
    let deco = decoration(term);
    let row = term.cursor.position.row;
    let col = term.cursor.position.col;
    let last_col = term.size.cols.saturating_sub(1);
    match mode {
        0 => line_editor::fill_space(grid(term).line_mut(row), col, last_col, deco),
        1 => line_editor::fill_space(grid(term).line_mut(row), 0, col, deco),
        2 => line_editor::clear(grid(term).line_mut(row), deco),
        other => term.report_unknown(format!("CSI {}K", other)),
    }
}

fn set_scroll_region(term: &mut Terminal, params: &[i64]) {
    let rows = term.size.rows;
    let mut top = pos(params, 0).saturating_sub(1);
    let mut bottom = if params.len() > 1 {
        pos(params, 1).saturating_sub(1)
    } else {
        rows.saturating_sub(1)
    };
    if top > bottom {
        std::mem::swap(&mut top, &mut bottom);
    }
    let bottom = bottom.min(rows.saturating_sub(1));
    term.scroll_region = Some((top, bottom));
    term.cursor.position = Position::new(if term.modes.contains(TerminalModes::ORIGIN) { top } else { 0 }, 0);
}

fn device_status_report(term: &Terminal, code: i64, sink: &mut dyn TransmitSink) {
    match code {
        5 => sink.transmit(b"\x1b[0n"),
        6 => {
            let reply = format!(
                "\x1b[{};{}R",
                term.cursor.position.row + 1,
                term.cursor.position.col + 1
            );
            sink.transmit(reply.as_bytes());
        }
        _ => {}
    }
}

fn ansi_mode(term: &mut Terminal, params: &[i64], set: bool) {
    for &code in params {
        match code {
            4 => term.modes.set(TerminalModes::INSERT, set),
            12 => term.deferred.push(DeferredAction::SetLocalEcho(!set)),
            20 | 25 | 34 => {}
            other => term.report_unsupported(format!("ANSI mode {}", other)),
        }
    }
}

fn dec_private(term: &mut Terminal, params: &[i64], final_byte: char) {
    let set = final_byte == 'h';
    let save_restore = matches!(final_byte, 's' | 'r');
    for &code in params {
        if save_restore {
            dec_save_restore(term, code, final_byte == 's');
            continue;
        }
        match code {
            1 => {
                term.cursor_key_mode = if set {
                    vtcore_common::types::CursorKeyMode::Application
                } else {
                    vtcore_common::types::CursorKeyMode::Normal
                };
            }
            5 => term.modes.set(TerminalModes::REVERSE_VIDEO, set),
            6 => term.modes.set(TerminalModes::ORIGIN, set),
            7 => term.modes.set(TerminalModes::WRAP_AROUND, set),
            25 => term.modes.set(TerminalModes::CURSOR_VISIBLE, set),
            47 | 1047 => {
                if set {
                    enter_alt(term);
                } else {
                    exit_alt(term, false);
                }
            }
            1048 => {
                if set {
                    save_cursor(term);
                } else {
                    restore_cursor(term);
                }
            }
            1049 => {
                if set {
                    save_cursor(term);
                    enter_alt(term);
                } else {
                    exit_alt(term, true);
                }
            }
            1000 => term.mouse_state = if set { MouseTrackingState::Normal } else { MouseTrackingState::Off },
            1001 => term.mouse_state = if set { MouseTrackingState::Normal } else { MouseTrackingState::Off },
            1002 => term.mouse_state = if set { MouseTrackingState::Drag } else { MouseTrackingState::Off },
            1003 => term.mouse_state = if set { MouseTrackingState::Any } else { MouseTrackingState::Off },
            1004 => term.modes.set(TerminalModes::FOCUS_REPORTING, set),
            1005 => term.mouse_protocol = if set { MouseProtocol::Utf8 } else { MouseProtocol::Normal },
            1006 => term.mouse_protocol = if set { MouseProtocol::Sgr } else { MouseProtocol::Normal },
            1015 => term.mouse_protocol = if set { MouseProtocol::Urxvt } else { MouseProtocol::Normal },
            2004 => term.modes.set(TerminalModes::BRACKETED_PASTE, set),
            other => term.report_unsupported(format!("DEC private mode {}", other)),
        }
    }
}

fn dec_save_restore(term: &mut Terminal, code: i64, saving: bool) {
    match code {
        47 | 1047 => {
            if saving {
                term.saved_alt_flag = term.alt_active;
            } else if term.saved_alt_flag != term.alt_active {
                if term.saved_alt_flag {
                    enter_alt(term);
                } else {
                    exit_alt(term, false);
                }
            }
        }
        other => term.report_unsupported(format!("DEC mode save/restore {}", other)),
    }
}

fn enter_alt(term: &mut Terminal) {
    if term.alt_active {
        return;
    }
    term.alt_grid = Some(Grid::new(term.size.cols, term.size.rows));
    term.alt_active = true;
}

fn exit_alt(term: &mut Terminal, restore_cursor_after: bool) {
    if !term.alt_active {
        return;
    }
    term.alt_grid = None;
    term.alt_active = false;
    if restore_cursor_after {
        restore_cursor(term);
    }
}

// -------------------------------------------------------------- osc

fn osc(term: &mut Terminal, raw: &str) {
    let (cmd, rest) = match raw.split_once(';') {
        Some((cmd, rest)) => (cmd, rest),
        None => (raw, ""),
    };

    match cmd {
        "0" | "2" => term.deferred.push(DeferredAction::SetTitle(rest.to_string())),
        "1" => term.report_unsupported("OSC 1 (icon name)"),
        "4" => install_palette_entries(term, rest),
        other => term.report_unsupported(format!("OSC {}", other)),
    }
}

fn install_palette_entries(term: &mut Terminal, rest: &str) {
    let fields: Vec<&str> = rest.split(';').collect();
    let mut i = 0;
    while i + 1 < fields.len() {
        let index = fields[i].parse::<u8>().ok();
        let rgb = parse_color_spec(fields[i + 1]);
        if let (Some(index), Some(rgb)) = (index, rgb) {
            term.palette.set(index, rgb);
            term.deferred.push(DeferredAction::InstallPaletteEntry { index, rgb });
        } else {
            term.report_unsupported(format!("OSC 4 entry {};{}", fields[i], fields[i + 1]));
        }
        i += 2;
    }
}

/// Parse an xterm color spec: `#rgb` / `#rrggbb` / `#rrrgggbbb` /
/// `#rrrrggggbbbb`, or `rgb:R/G/B` with 1-4 equal-width hex fields.
/// Each channel is normalized to 8 bits based on its digit width.
fn parse_color_spec(spec: &str) -> Option<(u8, u8, u8)> {
    if let Some(hex) = spec.strip_prefix('#') {
        let len = hex.len();
        if len == 0 || len % 3 != 0 {
            return None;
        }
        let digits = len / 3;
        if !matches!(digits, 1 | 2 | 3 | 4) {
            return None;
        }
        let r = u32::from_str_radix(&hex[0..digits], 16).ok()?;
        let g = u32::from_str_radix(&hex[digits..2 * digits], 16).ok()?;
        let b = u32::from_str_radix(&hex[2 * digits..3 * digits], 16).ok()?;
        return Some((normalize_channel(r, digits), normalize_channel(g, digits), normalize_channel(b, digits)));
    }

    if let Some(triplet) = spec.strip_prefix("rgb:") {
        let parts: Vec<&str> = triplet.split('/').collect();
        if parts.len() != 3 {
            return None;
        }
        let digits = parts[0].len();
        if digits == 0 || digits > 4 || parts.iter().any(|p| p.len() != digits) {
            return None;
        }
        let r = u32::from_str_radix(parts[0], 16).ok()?;
        let g = u32::from_str_radix(parts[1], 16).ok()?;
        let b = u32::from_str_radix(parts[2], 16).ok()?;
        return Some((normalize_channel(r, digits), normalize_channel(g, digits), normalize_channel(b, digits)));
    }

    None
}

fn normalize_channel(value: u32, digits: usize) -> u8 {
    let shifted = match digits {
        1 => value << 4,
        2 => value,
        3 => value >> 4,
        4 => value >> 8,
        _ => value,
    };
    shifted.min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtcore_common::traits::RecordingSink;
    use vtcore_common::types::{Size, TerminalOptions};

    fn term(rows: u16, cols: u16) -> Terminal {
        Terminal::new(Size::new(rows, cols), TerminalOptions::default())
    }

    fn feed(t: &mut Terminal, s: &str) -> RecordingSink {
        let mut sink = RecordingSink::new();
        t.feed(s, &mut sink);
        sink
    }

    #[test]
    fn prints_advance_cursor_and_wrap() {
        let mut t = term(3, 5);
        feed(&mut t, "ABCDE");
        assert_eq!(t.cursor_position().col, 4);
        assert_eq!(t.grid.line(0).cells[4].ch, 'E');
        feed(&mut t, "F");
        assert_eq!(t.cursor_position(), vtcore_common::types::Position::new(1, 1));
        assert_eq!(t.grid.line(1).cells[0].ch, 'F');
    }

    #[test]
    fn wrapped_line_is_tagged_continue_and_backspace_steps_onto_it() {
        let mut t = term(3, 5);
        feed(&mut t, "ABCDEF");
        assert_eq!(t.grid.line(0).eol, vtcore_common::types::EolKind::Continue);
        assert_eq!(t.cursor_position(), vtcore_common::types::Position::new(1, 1));

        feed(&mut t, "\x08\x08");
        assert_eq!(t.cursor_position(), vtcore_common::types::Position::new(0, 4));
    }

    #[test]
    fn cha_column_absolute_ignores_origin_row_offset() {
        let mut t = term(10, 10);
        feed(&mut t, "\x1b[3;5r\x1b[?6h\x1b[2;4H\x1b[7G");
        assert_eq!(t.cursor_position(), vtcore_common::types::Position::new(3, 6));
    }

    #[test]
    fn line_feed_tags_lf_and_crlf() {
        let mut t = term(3, 10);
        feed(&mut t, "A\nB\r\n");
        assert_eq!(t.grid.line(0).eol, vtcore_common::types::EolKind::Lf);
        assert_eq!(t.grid.line(1).eol, vtcore_common::types::EolKind::CrLf);
    }

    #[test]
    fn line_feed_scrolls_at_bottom_of_window() {
        // Bare LF moves the row only; a real newline needs the explicit
        // CR an application sends alongside it.
        let mut t = term(2, 5);
        feed(&mut t, "A\r\nB\r\nC");
        assert_eq!(t.grid.line(0).cells[0].ch, 'B');
        assert_eq!(t.grid.line(1).cells[0].ch, 'C');
        assert_eq!(t.scrollback.len(), 1);
        assert_eq!(t.scrollback[0].cells[0].ch, 'A');
    }

    #[test]
    fn cursor_position_and_sgr_roundtrip() {
        let mut t = term(10, 10);
        feed(&mut t, "\x1b[5;6H\x1b[31mX");
        assert_eq!(t.cursor_position(), vtcore_common::types::Position::new(4, 6));
        assert_eq!(t.grid.line(4).cells[5].decoration.fg, Color::Indexed(1));
        assert_eq!(t.grid.line(4).cells[5].ch, 'X');
    }

    #[test]
    fn alternate_buffer_round_trip_preserves_main_content() {
        let mut t = term(3, 5);
        feed(&mut t, "main");
        feed(&mut t, "\x1b[?1049h");
        assert!(t.alt_active);
        feed(&mut t, "alt!");
        feed(&mut t, "\x1b[?1049l");
        assert!(!t.alt_active);
        let text: String = t.grid.line(0).cells.iter().map(|c| c.ch).collect();
        assert_eq!(text, "main ");
    }

    #[test]
    fn device_attributes_reply() {
        let mut t = term(10, 10);
        let sink = feed(&mut t, "\x1b[c");
        assert_eq!(sink.flat(), b"\x1b[?1;2c");
    }

    #[test]
    fn cursor_position_report() {
        let mut t = term(10, 10);
        feed(&mut t, "\x1b[3;4H");
        let sink = feed(&mut t, "\x1b[6n");
        assert_eq!(sink.flat(), b"\x1b[3;4R");
    }

    #[test]
    fn osc_title_is_deferred_not_applied_inline() {
        let mut t = term(5, 5);
        feed(&mut t, "\x1b]0;my title\x07");
        let deferred = t.take_deferred();
        assert_eq!(deferred, vec![DeferredAction::SetTitle("my title".to_string())]);
    }

    #[test]
    fn osc_palette_install_updates_palette_and_defers() {
        let mut t = term(5, 5);
        feed(&mut t, "\x1b]4;1;#ff0000\x07");
        assert_eq!(t.palette.get(1), (255, 0, 0));
        let deferred = t.take_deferred();
        assert_eq!(
            deferred,
            vec![DeferredAction::InstallPaletteEntry { index: 1, rgb: (255, 0, 0) }]
        );
    }

    #[test]
    fn scroll_region_confines_insert_and_delete_lines() {
        let mut t = term(5, 5);
        feed(&mut t, "\x1b[2;4r");
        assert_eq!(t.scroll_region, Some((1, 3)));
    }

    #[test]
    fn erase_in_display_mode_2_promotes_back_color() {
        let mut t = term(3, 3);
        feed(&mut t, "\x1b[41m\x1b[2J");
        assert_eq!(t.application_mode_back_color, Some(Color::Indexed(1)));
        assert_eq!(t.grid.line(0).cells[0].ch, ' ');
    }

    #[test]
    fn color_spec_parsing_normalizes_every_digit_width() {
        assert_eq!(parse_color_spec("#fff"), Some((240, 240, 240)));
        assert_eq!(parse_color_spec("#ff0000"), Some((255, 0, 0)));
        assert_eq!(parse_color_spec("rgb:ff/00/00"), Some((255, 0, 0)));
        assert_eq!(parse_color_spec("rgb:f/0/0"), Some((240, 0, 0)));
    }
}
