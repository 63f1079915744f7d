//! Cursor/function/editing key → byte sequence encoding under the
//! current cursor-key mode and `modifyCursorKeys` setting.

use vtcore_common::types::{CursorKeyMode, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKey {
    Up,
    Down,
    Right,
    Left,
}

impl CursorKey {
    fn letter(self) -> u8 {
        match self {
            CursorKey::Up => b'A',
            CursorKey::Down => b'B',
            CursorKey::Right => b'C',
            CursorKey::Left => b'D',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionKey(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingKey {
    Insert,
    Home,
    PageUp,
    Delete,
    End,
    PageDown,
}

pub fn encode_cursor_key(
    key: CursorKey,
    modifiers: Modifiers,
    cursor_key_mode: CursorKeyMode,
    modify_cursor_keys: u16,
) -> Vec<u8> {
    let m = modifiers.index();
    let letter = key.letter();
    if modify_cursor_keys == 2 && (2..=7).contains(&m) {
        format!("\x1b[1;{}{}", m, letter as char).into_bytes()
    } else if modify_cursor_keys == 3 && (2..=7).contains(&m) {
        format!("\x1b[>1;{}{}", m, letter as char).into_bytes()
    } else if cursor_key_mode == CursorKeyMode::Application {
        vec![0x1b, b'O', letter]
    } else {
        vec![0x1b, b'[', letter]
    }
}

/// xterm's F5–F12 parameter numbers (F1–F4 use `P/Q/R/S` letters instead).
fn function_param(n: u8) -> u8 {
    match n {
        5 => 15,
        6 => 17,
        7 => 18,
        8 => 19,
        9 => 20,
        10 => 21,
        11 => 23,
        12 => 24,
        _ => 0,
    }
}

pub fn encode_function_key(key: FunctionKey, modifiers: Modifiers) -> Vec<u8> {
    let n = key.0;
    let m = modifiers.index();
    if (1..=4).contains(&n) {
        let letter = [b'P', b'Q', b'R', b'S'][(n - 1) as usize] as char;
        if m > 1 {
            format!("\x1b[1;{}{}", m, letter).into_bytes()
        } else {
            vec![0x1b, b'O', letter as u8]
        }
    } else if (5..=12).contains(&n) {
        let code = function_param(n);
        if m > 1 {
            format!("\x1b[{};{}~", code, m).into_bytes()
        } else {
            format!("\x1b[{}~", code).into_bytes()
        }
    } else {
        Vec::new()
    }
}

pub fn encode_editing_key(key: EditingKey, legacy: bool) -> Vec<u8> {
    let n = if legacy {
        match key {
            EditingKey::Insert => 1,
            EditingKey::Home => 2,
            EditingKey::PageUp => 3,
            EditingKey::Delete => 4,
            EditingKey::End => 5,
            EditingKey::PageDown => 6,
        }
    } else {
        match key {
            EditingKey::Insert => 2,
            EditingKey::Home => 7,
            EditingKey::PageUp => 5,
            EditingKey::Delete => 3,
            EditingKey::End => 8,
            EditingKey::PageDown => 6,
        }
    };
    format!("\x1b[{}~", n).into_bytes()
}
