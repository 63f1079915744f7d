use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Terminal dimensions, in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

impl Size {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// Cursor position. `row`/`col` are both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    pub fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// A color assigned to a cell's foreground or background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl Color {
    /// Map a legacy ANSI 3-bit color index (0..=15) to the palette slot
    /// xterm reserves for it. Used to seed the default 256-color palette.
    pub fn from_ansi(index: u8) -> Color {
        Color::Indexed(index)
    }
}

/// Text decoration carried by a cell: colors plus the SGR boolean flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub blink: bool,
    pub underline: bool,
    pub inverse: bool,
    pub hidden: bool,
}

impl Default for Decoration {
    fn default() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            bold: false,
            blink: false,
            underline: false,
            inverse: false,
            hidden: false,
        }
    }
}

/// A single grid cell: a scalar value plus its decoration.
///
/// Wide (double-column) characters occupy two cells: the leading cell has
/// `wide = true` and the trailing cell is a spacer (`spacer = true`, a
/// blank `ch`) so column arithmetic over the grid stays O(1) per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    pub decoration: Decoration,
    pub wide: bool,
    pub spacer: bool,
}

impl Cell {
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            decoration: Decoration::default(),
            wide: false,
            spacer: false,
        }
    }

    pub fn with_decoration(ch: char, decoration: Decoration) -> Self {
        Self {
            ch,
            decoration,
            wide: false,
            spacer: false,
        }
    }

    pub fn blank() -> Self {
        Self::new(' ')
    }

    pub fn blank_with(decoration: Decoration) -> Self {
        Self::with_decoration(' ', decoration)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

/// How a line was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EolKind {
    Hard,
    Cr,
    Lf,
    CrLf,
    /// The line wrapped into the next one; the next line is its
    /// continuation.
    Continue,
}

/// How LF/CR map onto each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineFeedRule {
    #[default]
    Normal,
    LfOnly,
    CrOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorKeyMode {
    #[default]
    Normal,
    Application,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeypadMode {
    #[default]
    Normal,
    Application,
}

/// Mouse tracking state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseTrackingState {
    #[default]
    Off,
    Normal,
    Drag,
    Any,
}

/// Mouse report wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseProtocol {
    #[default]
    Normal,
    Utf8,
    Urxvt,
    Sgr,
}

bitflags! {
    /// Boolean terminal modes that are not part of a richer state
    /// machine (those get their own enum: cursor keys, mouse tracking).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TerminalModes: u32 {
        const INSERT           = 0b0000_0001;
        const WRAP_AROUND      = 0b0000_0010;
        const ORIGIN           = 0b0000_0100;
        const REVERSE_VIDEO    = 0b0000_1000;
        const BRACKETED_PASTE  = 0b0001_0000;
        const FOCUS_REPORTING  = 0b0010_0000;
        const CURSOR_VISIBLE   = 0b0100_0000;
    }
}

impl Default for TerminalModes {
    fn default() -> Self {
        // Auto-wrap and cursor visibility are on by default in xterm.
        TerminalModes::WRAP_AROUND | TerminalModes::CURSOR_VISIBLE
    }
}

/// Configuration the host supplies once at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalOptions {
    pub modify_cursor_keys: u16,
    pub line_feed_rule: LineFeedRule,
    pub local_echo: bool,
    pub caption: String,
}

impl TerminalOptions {
    /// `modify_cursor_keys` must be positive; non-positive input is
    /// clamped up to 1 rather than treated as an error.
    pub fn new(modify_cursor_keys: u16) -> Self {
        Self {
            modify_cursor_keys: modify_cursor_keys.max(1),
            ..Self::default()
        }
    }
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            modify_cursor_keys: 2,
            line_feed_rule: LineFeedRule::Normal,
            local_echo: false,
            caption: String::new(),
        }
    }
}

/// Modifier keys held during a mouse or keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
    };

    /// 1-based modifier index used by xterm's `CSI 1 ; m` encodings:
    /// `m = 1 + shift + 2*alt + 4*ctrl`.
    pub fn index(&self) -> u8 {
        1 + self.shift as u8 + 2 * self.alt as u8 + 4 * self.ctrl as u8
    }

    /// OR-able bit mask added to a mouse status byte.
    pub fn mouse_bits(&self) -> u8 {
        (self.shift as u8 * 0x04) | (self.alt as u8 * 0x08) | (self.ctrl as u8 * 0x10)
    }
}

/// A read-only snapshot of terminal state for diagnostics/serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSnapshot {
    pub size: Size,
    pub cursor: Position,
    pub modes: TerminalModes,
    pub alternate_screen_active: bool,
}
