use tracing::debug;

use vtcore_common::error::TermError;
use vtcore_common::traits::{ModalCharacterTask, TransmitSink};
use vtcore_common::types::{
    Color, CursorKeyMode, Decoration, KeypadMode, LineFeedRule, Modifiers, MouseProtocol,
    MouseTrackingState, Position, Size, TerminalModes, TerminalOptions, TerminalSnapshot,
};
use vtcore_parser::EscapeParser;

use crate::cursor::Cursor;
use crate::dispatch::Dispatcher;
use crate::focus;
use crate::grid::{Grid, Line};
use crate::keys::{self, CursorKey, EditingKey, FunctionKey};
use crate::mouse::{MouseEvent, MouseTracker};
use crate::palette::Palette;
use crate::tabstops::TabStops;

const MAX_SCROLLBACK: usize = 10_000;

/// Mutations that must not happen from inside sequence dispatch itself —
/// title changes, local-echo toggles, and palette installs are queued
/// here and drained by the facade once `feed` returns, so the dispatch
/// path never re-enters a settings mutation while it's already "holding
/// the lock" (there is no real lock in a single-threaded core, but the
/// ordering guarantee is the same one the re-entrancy rule protects).
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    SetTitle(String),
    SetLocalEcho(bool),
    InstallPaletteEntry { index: u8, rgb: (u8, u8, u8) },
}

pub struct Terminal {
    pub(crate) size: Size,
    pub(crate) grid: Grid,
    pub(crate) alt_grid: Option<Grid>,
    pub(crate) alt_active: bool,
    pub(crate) saved_alt_flag: bool,
    pub(crate) scrollback: Vec<Line>,

    pub(crate) cursor: Cursor,
    pub(crate) saved_cursor_main: Option<Cursor>,
    pub(crate) saved_cursor_alt: Option<Cursor>,
    pub(crate) wrap_pending: bool,
    /// Set for one dispatch step after a bare CR, so a CR immediately
    /// followed by LF tags the line CRLF instead of two separate EOLs.
    pub(crate) last_was_cr: bool,

    pub(crate) tab_stops: TabStops,
    pub(crate) scroll_region: Option<(u16, u16)>,

    pub(crate) modes: TerminalModes,
    pub(crate) cursor_key_mode: CursorKeyMode,
    pub(crate) keypad_mode: KeypadMode,
    pub(crate) line_feed_rule: LineFeedRule,

    pub(crate) palette: Palette,
    pub(crate) mouse: MouseTracker,
    pub(crate) mouse_state: MouseTrackingState,
    pub(crate) mouse_protocol: MouseProtocol,

    pub(crate) application_mode_back_color: Option<Color>,

    options: TerminalOptions,
    parser: EscapeParser,
    pub(crate) deferred: Vec<DeferredAction>,
    diagnostics: Vec<TermError>,
    modal_observer: Option<Box<dyn ModalCharacterTask>>,
}

impl Terminal {
    pub fn new(size: Size, options: TerminalOptions) -> Self {
        Self {
            size,
            grid: Grid::new(size.cols, size.rows),
            alt_grid: None,
            alt_active: false,
            saved_alt_flag: false,
            scrollback: Vec::new(),

            cursor: Cursor::new(),
            saved_cursor_main: None,
            saved_cursor_alt: None,
            wrap_pending: false,
            last_was_cr: false,

            tab_stops: TabStops::new(size.cols),
            scroll_region: None,

            modes: TerminalModes::default(),
            cursor_key_mode: CursorKeyMode::Normal,
            keypad_mode: KeypadMode::Normal,
            line_feed_rule: options.line_feed_rule,

            palette: Palette::new(),
            mouse: MouseTracker::new(),
            mouse_state: MouseTrackingState::Off,
            mouse_protocol: MouseProtocol::Normal,

            application_mode_back_color: None,

            options,
            parser: EscapeParser::new(),
            deferred: Vec::new(),
            diagnostics: Vec::new(),
            modal_observer: None,
        }
    }

    pub fn set_modal_observer(&mut self, observer: Box<dyn ModalCharacterTask>) {
        self.modal_observer = Some(observer);
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn cursor_position(&self) -> Position {
        self.cursor.position
    }

    pub fn keypad_mode(&self) -> KeypadMode {
        self.keypad_mode
    }

    pub fn options(&self) -> &TerminalOptions {
        &self.options
    }

    /// The grid currently visible: the alternate buffer when active, the
    /// primary buffer otherwise.
    pub fn grid(&self) -> &Grid {
        if self.alt_active {
            self.alt_grid.as_ref().expect("alt grid present while alt_active")
        } else {
            &self.grid
        }
    }

    pub fn is_alternate_screen_active(&self) -> bool {
        self.alt_active
    }

    pub fn scrollback(&self) -> &[Line] {
        &self.scrollback
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Feed a chunk of already-decoded characters through the parser and
    /// apply every completed sequence, in order. Infallible by
    /// construction: diagnostics accumulate for later inspection instead
    /// of aborting the stream.
    pub fn feed(&mut self, input: &str, sink: &mut dyn TransmitSink) {
        let sequences = self.parser.feed(input);
        self.diagnostics.extend(self.parser.take_diagnostics());
        for seq in sequences {
            Dispatcher::process(self, seq, sink);
        }
    }

    pub fn take_diagnostics(&mut self) -> Vec<TermError> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn take_deferred(&mut self) -> Vec<DeferredAction> {
        std::mem::take(&mut self.deferred)
    }

    pub(crate) fn report_unknown(&mut self, text: impl Into<String>) {
        self.diagnostics
            .push(TermError::UnknownEscapeSequence(text.into()));
    }

    pub(crate) fn report_unsupported(&mut self, text: impl Into<String>) {
        self.diagnostics.push(TermError::Unsupported(text.into()));
    }

    pub(crate) fn notify_char(&mut self, ch: char) {
        if let Some(observer) = self.modal_observer.as_mut() {
            observer.on_char(ch);
        }
    }

    pub fn resize(&mut self, size: Size) {
        debug!(?size, "resizing terminal");
        let dropped = self.grid.resize(size.cols, size.rows);
        if !self.alt_active {
            self.push_scrollback(dropped);
        }
        if let Some(alt) = self.alt_grid.as_mut() {
            alt.resize(size.cols, size.rows);
        }
        self.tab_stops.resize(size.cols);
        self.size = size;
        self.clamp_cursor();
    }

    pub(crate) fn clamp_cursor(&mut self) {
        self.cursor.position.row = self.cursor.position.row.min(self.size.rows.saturating_sub(1));
        self.cursor.position.col = self.cursor.position.col.min(self.size.cols.saturating_sub(1));
    }

    pub(crate) fn push_scrollback(&mut self, lines: Vec<Line>) {
        self.scrollback.extend(lines);
        if self.scrollback.len() > MAX_SCROLLBACK {
            let excess = self.scrollback.len() - MAX_SCROLLBACK;
            self.scrollback.drain(0..excess);
        }
    }

    pub(crate) fn region(&self) -> (u16, u16) {
        self.scroll_region
            .unwrap_or((0, self.size.rows.saturating_sub(1)))
    }

    pub fn snapshot(&self) -> TerminalSnapshot {
        TerminalSnapshot {
            size: self.size,
            cursor: self.cursor.position,
            modes: self.modes,
            alternate_screen_active: self.alt_active,
        }
    }

    /// `ResetInternal`: reinitialize the parser and mode flags but
    /// preserve the grid's content.
    pub fn reset_internal(&mut self) {
        self.parser.reset();
        self.modes = TerminalModes::default();
        self.cursor_key_mode = CursorKeyMode::Normal;
        self.keypad_mode = KeypadMode::Normal;
        self.mouse_state = MouseTrackingState::Off;
        self.mouse_protocol = MouseProtocol::Normal;
        self.scroll_region = None;
        self.cursor.decoration = Decoration::default();
        self.wrap_pending = false;
        self.last_was_cr = false;
    }

    /// `FullReset`: everything `reset_internal` does, plus tab stops are
    /// reinitialized and the grid itself is cleared.
    pub fn full_reset(&mut self) {
        self.reset_internal();
        self.tab_stops = TabStops::new(self.size.cols);
        self.grid.clear_all(Decoration::default());
        self.cursor.position = Position::new(0, 0);
    }

    pub fn mouse_event(&mut self, ev: MouseEvent, sink: &mut dyn TransmitSink) -> bool {
        // Read-once-into-locals: a dispatcher-side mode change mid-event
        // can only take effect on the next call.
        let state = self.mouse_state;
        let protocol = self.mouse_protocol;
        let outcome = self.mouse.handle(state, protocol, ev);
        if let Some(bytes) = outcome.bytes {
            sink.transmit(&bytes);
        }
        outcome.consumed
    }

    pub fn focus_event(&mut self, focused: bool, sink: &mut dyn TransmitSink) {
        if let Some(bytes) = focus::focus_bytes(self.modes, focused) {
            sink.transmit(bytes);
        }
    }

    /// Wrap `payload` in the bracketed-paste envelope (empty if disabled)
    /// and write it straight through; the payload bytes themselves are
    /// never inspected or mutated.
    pub fn paste(&self, payload: &[u8], sink: &mut dyn TransmitSink) {
        sink.transmit(focus::paste_leader(self.modes));
        sink.transmit(payload);
        sink.transmit(focus::paste_trailer(self.modes));
    }

    pub fn encode_cursor_key(&self, key: CursorKey, modifiers: Modifiers) -> Vec<u8> {
        keys::encode_cursor_key(
            key,
            modifiers,
            self.cursor_key_mode,
            self.options.modify_cursor_keys,
        )
    }

    pub fn encode_function_key(&self, key: FunctionKey, modifiers: Modifiers) -> Vec<u8> {
        keys::encode_function_key(key, modifiers)
    }

    pub fn encode_editing_key(&self, key: EditingKey, legacy: bool) -> Vec<u8> {
        keys::encode_editing_key(key, legacy)
    }
}
