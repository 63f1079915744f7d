//! Sequence dispatcher and terminal-state model: the semantic half of
//! the terminal core. Consumes [`vtcore_parser::Sequence`] tokens and
//! turns them into grid mutations, mode changes, and peer replies.

mod cursor;
mod dispatch;
mod focus;
mod grid;
mod keys;
mod mouse;
mod palette;
mod sgr;
mod tabstops;
mod terminal;

pub use grid::{Grid, Line};
pub use keys::{CursorKey, EditingKey, FunctionKey};
pub use mouse::{MouseAction, MouseButton, MouseEvent};
pub use palette::Palette;
pub use terminal::{DeferredAction, Terminal};

pub use vtcore_common::error::TermError;
pub use vtcore_common::traits::{ModalCharacterTask, RecordingSink, TransmitSink};
pub use vtcore_common::types::{
    Cell, Color, CursorKeyMode, Decoration, EolKind, KeypadMode, LineFeedRule, Modifiers,
    MouseProtocol, MouseTrackingState, Position, Size, TerminalModes, TerminalOptions,
    TerminalSnapshot,
};
