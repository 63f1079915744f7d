use vtcore_common::types::{Decoration, Position};

/// Cursor position plus the decoration that would be inherited by the
/// next printed character — both get saved/restored together by DECSC/
/// DECRC and by the alternate-buffer entry/exit dance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub position: Position,
    pub decoration: Decoration,
    pub visible: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            position: Position::new(0, 0),
            decoration: Decoration::default(),
            visible: true,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
