//! End-to-end scenarios driven through `Terminal::feed`, each a concrete
//! byte stream with a known expected outcome.

use vtcore_engine::{Color, MouseAction, MouseButton, MouseEvent, Modifiers, RecordingSink, Size, Terminal, TerminalOptions};

fn term(rows: u16, cols: u16) -> Terminal {
    Terminal::new(Size::new(rows, cols), TerminalOptions::default())
}

fn feed(t: &mut Terminal, s: &str) -> RecordingSink {
    let mut sink = RecordingSink::new();
    t.feed(s, &mut sink);
    sink
}

fn row_text(t: &Terminal, row: u16) -> String {
    t.grid().line(row).cells.iter().map(|c| c.ch).collect()
}

#[test]
fn backspace_then_overwrite() {
    let mut t = term(5, 10);
    feed(&mut t, "AB\x08C");
    assert_eq!(&row_text(&t, 0)[..2], "AC");
    assert_eq!(t.cursor_position().col, 2);
}

#[test]
fn sgr_applies_and_resets() {
    let mut t = term(5, 10);
    feed(&mut t, "\x1b[31mR\x1b[0mG");
    let line = t.grid().line(0);
    assert_eq!(line.cells[0].decoration.fg, Color::Indexed(1));
    assert_eq!(line.cells[1].decoration.fg, Color::Default);
}

#[test]
fn truecolor_sgr_sets_rgb_foreground() {
    let mut t = term(5, 10);
    feed(&mut t, "\x1b[38;2;10;20;30mX");
    assert_eq!(t.grid().line(0).cells[0].decoration.fg, Color::Rgb(10, 20, 30));
}

#[test]
fn cursor_position_report_reflects_prior_cup() {
    let mut t = term(10, 10);
    feed(&mut t, "\x1b[3;7H");
    let sink = feed(&mut t, "\x1b[6n");
    assert_eq!(sink.flat(), b"\x1b[3;7R");
}

#[test]
fn sgr_mouse_press_with_shift_encodes_expected_bytes() {
    let mut t = term(24, 80);
    feed(&mut t, "\x1b[?1000h");
    let mut sink = RecordingSink::new();
    let consumed = t.mouse_event(
        MouseEvent {
            action: MouseAction::ButtonDown,
            button: MouseButton::Left,
            modifiers: Modifiers { shift: true, alt: false, ctrl: false },
            row: 5,
            col: 9,
        },
        &mut sink,
    );
    assert!(consumed);
    assert_eq!(sink.flat(), vec![0x1b, b'[', b'M', 0x24, 0x2A, 0x26]);
}

#[test]
fn osc_palette_install_is_resolved_through_indirection() {
    let mut t = term(5, 10);
    feed(&mut t, "\x1b]4;1;#ff0000\x07");
    feed(&mut t, "\x1b[31mR");
    // The cell still stores the palette index, not a resolved RGB triple;
    // a host resolves it through the now-updated palette.
    assert_eq!(t.grid().line(0).cells[0].decoration.fg, Color::Indexed(1));
    assert_eq!(t.palette().get(1), (255, 0, 0));
}
