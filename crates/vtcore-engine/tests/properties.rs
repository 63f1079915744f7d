//! Universally-quantified properties, checked over generated inputs
//! rather than single examples.

use proptest::prelude::*;
use vtcore_engine::{Color, Decoration, RecordingSink, Size, Terminal, TerminalOptions};

fn term(rows: u16, cols: u16) -> Terminal {
    Terminal::new(Size::new(rows, cols), TerminalOptions::default())
}

fn feed(t: &mut Terminal, s: &str) {
    let mut sink = RecordingSink::new();
    t.feed(s, &mut sink);
}

/// Printable ASCII, one column wide and never a control byte — safe to
/// print one-per-cell without triggering wrap or wide-character logic.
fn narrow_printable() -> impl Strategy<Value = char> {
    (0x20u8..=0x7eu8).prop_map(|b| b as char)
}

proptest! {
    /// Feeding narrow printable characters with no wrapping (width large
    /// enough to hold them all) reproduces them verbatim in row-major
    /// order.
    #[test]
    fn plain_text_round_trips_without_wrap(chars in prop::collection::vec(narrow_printable(), 1..40)) {
        let width = chars.len() as u16 + 5;
        let mut t = term(5, width);
        let s: String = chars.iter().collect();
        feed(&mut t, &s);
        let text: String = t.grid().line(0).cells.iter().take(chars.len()).map(|c| c.ch).collect();
        prop_assert_eq!(text, s);
    }

    /// Repeating the same DECSET/DECRST for wrap-around (mode 7) any
    /// number of times has the same observable effect as applying it
    /// once: a full-width print either wraps to the next row or clamps at
    /// the last column, matching the final toggle's state.
    #[test]
    fn wrap_around_mode_toggle_is_idempotent(repeats in 1usize..5, set in any::<bool>()) {
        let toggle = if set { "\x1b[?7h" } else { "\x1b[?7l" };
        let mut repeated = term(3, 5);
        feed(&mut repeated, &toggle.repeat(repeats));
        feed(&mut repeated, "ABCDEF");

        let mut once = term(3, 5);
        feed(&mut once, toggle);
        feed(&mut once, "ABCDEF");

        prop_assert_eq!(repeated.cursor_position(), once.cursor_position());
        let text_repeated: String = repeated.grid().line(0).cells.iter().map(|c| c.ch).collect();
        let text_once: String = once.grid().line(0).cells.iter().map(|c| c.ch).collect();
        prop_assert_eq!(text_repeated, text_once);
    }

    /// `CSI 0 m` always resets decoration to the default, no matter what
    /// SGR history preceded it.
    #[test]
    fn sgr_reset_clears_any_history(codes in prop::collection::vec(1i64..=107, 0..8)) {
        let mut t = term(3, 10);
        let mut seq = String::new();
        for c in &codes {
            seq.push_str(&format!("\x1b[{}m", c));
        }
        seq.push_str("\x1b[0mX");
        feed(&mut t, &seq);
        assert_eq!(t.grid().line(0).cells[0].decoration, Decoration::default());
    }

    /// In a freshly constructed terminal (the same tab-stop state a full
    /// reset restores), the next tab stop from any column is the next
    /// multiple of 8, or the right edge, whichever comes first.
    #[test]
    fn tab_stop_law_after_reset(col in 0u16..60, width in 10u16..80) {
        let col = col.min(width - 1);
        let mut t = term(5, width);
        // Position the cursor at `col` via CUP, then emit one HT.
        let seq = format!("\x1b[1;{}H\t", col + 1);
        feed(&mut t, &seq);
        let expected = {
            let last = width - 1;
            ((col + 1)..=last).find(|c| c % 8 == 0).unwrap_or(last)
        };
        prop_assert_eq!(t.cursor_position().col, expected);
    }

    /// `CSI 3 g` clears every tab stop; every subsequent HT lands on the
    /// right edge regardless of starting column.
    #[test]
    fn clear_all_tab_stops_forces_right_edge(col in 0u16..60, width in 10u16..80) {
        let col = col.min(width - 1);
        let mut t = term(5, width);
        let seq = format!("\x1b[3g\x1b[1;{}H\t", col + 1);
        feed(&mut t, &seq);
        prop_assert_eq!(t.cursor_position().col, width - 1);
    }

    /// CUP always clamps the resulting caret to the visible window,
    /// whatever out-of-range row/col it's given.
    #[test]
    fn cursor_position_is_always_clamped(row in 0i64..2000, col in 0i64..2000, height in 2u16..40, width in 2u16..120) {
        let mut t = term(height, width);
        let seq = format!("\x1b[{};{}H", row, col);
        feed(&mut t, &seq);
        let pos = t.cursor_position();
        prop_assert!(pos.row < height);
        prop_assert!(pos.col < width);
    }

    /// Entering then leaving the alternate screen, with arbitrary writes
    /// in between, always restores the main buffer's prior content and
    /// cursor.
    #[test]
    fn alternate_buffer_round_trip_restores_main_state(
        prefix in prop::collection::vec(narrow_printable(), 0..10),
        scratch in prop::collection::vec(narrow_printable(), 0..10),
    ) {
        let mut t = term(5, 20);
        let prefix_s: String = prefix.iter().collect();
        feed(&mut t, &prefix_s);
        let cursor_before = t.cursor_position();
        let main_before: String = t.grid().line(0).cells.iter().map(|c| c.ch).collect();

        feed(&mut t, "\x1b[?1049h");
        let scratch_s: String = scratch.iter().collect();
        feed(&mut t, &scratch_s);
        feed(&mut t, "\x1b[?1049l");

        prop_assert_eq!(t.cursor_position(), cursor_before);
        let main_after: String = t.grid().line(0).cells.iter().map(|c| c.ch).collect();
        prop_assert_eq!(main_after, main_before);
        prop_assert!(!t.is_alternate_screen_active());
    }
}
