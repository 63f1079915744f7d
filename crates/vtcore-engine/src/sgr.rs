//! SGR (`CSI ... m`) attribute state machine. A small pull-based loop
//! threads through the parameter list because the 38/48 extended-color
//! forms span multiple parameters; everything else dispatches in one
//! step.

use tracing::debug;
use vtcore_common::types::{Color, Decoration};

#[derive(Clone, Copy)]
enum Target {
    Fg,
    Bg,
}

#[derive(Clone, Copy)]
enum State {
    Idle,
    ReadColorMode(Target),
    ReadIndexed(Target),
    ReadRgbR(Target),
    ReadRgbG(Target, u8),
    ReadRgbB(Target, u8, u8),
}

fn clamp_channel(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

fn set_color(decoration: &mut Decoration, target: Target, color: Color) {
    match target {
        Target::Fg => decoration.fg = color,
        Target::Bg => decoration.bg = color,
    }
}

/// Apply one full `CSI ... m` parameter list to `decoration` in place.
/// Parameters that end the sequence mid multi-parameter read (e.g. a bare
/// `38;2` with no RGB components) simply leave the decoration as it was
/// at that point — there is no rollback.
pub fn apply(decoration: &mut Decoration, params: &[i64]) {
    // A bare `CSI m` means a single implicit 0 (reset).
    let params: &[i64] = if params.is_empty() { &[0] } else { params };

    let mut state = State::Idle;
    for &code in params {
        state = match state {
            State::Idle => apply_idle(decoration, code),
            State::ReadColorMode(target) => match code {
                5 => State::ReadIndexed(target),
                2 => State::ReadRgbR(target),
                other => {
                    // Abort back to idle and reprocess this code as a
                    // fresh SGR parameter rather than discarding it.
                    apply_idle(decoration, other)
                }
            },
            State::ReadIndexed(target) => {
                set_color(decoration, target, Color::Indexed(clamp_channel(code)));
                State::Idle
            }
            State::ReadRgbR(target) => State::ReadRgbG(target, clamp_channel(code)),
            State::ReadRgbG(target, r) => State::ReadRgbB(target, r, clamp_channel(code)),
            State::ReadRgbB(target, r, g) => {
                set_color(decoration, target, Color::Rgb(r, g, clamp_channel(code)));
                State::Idle
            }
        };
    }
}

fn apply_idle(decoration: &mut Decoration, code: i64) -> State {
    match code {
        0 | 22 => *decoration = Decoration::default(),
        1 => decoration.bold = true,
        4 => decoration.underline = true,
        5 | 6 => decoration.blink = true,
        7 => decoration.inverse = true,
        8 => decoration.hidden = true,
        24 => decoration.underline = false,
        25 => decoration.blink = false,
        27 => decoration.inverse = false,
        28 => decoration.hidden = false,
        30..=37 => decoration.fg = Color::Indexed((code - 30) as u8),
        40..=47 => decoration.bg = Color::Indexed((code - 40) as u8),
        90..=97 => decoration.fg = Color::Indexed((code - 90 + 8) as u8),
        100..=107 => decoration.bg = Color::Indexed((code - 100 + 8) as u8),
        39 => decoration.fg = Color::Default,
        49 => decoration.bg = Color::Default,
        38 => return State::ReadColorMode(Target::Fg),
        48 => return State::ReadColorMode(Target::Bg),
        other => debug!("unsupported SGR code: {}", other),
    }
    State::Idle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_prior_attributes() {
        let mut d = Decoration::default();
        d.bold = true;
        d.fg = Color::Indexed(1);
        apply(&mut d, &[0]);
        assert_eq!(d, Decoration::default());
    }

    #[test]
    fn legacy_ansi_colors() {
        let mut d = Decoration::default();
        apply(&mut d, &[31, 44]);
        assert_eq!(d.fg, Color::Indexed(1));
        assert_eq!(d.bg, Color::Indexed(4));
    }

    #[test]
    fn bright_ansi_colors() {
        let mut d = Decoration::default();
        apply(&mut d, &[91, 102]);
        assert_eq!(d.fg, Color::Indexed(9));
        assert_eq!(d.bg, Color::Indexed(10));
    }

    #[test]
    fn indexed_extended_color() {
        let mut d = Decoration::default();
        apply(&mut d, &[38, 5, 200]);
        assert_eq!(d.fg, Color::Indexed(200));
    }

    #[test]
    fn rgb_extended_color() {
        let mut d = Decoration::default();
        apply(&mut d, &[48, 2, 10, 20, 30]);
        assert_eq!(d.bg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn truncated_rgb_sequence_applies_nothing_further() {
        let mut d = Decoration::default();
        d.bold = true;
        apply(&mut d, &[38, 2, 10]);
        // mid-assignment: bold (already set before the 38 sub-sequence
        // began) survives untouched, fg stays whatever it was.
        assert!(d.bold);
        assert_eq!(d.fg, Color::Default);
    }

    #[test]
    fn combined_attributes_and_color_in_one_sequence() {
        let mut d = Decoration::default();
        apply(&mut d, &[1, 4, 31]);
        assert!(d.bold);
        assert!(d.underline);
        assert_eq!(d.fg, Color::Indexed(1));
    }

    #[test]
    fn empty_params_means_reset() {
        let mut d = Decoration::default();
        d.bold = true;
        apply(&mut d, &[]);
        assert_eq!(d, Decoration::default());
    }
}
