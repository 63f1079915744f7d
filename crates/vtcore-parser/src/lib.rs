//! Byte/char-stream recognizer for xterm-style escape sequences.
//!
//! This is the "Escape parser" component of the terminal core: a small
//! pushdown recognizer that turns an incoming stream of already-decoded
//! Unicode scalars into a flat stream of [`Sequence`] tokens. It does not
//! know what any sequence *means* — that is the sequence dispatcher's
//! job, one layer up.

use tracing::{debug, trace};
use vtcore_common::error::TermError;

/// One recognized token handed to the sequence dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    /// A printable character to place in the grid.
    Print(char),
    /// A single C0 or C1 control character.
    Control(char),
    /// `ESC <intermediates> <final>` with no CSI/OSC/DCS introducer.
    EscFinal {
        intermediates: Vec<char>,
        final_byte: char,
    },
    /// `CSI <private?> <params> <intermediates> <final>`.
    Csi {
        private: Option<char>,
        params: Vec<i64>,
        intermediates: Vec<char>,
        final_byte: char,
    },
    /// `OSC <payload> (BEL|ST)`, payload excludes the terminator.
    Osc { raw: String },
    /// `DCS <payload> ST`, payload excludes the terminator. Device-
    /// specific content beyond termination is out of scope, so the
    /// payload is carried but never interpreted.
    Dcs { raw: String },
}

const BEL: char = '\u{07}';
const ESC: char = '\u{1B}';
const ST: char = '\u{9C}';

/// Hard cap on the escape accumulator, defending against a runaway DCS
/// that never terminates.
const MAX_ACCUMULATOR: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Escaping,
}

/// What a latched, not-yet-resolved ESC is waiting to decide: whether the
/// next character turns it into an ST alias (`ESC \`) or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingResume {
    /// The ESC arrived while idle; there was nothing open to abort.
    FreshFromIdle,
    /// The ESC arrived while an OSC/DCS string was being collected;
    /// if it's not actually an ST alias, that open string is aborted.
    AbortingAwaitString,
}

/// The escape-sequence state machine: IDLE/ESCAPING with a one-slot
/// lookahead for the `ESC \` vs fresh-sequence ambiguity.
pub struct EscapeParser {
    mode: Mode,
    acc: Vec<char>,
    pending: Option<PendingResume>,
    out: Vec<Sequence>,
    diagnostics: Vec<TermError>,
}

impl EscapeParser {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            acc: Vec::new(),
            pending: None,
            out: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Feed a chunk of already-decoded characters through the recognizer,
    /// returning every [`Sequence`] it completed along the way.
    pub fn feed(&mut self, input: &str) -> Vec<Sequence> {
        for ch in input.chars() {
            self.feed_char(ch);
        }
        std::mem::take(&mut self.out)
    }

    /// Diagnostics raised since the last call to this method.
    pub fn take_diagnostics(&mut self) -> Vec<TermError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear the parser's accumulator and pending state without touching
    /// anything outside the parser.
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.acc.clear();
        self.pending = None;
    }

    fn feed_char(&mut self, ch: char) {
        if let Some(resume) = self.pending.take() {
            if ch == '\\' {
                match resume {
                    PendingResume::FreshFromIdle => {
                        // Nothing was open; ST with no sequence to
                        // terminate is an inert control.
                        self.dispatch(ST);
                    }
                    PendingResume::AbortingAwaitString => {
                        self.terminate_current();
                    }
                }
            } else {
                if resume == PendingResume::AbortingAwaitString {
                    self.report_incomplete();
                }
                self.acc.clear();
                self.mode = Mode::Escaping;
                self.dispatch(ch);
            }
            return;
        }
        self.dispatch(ch);
    }

    fn dispatch(&mut self, ch: char) {
        match self.mode {
            Mode::Idle => self.dispatch_idle(ch),
            Mode::Escaping => self.dispatch_escaping(ch),
        }
    }

    fn dispatch_idle(&mut self, ch: char) {
        if ch == ESC {
            self.pending = Some(PendingResume::FreshFromIdle);
            return;
        }
        if is_control(ch) {
            trace!("control char: {:?}", ch);
            self.out.push(Sequence::Control(ch));
        } else {
            self.out.push(Sequence::Print(ch));
        }
    }

    fn dispatch_escaping(&mut self, ch: char) {
        if ch == '\0' {
            // Observed in real streams; dropped silently.
            return;
        }
        if ch == ESC {
            if is_await_string_shape(&self.acc) {
                self.pending = Some(PendingResume::AbortingAwaitString);
            } else {
                self.report_incomplete();
                self.acc.clear();
                // Stays in Escaping with an empty accumulator.
            }
            return;
        }

        self.acc.push(ch);

        if self.acc.len() > MAX_ACCUMULATOR {
            debug!("escape accumulator exceeded cap, forcing termination");
            self.report_unknown("accumulator overflow");
            self.reset();
            return;
        }

        self.try_terminate();
    }

    /// Check whether the just-appended character completes the
    /// accumulated sequence, and if so, build and emit it.
    fn try_terminate(&mut self) {
        let len = self.acc.len();
        let first = self.acc[0];

        if len == 1 {
            match first {
                ']' | 'P' | '[' | '@' => return, // awaiting more input
                c if c.is_ascii_digit()
                    || (c.is_ascii_alphabetic() && c != 'P')
                    || matches!(c, '>' | '=' | '|' | '}' | '~') =>
                {
                    self.terminate_current();
                }
                _ => {} // fall through to generic intermediate accumulation
            }
            return;
        }

        let last = *self.acc.last().unwrap();
        match first {
            ']' => {
                if last == BEL || last == ST {
                    self.terminate_current();
                }
            }
            'P' => {
                if last == ST {
                    self.terminate_current();
                }
            }
            '[' => {
                if last.is_ascii_alphabetic() || matches!(last, '@' | '~' | '|' | '{') {
                    self.terminate_current();
                }
            }
            '@' => {
                if last == '0' || last == '1' {
                    self.terminate_current();
                }
            }
            _ => {
                // Generic ESC-intermediate form: 0x20-0x2F intermediates,
                // terminated by a byte in 0x30-0x7E. Resolves the open
                // question about ESC-final forms with intermediates
                // (e.g. charset designation `ESC ( B`) the same way
                // xterm's own ANSI X3.64 decoder does.
                if ('\u{20}'..='\u{2F}').contains(&last) {
                    return;
                }
                if ('\u{30}'..='\u{7E}').contains(&last) {
                    self.terminate_current();
                } else {
                    self.report_unknown("unrecognized escape intermediate");
                    self.reset();
                }
            }
        }
    }

    /// Finalize whatever is in the accumulator (used both by normal
    /// termination and by the `ESC \` → ST alias path) and emit it.
    fn terminate_current(&mut self) {
        let acc = std::mem::take(&mut self.acc);
        self.mode = Mode::Idle;

        if acc.is_empty() {
            return;
        }

        let seq = match acc[0] {
            ']' => {
                let end = if acc.last() == Some(&BEL) || acc.last() == Some(&ST) {
                    acc.len() - 1
                } else {
                    acc.len()
                };
                Sequence::Osc {
                    raw: acc[1..end].iter().collect(),
                }
            }
            'P' => {
                let end = if acc.last() == Some(&ST) {
                    acc.len() - 1
                } else {
                    acc.len()
                };
                Sequence::Dcs {
                    raw: acc[1..end].iter().collect(),
                }
            }
            '[' => self.build_csi(&acc),
            '@' => {
                let final_byte = *acc.last().unwrap();
                Sequence::EscFinal {
                    intermediates: acc[..acc.len() - 1].to_vec(),
                    final_byte,
                }
            }
            _ if acc.len() == 1 => Sequence::EscFinal {
                intermediates: Vec::new(),
                final_byte: acc[0],
            },
            _ => {
                let final_byte = *acc.last().unwrap();
                Sequence::EscFinal {
                    intermediates: acc[..acc.len() - 1].to_vec(),
                    final_byte,
                }
            }
        };
        self.out.push(seq);
    }

    fn build_csi(&mut self, acc: &[char]) -> Sequence {
        // acc[0] == '['; acc.last() is the final byte.
        let final_byte = *acc.last().unwrap();
        let body = &acc[1..acc.len() - 1];

        let mut idx = 0;
        let private = match body.first() {
            Some(&c) if matches!(c, '?' | '>' | '=' | '<') => {
                idx = 1;
                Some(c)
            }
            _ => None,
        };

        // Split off trailing intermediate bytes (0x20-0x2F) that precede
        // the final byte; everything between private marker and the
        // intermediates is the parameter string.
        let mut param_end = body.len();
        while param_end > idx && ('\u{20}'..='\u{2F}').contains(&body[param_end - 1]) {
            param_end -= 1;
        }
        let intermediates = body[param_end..].to_vec();
        let param_str = &body[idx..param_end];

        let params = parse_params(param_str);

        Sequence::Csi {
            private,
            params,
            intermediates,
            final_byte,
        }
    }

    fn report_incomplete(&mut self) {
        debug!("incomplete escape sequence aborted by ESC");
        self.diagnostics.push(TermError::IncompleteEscapeSequence);
    }

    fn report_unknown(&mut self, why: &str) {
        let text: String = self.acc.iter().collect();
        debug!("unknown escape sequence: {} ({})", text, why);
        self.diagnostics
            .push(TermError::UnknownEscapeSequence(text));
    }
}

impl Default for EscapeParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_await_string_shape(acc: &[char]) -> bool {
    matches!(acc.first(), Some(']') | Some('P'))
}

fn is_control(ch: char) -> bool {
    let v = ch as u32;
    v <= 0x1F || v == 0x7F || (0x80..=0x9F).contains(&v)
}

/// Parse `;`-separated decimal CSI parameters. An empty field means 0.
/// Mode numbers like `1049`/`2004` run to four digits, so this parses
/// the full field and only saturates against runaway input; the SGR
/// engine applies its own three-digit truncation to color sub-parameters
/// locally instead of relying on this layer to do it.
fn parse_params(body: &[char]) -> Vec<i64> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split(|c| *c == ';')
        .map(|field| {
            let digits: String = field.iter().collect();
            digits.parse::<i64>().unwrap_or(0).min(999_999)
        })
        .collect()
}
