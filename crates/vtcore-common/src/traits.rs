/// Byte sink for replies sent back to the peer (device attributes,
/// cursor position reports, mouse reports, key encodings).
///
/// Writes are presumed non-blocking and safe to call from the terminal's
/// single input thread; nothing here is async because the core has no
/// suspension points of its own.
pub trait TransmitSink {
    fn transmit(&mut self, bytes: &[u8]);
}

/// An in-memory transmit sink, primarily for tests: records every write
/// in order without concatenating, so a test can assert on individual
/// reply frames.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub writes: Vec<Vec<u8>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes concatenated, for tests that only care about the total
    /// byte stream.
    pub fn flat(&self) -> Vec<u8> {
        self.writes.iter().flatten().copied().collect()
    }
}

impl TransmitSink for RecordingSink {
    fn transmit(&mut self, bytes: &[u8]) {
        self.writes.push(bytes.to_vec());
    }
}

/// Optional observer notified once per printable character the
/// dispatcher delivers to the grid.
pub trait ModalCharacterTask {
    fn on_char(&mut self, ch: char);
}
