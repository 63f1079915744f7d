//! The 256-entry INDEXED color table, mutable via OSC 4. Cells store
//! `Color::Indexed(n)`; resolving `n` to an RGB triple always goes
//! through whatever palette is current, so installing a new entry
//! recolors every cell that references it without touching a single
//! cell.

/// Fixed 256-entry RGB table: the basic 16, a 6x6x6 color cube, then a
/// 24-step grayscale ramp, matching xterm's default assignment.
pub struct Palette {
    entries: [(u8, u8, u8); 256],
}

const BASIC16: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

impl Palette {
    pub fn new() -> Self {
        let mut entries = [(0u8, 0u8, 0u8); 256];
        entries[0..16].copy_from_slice(&BASIC16);

        let mut idx = 16;
        for r in 0..6u8 {
            for g in 0..6u8 {
                for b in 0..6u8 {
                    let chan = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                    entries[idx] = (chan(r), chan(g), chan(b));
                    idx += 1;
                }
            }
        }
        for i in 0..24u16 {
            let gray = (8 + i * 10) as u8;
            entries[idx] = (gray, gray, gray);
            idx += 1;
        }

        Self { entries }
    }

    pub fn get(&self, index: u8) -> (u8, u8, u8) {
        self.entries[index as usize]
    }

    pub fn set(&mut self, index: u8, rgb: (u8, u8, u8)) {
        self.entries[index as usize] = rgb;
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_colors_match_xterm_defaults() {
        let p = Palette::new();
        assert_eq!(p.get(1), (205, 0, 0));
        assert_eq!(p.get(9), (255, 0, 0));
    }

    #[test]
    fn cube_and_grayscale_are_populated() {
        let p = Palette::new();
        assert_eq!(p.get(16), (0, 0, 0));
        assert_eq!(p.get(231), (255, 255, 255));
        assert_eq!(p.get(232), (8, 8, 8));
        assert_eq!(p.get(255), (238, 238, 238));
    }

    #[test]
    fn set_overwrites_entry_in_place() {
        let mut p = Palette::new();
        p.set(1, (255, 0, 0));
        assert_eq!(p.get(1), (255, 0, 0));
    }
}
