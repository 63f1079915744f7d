//! Sparse bit-vector of horizontal tab stops. Default stops sit every 8
//! columns; the vector grows on demand, re-seeding new entries with that
//! same default pattern rather than leaving them unset.

pub struct TabStops {
    stops: Vec<bool>,
}

impl TabStops {
    pub fn new(width: u16) -> Self {
        Self {
            stops: default_pattern(width),
        }
    }

    /// Grow (never shrink) to cover `width` columns, seeding newly
    /// exposed columns with the default every-8 pattern.
    pub fn resize(&mut self, width: u16) {
        let width = width as usize;
        if width <= self.stops.len() {
            return;
        }
        for col in self.stops.len()..width {
            self.stops.push(col % 8 == 0);
        }
    }

    pub fn set(&mut self, col: u16) {
        self.ensure_len(col);
        self.stops[col as usize] = true;
    }

    pub fn clear(&mut self, col: u16) {
        self.ensure_len(col);
        self.stops[col as usize] = false;
    }

    pub fn clear_all(&mut self) {
        for stop in &mut self.stops {
            *stop = false;
        }
    }

    /// Next stop strictly greater than `col`, clamped to `width - 1`.
    pub fn next_stop(&mut self, col: u16, width: u16) -> u16 {
        self.ensure_len(width.saturating_sub(1));
        let last = width.saturating_sub(1);
        ((col + 1)..=last)
            .find(|&c| self.stops.get(c as usize).copied().unwrap_or(false))
            .unwrap_or(last)
    }

    /// Previous stop strictly less than `col`, clamped to 0.
    pub fn prev_stop(&self, col: u16) -> u16 {
        (0..col)
            .rev()
            .find(|&c| self.stops.get(c as usize).copied().unwrap_or(false))
            .unwrap_or(0)
    }

    fn ensure_len(&mut self, col: u16) {
        let needed = col as usize + 1;
        if needed > self.stops.len() {
            self.resize(needed as u16);
        }
    }
}

fn default_pattern(width: u16) -> Vec<bool> {
    (0..width).map(|c| c % 8 == 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stops_every_eight_columns() {
        let mut t = TabStops::new(40);
        assert_eq!(t.next_stop(0, 40), 8);
        assert_eq!(t.next_stop(8, 40), 16);
        assert_eq!(t.next_stop(39, 40), 39);
    }

    #[test]
    fn clear_all_forces_right_edge() {
        let mut t = TabStops::new(40);
        t.clear_all();
        assert_eq!(t.next_stop(0, 40), 39);
        assert_eq!(t.next_stop(20, 40), 39);
    }

    #[test]
    fn set_and_clear_single_stop() {
        let mut t = TabStops::new(20);
        t.clear_all();
        t.set(5);
        assert_eq!(t.next_stop(0, 20), 5);
        t.clear(5);
        assert_eq!(t.next_stop(0, 20), 19);
    }

    #[test]
    fn resize_reseeds_new_columns_with_default_pattern() {
        let mut t = TabStops::new(10);
        t.resize(20);
        assert_eq!(t.next_stop(10, 20), 16);
    }

    #[test]
    fn prev_stop_walks_backward() {
        let t = TabStops::new(40);
        assert_eq!(t.prev_stop(10), 8);
        assert_eq!(t.prev_stop(8), 0);
        assert_eq!(t.prev_stop(0), 0);
    }
}
