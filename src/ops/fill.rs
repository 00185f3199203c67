//! 4-connected flood fill.

use crate::canvas::{CELL_COUNT, PixelBuffer, SCREEN_HEIGHT, SCREEN_WIDTH, is_valid_color};

/// Result of a flood fill.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// Cells repainted.
    pub painted: usize,
    /// Rows holding at least one repainted cell, ascending.
    pub rows: Vec<usize>,
}

impl FillOutcome {
    pub fn is_noop(&self) -> bool {
        self.painted == 0
    }
}

/// Repaint the 4-connected region of the seed's colour with `fill_color`.
///
/// No-op when the seed is off-screen, `fill_color` is not a palette index, or
/// the seed already holds `fill_color`. Does not run the colour-clash pass;
/// callers repair every row in [`FillOutcome::rows`] at full width.
pub fn flood_fill(buffer: &mut PixelBuffer, x: i32, y: i32, fill_color: u8) -> FillOutcome {
    let Some(target) = buffer.try_get(x, y) else {
        return FillOutcome::default();
    };
    if !is_valid_color(fill_color) || target == fill_color {
        return FillOutcome::default();
    }

    let w = SCREEN_WIDTH;
    // visited doubles as the "already queued" marker so a cell is pushed once.
    let mut visited = vec![false; CELL_COUNT];
    let mut rows = [false; SCREEN_HEIGHT];
    let mut painted = 0usize;

    // DFS stack of flat indices.
    let seed = y as usize * w + x as usize;
    let mut stack: Vec<u32> = Vec::with_capacity(4096);
    visited[seed] = true;
    stack.push(seed as u32);

    while let Some(idx) = stack.pop() {
        let idx = idx as usize;
        let cx = idx % w;
        let cy = idx / w;

        buffer.set(cx as i32, cy as i32, fill_color);
        painted += 1;
        rows[cy] = true;

        let mut visit = |ni: usize, nx: usize, ny: usize| {
            if !visited[ni] && buffer.get(nx, ny) == target {
                visited[ni] = true;
                stack.push(ni as u32);
            }
        };
        if cx > 0 {
            visit(idx - 1, cx - 1, cy);
        }
        if cx + 1 < w {
            visit(idx + 1, cx + 1, cy);
        }
        if cy > 0 {
            visit(idx - w, cx, cy - 1);
        }
        if cy + 1 < SCREEN_HEIGHT {
            visit(idx + w, cx, cy + 1);
        }
    }

    FillOutcome {
        painted,
        rows: (0..SCREEN_HEIGHT).filter(|&r| rows[r]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::shapes::rectangle;

    #[test]
    fn blank_screen_fills_completely() {
        let mut buf = PixelBuffer::new();
        let outcome = flood_fill(&mut buf, 128, 96, 7);
        assert_eq!(outcome.painted, CELL_COUNT);
        assert_eq!(outcome.rows.len(), SCREEN_HEIGHT);
        assert!(buf.as_indices().iter().all(|&c| c == 7));
    }

    #[test]
    fn same_color_fill_is_noop() {
        let mut buf = PixelBuffer::filled(7).unwrap();
        let before = buf.clone();
        let outcome = flood_fill(&mut buf, 3, 3, 7);
        assert!(outcome.is_noop());
        assert!(outcome.rows.is_empty());
        assert_eq!(buf, before);
    }

    #[test]
    fn off_screen_seed_and_bad_color_are_noops() {
        let mut buf = PixelBuffer::new();
        assert!(flood_fill(&mut buf, -1, 0, 3).is_noop());
        assert!(flood_fill(&mut buf, 0, 192, 3).is_noop());
        assert!(flood_fill(&mut buf, 0, 0, 16).is_noop());
        assert_eq!(buf, PixelBuffer::new());
    }

    #[test]
    fn enclosed_region_stays_inside_border() {
        let mut buf = PixelBuffer::new();
        for (x, y) in rectangle(16, 16, 31, 23, false) {
            buf.set(x, y, 1);
        }
        let outcome = flood_fill(&mut buf, 20, 20, 4);
        // Interior is 14 x 6.
        assert_eq!(outcome.painted, 14 * 6);
        assert_eq!(outcome.rows, (17..=22).collect::<Vec<_>>());

        buf.for_each_cell(|x, y, c| {
            let inside = (17..=30).contains(&x) && (17..=22).contains(&y);
            let border = (16..=31).contains(&x)
                && (16..=23).contains(&y)
                && (x == 16 || x == 31 || y == 16 || y == 23);
            let expected = if inside {
                4
            } else if border {
                1
            } else {
                0
            };
            assert_eq!(c, expected, "cell ({x}, {y})");
        });
    }

    #[test]
    fn diagonal_gaps_do_not_leak() {
        let mut buf = PixelBuffer::new();
        // A diagonal wall from (0,4) to (4,0); the corner region is 4-connected
        // only to itself.
        for i in 0..=4 {
            buf.set(i, 4 - i, 2);
        }
        let outcome = flood_fill(&mut buf, 0, 0, 9);
        // Cells strictly above the diagonal: x + y < 4.
        assert_eq!(outcome.painted, 10);
        assert_eq!(buf.get(5, 0), 0);
        assert_eq!(buf.get(4, 1), 0);
    }
}
