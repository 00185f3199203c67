//! The SCREEN 2 pixel buffer.
//!
//! A fixed 256×192 grid of 4-bit colour indices stored as one flat, row-major
//! array (`index = y * SCREEN_WIDTH + x`). Every scanline is split into 32
//! aligned segments of 8 columns; after any public edit completes, each
//! segment holds at most two distinct colours. The buffer itself does not
//! enforce that rule; the editing paths run [`crate::ops::clash`] after
//! painting.

use rayon::prelude::*;

/// Screen width in pixels.
pub const SCREEN_WIDTH: usize = 256;
/// Screen height in pixels.
pub const SCREEN_HEIGHT: usize = 192;
/// Width of one colour-clash segment.
pub const SEGMENT_WIDTH: usize = 8;
/// Number of aligned segments on a scanline.
pub const SEGMENTS_PER_ROW: usize = SCREEN_WIDTH / SEGMENT_WIDTH;
/// Number of palette entries; valid colour indices are `0..PALETTE_SIZE`.
pub const PALETTE_SIZE: u8 = 16;
/// Maximum number of distinct colours allowed inside one segment.
pub const MAX_SEGMENT_COLORS: usize = 2;

pub(crate) const CELL_COUNT: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Returns `true` when `color` names a palette entry.
#[inline]
pub fn is_valid_color(color: u8) -> bool {
    color < PALETTE_SIZE
}

/// Returns `true` when `(x, y)` lies on the grid.
#[inline]
pub fn in_bounds(x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < SCREEN_WIDTH && (y as usize) < SCREEN_HEIGHT
}

/// Convert a device/screen position into grid coordinates.
///
/// `grid = floor(device / scale)`. The result may fall outside the grid; the
/// editing API accepts such coordinates and treats them per its own contract.
pub fn device_to_grid(device_x: f32, device_y: f32, scale: f32) -> (i32, i32) {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    (
        (device_x / scale).floor() as i32,
        (device_y / scale).floor() as i32,
    )
}

/// Fixed-size grid of colour indices.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    cells: Box<[u8; CELL_COUNT]>,
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &SCREEN_WIDTH)
            .field("height", &SCREEN_HEIGHT)
            .field("violations", &self.violations().len())
            .finish()
    }
}

impl PixelBuffer {
    /// A blank screen (every cell colour 0).
    pub fn new() -> Self {
        Self {
            cells: Box::new([0; CELL_COUNT]),
        }
    }

    /// A screen cleared to `color`, or `None` if `color` is not a palette index.
    pub fn filled(color: u8) -> Option<Self> {
        if !is_valid_color(color) {
            return None;
        }
        Some(Self {
            cells: Box::new([color; CELL_COUNT]),
        })
    }

    /// Build a buffer from raw row-major indices.
    /// Returns `None` on a length mismatch or any index outside the palette.
    pub fn from_indices(indices: Vec<u8>) -> Option<Self> {
        if indices.len() != CELL_COUNT || !indices.iter().all(|&c| is_valid_color(c)) {
            return None;
        }
        let cells: Box<[u8; CELL_COUNT]> = indices.into_boxed_slice().try_into().ok()?;
        Some(Self { cells })
    }

    #[inline]
    fn index(x: usize, y: usize) -> usize {
        y * SCREEN_WIDTH + x
    }

    /// Read an in-bounds cell. Callers must bounds-check first.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < SCREEN_WIDTH && y < SCREEN_HEIGHT);
        self.cells[Self::index(x, y)]
    }

    /// Read a cell at possibly out-of-range signed coordinates.
    #[inline]
    pub fn try_get(&self, x: i32, y: i32) -> Option<u8> {
        in_bounds(x, y).then(|| self.get(x as usize, y as usize))
    }

    /// Paint one cell.
    ///
    /// Out-of-range coordinates or colour leave the buffer untouched and
    /// return `false`.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: u8) -> bool {
        if !in_bounds(x, y) || !is_valid_color(color) {
            return false;
        }
        self.cells[Self::index(x as usize, y as usize)] = color;
        true
    }

    /// One full scanline.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = Self::index(0, y);
        &self.cells[start..start + SCREEN_WIDTH]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = Self::index(0, y);
        &mut self.cells[start..start + SCREEN_WIDTH]
    }

    /// `(x, color)` pairs for the inclusive column range `start_x..=end_x` of
    /// row `y`. The range is clamped to the screen width; an out-of-range row
    /// yields nothing.
    pub fn row_segment(
        &self,
        y: usize,
        start_x: usize,
        end_x: usize,
    ) -> impl Iterator<Item = (usize, u8)> + '_ {
        let (lo, hi) = if start_x <= end_x {
            (start_x, end_x)
        } else {
            (end_x, start_x)
        };
        let hi = hi.min(SCREEN_WIDTH - 1);
        let row: &[u8] = if y < SCREEN_HEIGHT { self.row(y) } else { &[] };
        (lo..=hi)
            .filter(move |&x| x < row.len())
            .map(move |x| (x, row[x]))
    }

    /// Distinct colours used by segment `segment` of row `y`, ascending.
    ///
    /// On a conformant buffer this holds one or two entries; an attribute
    /// table encoder reads foreground/background from it.
    pub fn segment_colors(&self, y: usize, segment: usize) -> Vec<u8> {
        if y >= SCREEN_HEIGHT || segment >= SEGMENTS_PER_ROW {
            return Vec::new();
        }
        let start = segment * SEGMENT_WIDTH;
        let mut seen = [false; PALETTE_SIZE as usize];
        for &c in &self.row(y)[start..start + SEGMENT_WIDTH] {
            seen[c as usize] = true;
        }
        (0..PALETTE_SIZE).filter(|&c| seen[c as usize]).collect()
    }

    /// Visit every cell in row-major order.
    pub fn for_each_cell<F: FnMut(usize, usize, u8)>(&self, mut visitor: F) {
        for (i, &c) in self.cells.iter().enumerate() {
            visitor(i % SCREEN_WIDTH, i / SCREEN_WIDTH, c);
        }
    }

    /// Raw row-major indices.
    pub fn as_indices(&self) -> &[u8] {
        &self.cells[..]
    }

    /// Every `(row, segment)` pair holding more than two distinct colours.
    pub fn violations(&self) -> Vec<(usize, usize)> {
        (0..SCREEN_HEIGHT)
            .into_par_iter()
            .flat_map_iter(|y| {
                let row = self.row(y);
                (0..SEGMENTS_PER_ROW).filter_map(move |k| {
                    let start = k * SEGMENT_WIDTH;
                    let mut seen = 0u16;
                    for &c in &row[start..start + SEGMENT_WIDTH] {
                        seen |= 1 << c;
                    }
                    (seen.count_ones() as usize > MAX_SEGMENT_COLORS).then_some((y, k))
                })
            })
            .collect()
    }

    /// `true` when no segment breaks the colour-clash rule.
    pub fn is_conformant(&self) -> bool {
        self.violations().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_rejects_out_of_range_without_mutation() {
        let mut buf = PixelBuffer::new();
        let before = buf.clone();
        assert!(!buf.set(-1, 0, 3));
        assert!(!buf.set(256, 0, 3));
        assert!(!buf.set(0, 192, 3));
        assert!(!buf.set(0, -5, 3));
        assert!(!buf.set(10, 10, 16));
        assert_eq!(buf, before);

        assert!(buf.set(255, 191, 15));
        assert_eq!(buf.get(255, 191), 15);
        assert_eq!(buf.try_get(255, 191), Some(15));
        assert_eq!(buf.try_get(256, 191), None);
    }

    #[test]
    fn filled_and_from_indices_validate_colors() {
        assert!(PixelBuffer::filled(16).is_none());
        let buf = PixelBuffer::filled(4).unwrap();
        assert!(buf.as_indices().iter().all(|&c| c == 4));

        assert!(PixelBuffer::from_indices(vec![0; 10]).is_none());
        let mut raw = vec![1u8; CELL_COUNT];
        raw[77] = 20;
        assert!(PixelBuffer::from_indices(raw).is_none());

        let mut raw = vec![1u8; CELL_COUNT];
        raw[SCREEN_WIDTH + 2] = 9;
        let buf = PixelBuffer::from_indices(raw).unwrap();
        assert_eq!(buf.get(2, 1), 9);
    }

    #[test]
    fn row_segment_is_inclusive_and_clamped() {
        let mut buf = PixelBuffer::new();
        buf.set(3, 5, 7);
        let cells: Vec<_> = buf.row_segment(5, 2, 4).collect();
        assert_eq!(cells, vec![(2, 0), (3, 7), (4, 0)]);

        // Reversed bounds are normalised, the far end is clamped.
        assert_eq!(buf.row_segment(5, 300, 250).count(), 6);
        assert_eq!(buf.row_segment(500, 0, 10).count(), 0);
    }

    #[test]
    fn violations_report_segments_with_three_colors() {
        let mut buf = PixelBuffer::new();
        assert!(buf.is_conformant());

        buf.set(8, 3, 1);
        assert!(buf.is_conformant());
        buf.set(9, 3, 2);
        assert_eq!(buf.violations(), vec![(3, 1)]);
        assert_eq!(buf.segment_colors(3, 1), vec![0, 1, 2]);
        assert_eq!(buf.segment_colors(3, 0), vec![0]);
    }

    #[test]
    fn for_each_cell_visits_row_major() {
        let mut buf = PixelBuffer::new();
        buf.set(1, 0, 5);
        buf.set(0, 1, 6);
        let mut visited = 0;
        let mut first = Vec::new();
        buf.for_each_cell(|x, y, c| {
            if visited < 2 || (x, y) == (0, 1) {
                first.push((x, y, c));
            }
            visited += 1;
        });
        assert_eq!(visited, CELL_COUNT);
        assert_eq!(first, vec![(0, 0, 0), (1, 0, 5), (0, 1, 6)]);
    }

    #[test]
    fn device_coordinates_floor_to_grid() {
        assert_eq!(device_to_grid(7.9, 4.0, 4.0), (1, 1));
        assert_eq!(device_to_grid(-0.5, 0.0, 4.0), (-1, 0));
    }
}
