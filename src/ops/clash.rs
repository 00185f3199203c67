//! Colour-clash repair.
//!
//! SCREEN 2 allows only two colours in each aligned 8-pixel segment of a
//! scanline. After an edit paints cells, this pass walks the segments it
//! touched and rewrites any third (fourth, ...) colour.
//!
//! Ranking: colours are ordered by descending count in the segment, ties
//! broken by ascending colour index. The top two are kept.

use crate::canvas::{
    MAX_SEGMENT_COLORS, PALETTE_SIZE, PixelBuffer, SCREEN_HEIGHT, SCREEN_WIDTH, SEGMENT_WIDTH,
};

/// Which colour replaces cells outside a segment's retained pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClashPolicy {
    /// The colour of the gesture being drawn. Matches the reference editor,
    /// but leaves the segment in violation when that colour is not one of the
    /// retained pair.
    #[default]
    DrawingColor,
    /// The highest-ranked retained colour. Always restores the rule.
    Dominant,
}

impl ClashPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ClashPolicy::DrawingColor => "drawing",
            ClashPolicy::Dominant => "dominant",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "drawing" | "drawing_color" => Some(ClashPolicy::DrawingColor),
            "dominant" => Some(ClashPolicy::Dominant),
            _ => None,
        }
    }
}

/// Colours present in `cells` with their counts, most frequent first and
/// lowest index first among equals.
pub fn rank_colors(cells: &[u8]) -> Vec<(u8, usize)> {
    let mut counts = [0usize; PALETTE_SIZE as usize];
    for &c in cells {
        if let Some(slot) = counts.get_mut(c as usize) {
            *slot += 1;
        }
    }
    let mut ranked: Vec<(u8, usize)> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n > 0)
        .map(|(c, &n)| (c as u8, n))
        .collect();
    // Stable sort keeps ascending index order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Repair one segment slice in place. Returns the number of cells changed.
fn repair_segment(cells: &mut [u8], drawing_color: u8, policy: ClashPolicy) -> usize {
    let ranked = rank_colors(cells);
    if ranked.len() <= MAX_SEGMENT_COLORS {
        return 0;
    }
    let keep = [ranked[0].0, ranked[1].0];
    let replacement = match policy {
        ClashPolicy::DrawingColor => drawing_color,
        ClashPolicy::Dominant => keep[0],
    };

    let mut changed = 0;
    for cell in cells.iter_mut() {
        if !keep.contains(cell) && *cell != replacement {
            *cell = replacement;
            changed += 1;
        }
    }
    changed
}

/// Run the pass over every segment of row `y` overlapping the inclusive
/// column range `start_x..=end_x`. Returns the number of cells changed.
///
/// Out-of-range rows are ignored; the column range is normalised and
/// clamped.
pub fn enforce_range(
    buffer: &mut PixelBuffer,
    y: usize,
    start_x: usize,
    end_x: usize,
    drawing_color: u8,
    policy: ClashPolicy,
) -> usize {
    if y >= SCREEN_HEIGHT {
        return 0;
    }
    let lo = start_x.min(end_x).min(SCREEN_WIDTH - 1);
    let hi = start_x.max(end_x).min(SCREEN_WIDTH - 1);
    let first = lo / SEGMENT_WIDTH * SEGMENT_WIDTH;
    let last = hi / SEGMENT_WIDTH * SEGMENT_WIDTH;

    let row = buffer.row_mut(y);
    (first..=last)
        .step_by(SEGMENT_WIDTH)
        .map(|start| repair_segment(&mut row[start..start + SEGMENT_WIDTH], drawing_color, policy))
        .sum()
}

/// Run the pass over a whole row.
pub fn enforce_row(
    buffer: &mut PixelBuffer,
    y: usize,
    drawing_color: u8,
    policy: ClashPolicy,
) -> usize {
    enforce_range(buffer, y, 0, SCREEN_WIDTH - 1, drawing_color, policy)
}

/// Run the pass over the whole screen.
pub fn enforce_all(buffer: &mut PixelBuffer, drawing_color: u8, policy: ClashPolicy) -> usize {
    (0..SCREEN_HEIGHT)
        .map(|y| enforce_row(buffer, y, drawing_color, policy))
        .sum()
}

// ============================================================================
// Touched-row tracking
// ============================================================================

/// Accumulates, per row, the column range an edit touched so the pass can
/// run over exactly those segments.
#[derive(Clone, Debug)]
pub struct TouchedRows {
    spans: Vec<Option<(usize, usize)>>,
}

impl Default for TouchedRows {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchedRows {
    pub fn new() -> Self {
        Self {
            spans: vec![None; SCREEN_HEIGHT],
        }
    }

    /// Record a painted cell. Off-screen cells are ignored.
    pub fn record(&mut self, x: i32, y: i32) {
        if !crate::canvas::in_bounds(x, y) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        self.spans[y] = Some(match self.spans[y] {
            Some((lo, hi)) => (lo.min(x), hi.max(x)),
            None => (x, x),
        });
    }

    /// Mark a whole row as touched.
    pub fn record_row(&mut self, y: usize) {
        if y < SCREEN_HEIGHT {
            self.spans[y] = Some((0, SCREEN_WIDTH - 1));
        }
    }

    /// Number of rows touched.
    pub fn len(&self) -> usize {
        self.spans.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(Option::is_none)
    }

    /// Touched rows with their inclusive column range, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.spans
            .iter()
            .enumerate()
            .filter_map(|(y, s)| s.map(|(lo, hi)| (y, lo, hi)))
    }

    /// Repair every touched span. Returns the number of cells changed.
    pub fn enforce(
        &self,
        buffer: &mut PixelBuffer,
        drawing_color: u8,
        policy: ClashPolicy,
    ) -> usize {
        self.iter()
            .map(|(y, lo, hi)| enforce_range(buffer, y, lo, hi, drawing_color, policy))
            .sum()
    }
}
