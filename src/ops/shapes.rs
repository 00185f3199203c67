//! Cell rasterizers for the drag tools.
//!
//! Every function here is pure: it returns the ordered list of grid cells a
//! shape covers and never touches a [`PixelBuffer`]. The caller paints the
//! cells and runs the colour-clash pass afterwards. Cells may lie outside the
//! grid; `PixelBuffer::set` skips them.

use crate::canvas::{PixelBuffer, SCREEN_HEIGHT};

/// A grid cell `(x, y)`; may be off-screen.
pub type Cell = (i32, i32);

/// Available shape primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Circle,
}

/// How a shape is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeFillMode {
    Outline,
    Filled,
}

/// A shape spanned by two corner points, as produced by a drag gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub fill: ShapeFillMode,
    pub from: Cell,
    pub to: Cell,
}

impl Shape {
    pub fn new(kind: ShapeKind, fill: ShapeFillMode, from: Cell, to: Cell) -> Self {
        Self {
            kind,
            fill,
            from,
            to,
        }
    }

    /// `true` when both corners coincide.
    pub fn is_zero_extent(&self) -> bool {
        self.from == self.to
    }

    /// Geometric cells of the shape.
    ///
    /// Filled circles are not geometric: their interior comes from a span fill
    /// over the painted outline (see [`circle_span_fill`]), so this returns
    /// only the outline for them. Use [`Shape::preview_cells`] to get a
    /// buffer-independent approximation of the filled result.
    pub fn cells(&self) -> Vec<Cell> {
        let (x0, y0) = self.from;
        let (x1, y1) = self.to;
        match self.kind {
            ShapeKind::Line => line(x0, y0, x1, y1),
            ShapeKind::Rectangle => rectangle(x0, y0, x1, y1, self.fill == ShapeFillMode::Filled),
            ShapeKind::Circle => circle(x0, y0, x1, y1),
        }
    }

    /// Cells for a non-committing preview.
    pub fn preview_cells(&self) -> Vec<Cell> {
        let mut cells = self.cells();
        if self.kind == ShapeKind::Circle && self.fill == ShapeFillMode::Filled {
            cells = spans_from_outline(&cells);
        }
        cells
    }
}

// ============================================================================
// Line
// ============================================================================

/// Integer Bresenham line from `(x0, y0)` to `(x1, y1)`, both ends included.
///
/// Emits exactly `max(|dx|, |dy|) + 1` cells.
pub fn line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Cell> {
    // Widened so the deltas and `2 * err` cannot overflow at the i32 extremes.
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;
    let mut cells = Vec::with_capacity(dx.max(dy) as usize + 1);

    loop {
        // Always between the endpoints, so back in i32 range.
        cells.push((x as i32, y as i32));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    cells
}

// ============================================================================
// Rectangle
// ============================================================================

/// Axis-aligned rectangle spanned by two corners, row by row.
pub fn rectangle(x0: i32, y0: i32, x1: i32, y1: i32, filled: bool) -> Vec<Cell> {
    let (x_min, x_max) = (x0.min(x1), x0.max(x1));
    let (y_min, y_max) = (y0.min(y1), y0.max(y1));

    let mut cells = Vec::new();
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            if filled || y == y_min || y == y_max || x == x_min || x == x_max {
                cells.push((x, y));
            }
        }
    }
    cells
}

// ============================================================================
// Circle
// ============================================================================

/// Centre and radius derived from the two drag corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircleGeometry {
    pub cx: i32,
    pub cy: i32,
    pub radius: i32,
}

impl CircleGeometry {
    /// Centre is the floored midpoint of the corners; the radius is half the
    /// corner-to-corner distance, truncated.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let dx = x1 as f64 - x0 as f64;
        let dy = y1 as f64 - y0 as f64;
        // A midpoint of two i32 values always fits back into i32.
        Self {
            cx: (x0 as i64 + x1 as i64).div_euclid(2) as i32,
            cy: (y0 as i64 + y1 as i64).div_euclid(2) as i32,
            radius: ((dx * dx + dy * dy).sqrt() / 2.0) as i32,
        }
    }
}

fn push_octants(cells: &mut Vec<Cell>, cx: i32, cy: i32, x: i32, y: i32) {
    cells.extend_from_slice(&[
        (cx + x, cy + y),
        (cx - x, cy + y),
        (cx + x, cy - y),
        (cx - x, cy - y),
        (cx + y, cy + x),
        (cx - y, cy + x),
        (cx + y, cy - x),
        (cx - y, cy - x),
    ]);
}

/// Midpoint circle outline inscribed between two drag corners.
///
/// Points come out in 8-way symmetric groups per step; symmetric duplicates
/// on the axes and diagonals are kept.
pub fn circle(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Cell> {
    let CircleGeometry { cx, cy, radius } = CircleGeometry::from_corners(x0, y0, x1, y1);

    let mut cells = Vec::new();
    let mut x = 0;
    let mut y = radius;
    let mut d = 3 - 2 * radius;

    push_octants(&mut cells, cx, cy, x, y);
    while y >= x {
        x += 1;
        if d > 0 {
            y -= 1;
            d += 4 * (x - y) + 10;
        } else {
            d += 4 * x + 6;
        }
        push_octants(&mut cells, cx, cy, x, y);
    }

    cells
}

/// Second pass of a filled circle.
///
/// For each on-screen row of the circle, scans the whole scanline for the
/// leftmost and rightmost cells already holding `color` and returns every
/// cell between them. Cells of that colour outside the circle (earlier
/// drawing on the same row) widen the span too.
pub fn circle_span_fill(
    buffer: &PixelBuffer,
    geometry: CircleGeometry,
    color: u8,
) -> Vec<Cell> {
    let CircleGeometry { cy, radius, .. } = geometry;
    let row_lo = cy.saturating_sub(radius).max(0);
    let row_hi = cy.saturating_add(radius).min(SCREEN_HEIGHT as i32 - 1);

    let mut cells = Vec::new();
    for y in row_lo..=row_hi {
        let row = buffer.row(y as usize);
        let start = row.iter().position(|&c| c == color);
        let end = row.iter().rposition(|&c| c == color);
        if let (Some(start), Some(end)) = (start, end) {
            cells.extend((start as i32..=end as i32).map(|x| (x, y)));
        }
    }
    cells
}

/// Horizontal spans between the leftmost and rightmost outline cell of each
/// row, without a buffer. Used for previews.
fn spans_from_outline(outline: &[Cell]) -> Vec<Cell> {
    let mut rows: std::collections::BTreeMap<i32, (i32, i32)> = Default::default();
    for &(x, y) in outline {
        rows.entry(y)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(x);
                *hi = (*hi).max(x);
            })
            .or_insert((x, x));
    }
    rows.into_iter()
        .flat_map(|(y, (lo, hi))| (lo..=hi).map(move |x| (x, y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn horizontal_line_visits_each_cell_once() {
        let cells = line(0, 0, 7, 0);
        assert_eq!(cells, (0..8).map(|x| (x, 0)).collect::<Vec<_>>());
    }

    #[test]
    fn shallow_line_follows_error_accumulator() {
        assert_eq!(line(0, 0, 3, 2), vec![(0, 0), (1, 1), (2, 1), (3, 2)]);
    }

    #[test]
    fn line_length_is_major_axis_plus_one() {
        for &(x0, y0, x1, y1) in &[(0, 0, 2, 5), (10, 3, -4, 1), (5, 5, 5, 5), (0, 9, 9, 0)] {
            let cells = line(x0, y0, x1, y1);
            let expected = (x1 - x0).abs().max((y1 - y0).abs()) as usize + 1;
            assert_eq!(cells.len(), expected);
            assert_eq!(cells.first(), Some(&(x0, y0)));
            assert_eq!(cells.last(), Some(&(x1, y1)));
        }
    }

    #[test]
    fn rectangle_outline_and_fill() {
        let outline = rectangle(4, 4, 2, 2, false);
        assert_eq!(outline.len(), 8);
        assert!(!outline.contains(&(3, 3)));

        let filled = rectangle(2, 2, 4, 4, true);
        assert_eq!(filled.len(), 9);
        assert_eq!(filled.first(), Some(&(2, 2)));
        assert_eq!(filled.last(), Some(&(4, 4)));
    }

    #[test]
    fn circle_geometry_uses_half_distance() {
        let g = CircleGeometry::from_corners(10, 10, 14, 10);
        assert_eq!(g, CircleGeometry { cx: 12, cy: 10, radius: 2 });

        let g = CircleGeometry::from_corners(0, 0, 3, 4);
        assert_eq!((g.cx, g.cy, g.radius), (1, 2, 2));
    }

    #[test]
    fn small_circle_outline() {
        let cells: HashSet<Cell> = circle(10, 10, 14, 10).into_iter().collect();
        let expected: HashSet<Cell> = [
            (12, 12), (12, 8), (14, 10), (10, 10),
            (13, 12), (11, 12), (13, 8), (11, 8),
            (14, 11), (10, 11), (14, 9), (10, 9),
        ]
        .into_iter()
        .collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn span_fill_fills_between_painted_outline() {
        let mut buf = PixelBuffer::new();
        for (x, y) in circle(10, 10, 14, 10) {
            buf.set(x, y, 5);
        }
        let g = CircleGeometry::from_corners(10, 10, 14, 10);
        let spans: HashSet<Cell> = circle_span_fill(&buf, g, 5).into_iter().collect();

        for x in 10..=14 {
            assert!(spans.contains(&(x, 10)));
        }
        for x in 11..=13 {
            assert!(spans.contains(&(x, 12)));
            assert!(spans.contains(&(x, 8)));
        }
        assert!(!spans.contains(&(10, 12)));
        assert!(!spans.contains(&(15, 10)));
    }

    #[test]
    fn span_fill_scans_the_whole_row() {
        let mut buf = PixelBuffer::new();
        buf.set(200, 40, 4);
        for (x, y) in circle(40, 40, 60, 40) {
            buf.set(x, y, 4);
        }
        let g = CircleGeometry::from_corners(40, 40, 60, 40);
        let spans: HashSet<Cell> = circle_span_fill(&buf, g, 4).into_iter().collect();

        // Row 40 runs from the circle's left edge to the earlier cell at x=200.
        assert!(spans.contains(&(100, 40)));
        assert!(spans.contains(&(200, 40)));
        assert!(!spans.contains(&(201, 40)));
        // Other rows stay inside the outline.
        assert!(!spans.contains(&(100, 41)));
    }

    #[test]
    fn corner_math_survives_i32_extremes() {
        let g = CircleGeometry::from_corners(i32::MAX, 0, i32::MAX, 0);
        assert_eq!((g.cx, g.radius), (i32::MAX, 0));

        let g = CircleGeometry::from_corners(i32::MIN, 0, i32::MAX, 0);
        assert_eq!(g.cx, -1);
        assert!(g.radius > 0);

        assert_eq!(line(i32::MAX, i32::MIN, i32::MAX, i32::MIN), vec![(i32::MAX, i32::MIN)]);
        assert_eq!(line(i32::MAX - 1, 0, i32::MAX, 0).len(), 2);
    }

    #[test]
    fn filled_circle_preview_spans_outline_rows() {
        let shape = Shape::new(ShapeKind::Circle, ShapeFillMode::Filled, (10, 10), (14, 10));
        let cells: HashSet<Cell> = shape.preview_cells().into_iter().collect();
        assert!(cells.contains(&(12, 10)));
        assert_eq!(cells.iter().filter(|c| c.1 == 10).count(), 5);
    }
}
