use crate::canvas::{PixelBuffer, SCREEN_HEIGHT, SCREEN_WIDTH, in_bounds};
use crate::components::colors::{ColorSelection, ColorSlot};
use crate::ops::clash::{ClashPolicy, TouchedRows};
use crate::ops::fill::flood_fill;
use crate::ops::shapes::{
    Cell, CircleGeometry, Shape, ShapeFillMode, ShapeKind, circle_span_fill, line,
};

/// Pins a drag coordinate to one screen's width/height beyond each edge.
///
/// Drags may leave the grid (shapes are clipped when painted) but never by
/// more than this, which keeps every rasterized shape small.
pub fn clamp_drag(x: i32, y: i32) -> Cell {
    let (w, h) = (SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32);
    (x.clamp(-w, 2 * w - 1), y.clamp(-h, 2 * h - 1))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Pencil,
    Line,
    RectangleOutline,
    RectangleFilled,
    CircleOutline,
    CircleFilled,
    FloodFill,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Pencil,
            Tool::Line,
            Tool::RectangleOutline,
            Tool::RectangleFilled,
            Tool::CircleOutline,
            Tool::CircleFilled,
            Tool::FloodFill,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Line => "Line",
            Tool::RectangleOutline => "Rectangle",
            Tool::RectangleFilled => "Filled Rectangle",
            Tool::CircleOutline => "Circle",
            Tool::CircleFilled => "Filled Circle",
            Tool::FloodFill => "Fill",
        }
    }

    /// Stable identifier used by settings, scripts and the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Line => "line",
            Tool::RectangleOutline => "rect",
            Tool::RectangleFilled => "rect_fill",
            Tool::CircleOutline => "circle",
            Tool::CircleFilled => "circle_fill",
            Tool::FloodFill => "fill",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        match name.trim().to_lowercase().as_str() {
            "pencil" => Some(Tool::Pencil),
            "line" => Some(Tool::Line),
            "rect" | "rect_empty" | "rectangle" => Some(Tool::RectangleOutline),
            "rect_fill" | "filled_rectangle" => Some(Tool::RectangleFilled),
            "circle" | "circle_empty" => Some(Tool::CircleOutline),
            "circle_fill" | "filled_circle" => Some(Tool::CircleFilled),
            "fill" | "fill_area" | "flood_fill" => Some(Tool::FloodFill),
            _ => None,
        }
    }

    /// The shape a drag with this tool produces, if it is a drag tool.
    pub fn shape(&self) -> Option<(ShapeKind, ShapeFillMode)> {
        match self {
            Tool::Line => Some((ShapeKind::Line, ShapeFillMode::Outline)),
            Tool::RectangleOutline => Some((ShapeKind::Rectangle, ShapeFillMode::Outline)),
            Tool::RectangleFilled => Some((ShapeKind::Rectangle, ShapeFillMode::Filled)),
            Tool::CircleOutline => Some((ShapeKind::Circle, ShapeFillMode::Outline)),
            Tool::CircleFilled => Some((ShapeKind::Circle, ShapeFillMode::Filled)),
            Tool::Pencil | Tool::FloodFill => None,
        }
    }
}

/// Pointer button; selects which colour slot a gesture draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
}

impl PointerButton {
    pub fn slot(&self) -> ColorSlot {
        match self {
            PointerButton::Primary => ColorSlot::Primary,
            PointerButton::Secondary => ColorSlot::Secondary,
        }
    }
}

/// Current tool and colour selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolState {
    pub tool: Tool,
    pub colors: ColorSelection,
}

/// Transient state of one pointer gesture, from pointer-down to pointer-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeSession {
    pub tool: Tool,
    pub button: PointerButton,
    /// Colour resolved from the button when the gesture started.
    pub color: u8,
    pub anchor: Cell,
    pub last: Cell,
}

/// Ephemeral outline shown while a drag tool is held. Never painted into the
/// buffer; the commit on pointer-up rasterizes the shape afresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewShape {
    pub tool: Tool,
    pub anchor: Cell,
    pub current: Cell,
    pub color: u8,
}

impl PreviewShape {
    fn shape(&self) -> Option<Shape> {
        self.tool
            .shape()
            .map(|(kind, fill)| Shape::new(kind, fill, self.anchor, self.current))
    }

    /// Cells to draw for the preview overlay.
    pub fn cells(&self) -> Vec<Cell> {
        self.shape().map(|s| s.preview_cells()).unwrap_or_default()
    }
}

/// Counts for one committed edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditStats {
    /// On-screen cell writes by the tool. A cell written twice in one edit
    /// (circle octant overlaps, span fill over the outline) counts twice.
    pub painted: usize,
    /// Cells rewritten by the colour-clash pass.
    pub repaired: usize,
    /// Rows the clash pass ran over.
    pub rows: usize,
}

/// What a pointer event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing happened: no session, off-screen press, or a no-op request.
    Ignored,
    /// A drag session was opened; the buffer is untouched.
    Started,
    /// The drag preview moved; the buffer is untouched.
    Previewed,
    /// The buffer was edited and repaired.
    Committed(EditStats),
}

impl EditOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, EditOutcome::Committed(_))
    }

    pub fn stats(&self) -> Option<EditStats> {
        match self {
            EditOutcome::Committed(stats) => Some(*stats),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Dragging(StrokeSession),
}

/// Turns pointer events into edits of a [`PixelBuffer`].
///
/// Each event runs to completion, colour-clash pass included, before it
/// returns. Events never fail; the worst case is [`EditOutcome::Ignored`].
#[derive(Clone, Debug, Default)]
pub struct ToolController {
    state: ToolState,
    phase: Phase,
    preview: Option<PreviewShape>,
    policy: ClashPolicy,
}

impl ToolController {
    pub fn new(state: ToolState, policy: ClashPolicy) -> Self {
        Self {
            state,
            phase: Phase::Idle,
            preview: None,
            policy,
        }
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn tool(&self) -> Tool {
        self.state.tool
    }

    pub fn colors(&self) -> &ColorSelection {
        &self.state.colors
    }

    pub fn policy(&self) -> ClashPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ClashPolicy) {
        self.policy = policy;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    pub fn session(&self) -> Option<&StrokeSession> {
        match &self.phase {
            Phase::Dragging(session) => Some(session),
            Phase::Idle => None,
        }
    }

    pub fn preview(&self) -> Option<&PreviewShape> {
        self.preview.as_ref()
    }

    /// Switch tools. Any gesture in progress is abandoned without committing.
    pub fn select_tool(&mut self, tool: Tool) {
        self.cancel();
        self.state.tool = tool;
    }

    /// Set a colour slot; an invalid index is rejected. The colour of a
    /// gesture already in progress is not affected.
    pub fn select_color(&mut self, slot: ColorSlot, color: u8) -> bool {
        self.state.colors.select(slot, color)
    }

    /// Drop the current gesture and its preview.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.preview = None;
    }

    // ------------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------------

    pub fn pointer_down(
        &mut self,
        buffer: &mut PixelBuffer,
        x: i32,
        y: i32,
        button: PointerButton,
    ) -> EditOutcome {
        // A press without a matching release ends the stale gesture first.
        self.cancel();

        if !in_bounds(x, y) {
            return EditOutcome::Ignored;
        }

        let tool = self.state.tool;
        let color = self.state.colors.get(button.slot());

        match tool {
            Tool::FloodFill => self.commit_fill(buffer, x, y, color),
            Tool::Pencil => {
                self.phase = Phase::Dragging(StrokeSession {
                    tool,
                    button,
                    color,
                    anchor: (x, y),
                    last: (x, y),
                });
                self.commit_cells(buffer, &[(x, y)], color)
            }
            Tool::Line
            | Tool::RectangleOutline
            | Tool::RectangleFilled
            | Tool::CircleOutline
            | Tool::CircleFilled => {
                self.phase = Phase::Dragging(StrokeSession {
                    tool,
                    button,
                    color,
                    anchor: (x, y),
                    last: (x, y),
                });
                self.preview = Some(PreviewShape {
                    tool,
                    anchor: (x, y),
                    current: (x, y),
                    color,
                });
                EditOutcome::Started
            }
        }
    }

    pub fn pointer_move(&mut self, buffer: &mut PixelBuffer, x: i32, y: i32) -> EditOutcome {
        let Phase::Dragging(mut session) = self.phase else {
            return EditOutcome::Ignored;
        };
        let (x, y) = clamp_drag(x, y);
        if session.last == (x, y) {
            return EditOutcome::Ignored;
        }

        let (lx, ly) = session.last;
        session.last = (x, y);
        self.phase = Phase::Dragging(session);

        match session.tool {
            Tool::Pencil => self.commit_cells(buffer, &line(lx, ly, x, y), session.color),
            _ => {
                self.preview = Some(PreviewShape {
                    tool: session.tool,
                    anchor: session.anchor,
                    current: (x, y),
                    color: session.color,
                });
                EditOutcome::Previewed
            }
        }
    }

    pub fn pointer_up(&mut self, buffer: &mut PixelBuffer, x: i32, y: i32) -> EditOutcome {
        let Phase::Dragging(session) = self.phase else {
            return EditOutcome::Ignored;
        };
        self.cancel();
        let (x, y) = clamp_drag(x, y);

        if session.tool == Tool::Pencil {
            if session.last == (x, y) {
                return EditOutcome::Ignored;
            }
            let (lx, ly) = session.last;
            return self.commit_cells(buffer, &line(lx, ly, x, y), session.color);
        }

        let Some((kind, fill)) = session.tool.shape() else {
            return EditOutcome::Ignored;
        };
        let shape = Shape::new(kind, fill, session.anchor, (x, y));
        if shape.is_zero_extent() {
            return EditOutcome::Ignored;
        }
        self.commit_shape(buffer, &shape, session.color)
    }

    // ------------------------------------------------------------------------
    // Commit paths
    // ------------------------------------------------------------------------

    fn paint(buffer: &mut PixelBuffer, cells: &[Cell], color: u8, touched: &mut TouchedRows) -> usize {
        let mut painted = 0;
        for &(x, y) in cells {
            if buffer.set(x, y, color) {
                touched.record(x, y);
                painted += 1;
            }
        }
        painted
    }

    fn finish(&self, buffer: &mut PixelBuffer, touched: &TouchedRows, painted: usize, color: u8) -> EditOutcome {
        if painted == 0 {
            return EditOutcome::Ignored;
        }
        let repaired = touched.enforce(buffer, color, self.policy);
        EditOutcome::Committed(EditStats {
            painted,
            repaired,
            rows: touched.len(),
        })
    }

    fn commit_cells(&self, buffer: &mut PixelBuffer, cells: &[Cell], color: u8) -> EditOutcome {
        let mut touched = TouchedRows::new();
        let painted = Self::paint(buffer, cells, color, &mut touched);
        self.finish(buffer, &touched, painted, color)
    }

    fn commit_shape(&self, buffer: &mut PixelBuffer, shape: &Shape, color: u8) -> EditOutcome {
        let mut touched = TouchedRows::new();
        let mut painted = Self::paint(buffer, &shape.cells(), color, &mut touched);

        if shape.kind == ShapeKind::Circle && shape.fill == ShapeFillMode::Filled {
            let (x0, y0) = shape.from;
            let (x1, y1) = shape.to;
            let geometry = CircleGeometry::from_corners(x0, y0, x1, y1);
            let spans = circle_span_fill(buffer, geometry, color);
            painted += Self::paint(buffer, &spans, color, &mut touched);
        }

        self.finish(buffer, &touched, painted, color)
    }

    fn commit_fill(&self, buffer: &mut PixelBuffer, x: i32, y: i32, color: u8) -> EditOutcome {
        let outcome = flood_fill(buffer, x, y, color);
        if outcome.is_noop() {
            return EditOutcome::Ignored;
        }
        let mut touched = TouchedRows::new();
        for &row in &outcome.rows {
            touched.record_row(row);
        }
        self.finish(buffer, &touched, outcome.painted, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::ops::shapes::circle;

    fn controller(tool: Tool) -> ToolController {
        let mut c = ToolController::default();
        c.select_tool(tool);
        c
    }

    #[test]
    fn tool_names_round_trip() {
        for &tool in Tool::all() {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("spray"), None);
    }

    #[test]
    fn pencil_click_paints_and_opens_stroke() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Pencil);
        let out = c.pointer_down(&mut buf, 3, 4, PointerButton::Primary);
        assert_eq!(out.stats().map(|s| s.painted), Some(1));
        assert_eq!(buf.get(3, 4), 11);
        assert!(c.is_dragging());

        assert_eq!(c.pointer_up(&mut buf, 3, 4), EditOutcome::Ignored);
        assert!(!c.is_dragging());
    }

    #[test]
    fn pencil_drag_connects_cells_without_gaps() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Pencil);
        c.pointer_down(&mut buf, 0, 0, PointerButton::Primary);
        let out = c.pointer_move(&mut buf, 6, 0);
        assert_eq!(out.stats().map(|s| s.painted), Some(7));
        assert_eq!(c.pointer_move(&mut buf, 6, 0), EditOutcome::Ignored);
        c.pointer_up(&mut buf, 6, 3);

        for x in 0..=6 {
            assert_eq!(buf.get(x, 0), 11);
        }
        for y in 1..=3 {
            assert_eq!(buf.get(6, y), 11);
        }
        assert_eq!(c.session(), None);
    }

    #[test]
    fn secondary_button_draws_with_secondary_color() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Pencil);
        assert!(c.select_color(ColorSlot::Secondary, 6));
        c.pointer_down(&mut buf, 9, 9, PointerButton::Secondary);
        assert_eq!(buf.get(9, 9), 6);
    }

    #[test]
    fn drag_preview_never_touches_buffer() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::RectangleFilled);
        assert_eq!(c.pointer_down(&mut buf, 10, 10, PointerButton::Primary), EditOutcome::Started);
        assert_eq!(c.pointer_move(&mut buf, 15, 12), EditOutcome::Previewed);
        assert_eq!(c.pointer_move(&mut buf, 20, 20), EditOutcome::Previewed);
        assert_eq!(buf, PixelBuffer::new());

        let preview = c.preview().copied().unwrap();
        assert_eq!(preview.current, (20, 20));
        assert_eq!(preview.cells().len(), 121);

        let out = c.pointer_up(&mut buf, 20, 20);
        assert!(out.is_committed());
        assert!(c.preview().is_none());
        assert_eq!(buf.get(15, 15), 11);
    }

    #[test]
    fn filled_rectangle_leaves_outside_untouched() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::RectangleFilled);
        c.pointer_down(&mut buf, 10, 10, PointerButton::Primary);
        c.pointer_up(&mut buf, 20, 20);

        buf.for_each_cell(|x, y, color| {
            let inside = (10..=20).contains(&x) && (10..=20).contains(&y);
            assert_eq!(color, if inside { 11 } else { 0 }, "cell ({x}, {y})");
        });
        assert!(buf.is_conformant());
    }

    #[test]
    fn zero_extent_commit_is_noop() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Line);
        c.pointer_down(&mut buf, 5, 5, PointerButton::Primary);
        assert_eq!(c.pointer_up(&mut buf, 5, 5), EditOutcome::Ignored);
        assert_eq!(buf, PixelBuffer::new());
        assert!(!c.is_dragging());
    }

    #[test]
    fn off_screen_press_is_ignored() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Line);
        assert_eq!(c.pointer_down(&mut buf, -3, 5, PointerButton::Primary), EditOutcome::Ignored);
        assert!(!c.is_dragging());
        assert_eq!(c.pointer_move(&mut buf, 1, 1), EditOutcome::Ignored);
        assert_eq!(c.pointer_up(&mut buf, 1, 1), EditOutcome::Ignored);
    }

    #[test]
    fn shapes_are_clipped_at_the_screen_edge() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Line);
        c.pointer_down(&mut buf, 250, 0, PointerButton::Primary);
        let out = c.pointer_up(&mut buf, 300, 0);
        assert_eq!(out.stats().map(|s| s.painted), Some(6));
        assert_eq!(buf.get(SCREEN_WIDTH - 1, 0), 11);
    }

    #[test]
    fn stale_gesture_is_discarded_by_new_press() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Line);
        c.pointer_down(&mut buf, 0, 0, PointerButton::Primary);
        c.pointer_move(&mut buf, 50, 0);
        // Release was lost; the next press starts over from (10, 10).
        c.pointer_down(&mut buf, 10, 10, PointerButton::Primary);
        assert_eq!(c.session().map(|s| s.anchor), Some((10, 10)));
        c.pointer_up(&mut buf, 12, 10);
        assert_eq!(buf.get(30, 0), 0);
        assert_eq!(buf.get(11, 10), 11);
    }

    #[test]
    fn tool_change_cancels_drag() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::CircleOutline);
        c.pointer_down(&mut buf, 40, 40, PointerButton::Primary);
        c.select_tool(Tool::Pencil);
        assert!(c.preview().is_none());
        assert_eq!(c.pointer_up(&mut buf, 60, 60), EditOutcome::Ignored);
        assert_eq!(buf, PixelBuffer::new());
    }

    #[test]
    fn filled_circle_spans_its_outline() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::CircleFilled);
        c.select_color(ColorSlot::Primary, 4);
        c.pointer_down(&mut buf, 40, 40, PointerButton::Primary);
        c.pointer_up(&mut buf, 60, 40);
        // Centre (50, 40), radius 10.
        for x in 40..=60 {
            assert_eq!(buf.get(x, 40), 4);
        }
        assert_eq!(buf.get(50, 30), 4);
        assert_eq!(buf.get(50, 50), 4);
        assert_eq!(buf.get(41, 31), 0);
    }

    #[test]
    fn flood_fill_blank_screen() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::FloodFill);
        c.select_color(ColorSlot::Primary, 7);
        let out = c.pointer_down(&mut buf, 128, 96, PointerButton::Primary);
        assert_eq!(out.stats().map(|s| s.rows), Some(SCREEN_HEIGHT));
        assert!(!c.is_dragging());
        assert!(buf.as_indices().iter().all(|&v| v == 7));
        assert!(buf.is_conformant());

        assert_eq!(c.pointer_down(&mut buf, 0, 0, PointerButton::Primary), EditOutcome::Ignored);
    }

    #[test]
    fn clash_pass_runs_after_commit() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Pencil);
        c.select_color(ColorSlot::Primary, 2);
        c.pointer_down(&mut buf, 0, 0, PointerButton::Primary);
        c.pointer_up(&mut buf, 0, 0);
        c.select_color(ColorSlot::Primary, 3);
        c.pointer_down(&mut buf, 0, 0, PointerButton::Primary);
        c.pointer_move(&mut buf, 1, 0);
        c.pointer_up(&mut buf, 1, 0);
        // Segment 0 is {3, 3, 0 x 6}: the earlier 2 was overwritten by the stroke.
        assert!(buf.is_conformant());

        // Now three colours: 0 (x5), 3 (x2), 5 (x1); drawing with 5 rewrites itself.
        c.select_color(ColorSlot::Primary, 5);
        let out = c.pointer_down(&mut buf, 7, 0, PointerButton::Primary);
        assert_eq!(out.stats().map(|s| s.repaired), Some(0));
        assert_eq!(buf.segment_colors(0, 0), vec![0, 3, 5]);

        // The dominant policy replaces the intruder with the majority colour.
        c.set_policy(ClashPolicy::Dominant);
        c.pointer_up(&mut buf, 7, 0);
        let out = c.pointer_down(&mut buf, 6, 0, PointerButton::Primary);
        assert!(out.stats().map(|s| s.repaired).unwrap_or(0) >= 1);
        assert!(buf.is_conformant());
    }

    #[test]
    fn extreme_release_points_are_clamped() {
        let cases = [
            (Tool::Line, (10, 10), (i32::MIN, 10)),
            (Tool::Line, (10, 10), (i32::MAX, i32::MIN)),
            (Tool::CircleOutline, (10, 10), (i32::MAX, 10)),
            (Tool::CircleFilled, (100, 100), (i32::MIN, i32::MAX)),
            (Tool::RectangleFilled, (0, 0), (i32::MAX, i32::MAX)),
            (Tool::RectangleOutline, (0, 0), (20_000, 20_000)),
        ];
        for (tool, (ax, ay), (x, y)) in cases {
            let mut buf = PixelBuffer::new();
            let mut c = controller(tool);
            c.pointer_down(&mut buf, ax, ay, PointerButton::Primary);
            assert_eq!(c.pointer_move(&mut buf, x, y), EditOutcome::Previewed);
            let preview = c.preview().map(|p| p.current);
            assert_eq!(preview, Some(clamp_drag(x, y)), "{:?}", tool);
            assert!(c.pointer_up(&mut buf, x, y).is_committed(), "{:?}", tool);
        }

        // A filled rectangle released far away covers the grid from its anchor.
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::RectangleFilled);
        c.pointer_down(&mut buf, 0, 0, PointerButton::Primary);
        c.pointer_up(&mut buf, i32::MAX, i32::MAX);
        assert!(buf.as_indices().iter().all(|&v| v == 11));
    }

    #[test]
    fn pencil_stroke_far_off_grid_stays_bounded() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::Pencil);
        c.pointer_down(&mut buf, 5, 5, PointerButton::Primary);
        c.pointer_move(&mut buf, i32::MIN, 5);
        assert_eq!(c.session().map(|s| s.last), Some((-(SCREEN_WIDTH as i32), 5)));
        for x in 0..=5 {
            assert_eq!(buf.get(x, 5), 11);
        }
    }

    #[test]
    fn painted_counts_every_write() {
        let mut buf = PixelBuffer::new();
        let mut c = controller(Tool::CircleOutline);
        c.pointer_down(&mut buf, 10, 10, PointerButton::Primary);
        let stats = c.pointer_up(&mut buf, 14, 10).stats().unwrap();
        // Twelve distinct cells, some hit by more than one octant.
        assert_eq!(stats.painted, circle(10, 10, 14, 10).len());
        assert!(stats.painted > 12);
        assert_eq!(buf.as_indices().iter().filter(|&&v| v == 11).count(), 12);
    }
}
