use std::path::PathBuf;
use uuid::Uuid;

use crate::canvas::PixelBuffer;
use crate::components::colors::ColorSlot;
use crate::components::tools::{EditOutcome, PointerButton, Tool, ToolController};

/// Single open screen: the buffer plus the controller that edits it.
///
/// The project is the only owner of its [`PixelBuffer`]; every edit goes
/// through the pointer methods below.
#[derive(Clone, Debug)]
pub struct Project {
    pub id: Uuid,
    buffer: PixelBuffer,
    pub controller: ToolController,
    /// `None` for unsaved/untitled screens.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,

    /// Display name (derived from path or "Untitled-X")
    pub name: String,
}

impl Project {
    /// A blank screen cleared to `background` (colour 0 if out of range).
    pub fn new_untitled(untitled_counter: usize, background: u8, controller: ToolController) -> Self {
        Self {
            id: Uuid::new_v4(),
            buffer: PixelBuffer::filled(background).unwrap_or_default(),
            controller,
            path: None,
            is_dirty: false,
            name: format!("Untitled-{}", untitled_counter),
        }
    }

    pub fn from_file(path: PathBuf, buffer: PixelBuffer, controller: ToolController) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            id: Uuid::new_v4(),
            buffer,
            controller,
            path: Some(path),
            is_dirty: false,
            name,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Replace the screen contents, e.g. after an import. Cancels any gesture.
    pub fn replace_buffer(&mut self, buffer: PixelBuffer) {
        self.controller.cancel();
        self.buffer = buffer;
        self.mark_dirty();
    }

    /// Hand the final screen back to the caller.
    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    pub fn pointer_down(&mut self, x: i32, y: i32, button: PointerButton) -> EditOutcome {
        let outcome = self.controller.pointer_down(&mut self.buffer, x, y, button);
        self.track(outcome)
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) -> EditOutcome {
        let outcome = self.controller.pointer_move(&mut self.buffer, x, y);
        self.track(outcome)
    }

    pub fn pointer_up(&mut self, x: i32, y: i32) -> EditOutcome {
        let outcome = self.controller.pointer_up(&mut self.buffer, x, y);
        self.track(outcome)
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.controller.select_tool(tool);
    }

    pub fn select_color(&mut self, slot: ColorSlot, color: u8) -> bool {
        self.controller.select_color(slot, color)
    }

    /// Visit every cell for redraw or export.
    pub fn for_each_cell<F: FnMut(usize, usize, u8)>(&self, visitor: F) {
        self.buffer.for_each_cell(visitor);
    }

    fn track(&mut self, outcome: EditOutcome) -> EditOutcome {
        if outcome.is_committed() {
            self.mark_dirty();
        }
        outcome
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    pub fn update_name_from_path(&mut self) {
        if let Some(ref path) = self.path {
            self.name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
        }
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}
