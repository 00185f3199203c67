//! Screen2FE: a bitmap editor core for the MSX SCREEN 2 video mode.
//!
//! 256×192 pixels, 16 palette colours, and at most two colours in every
//! aligned 8-pixel segment of a scanline.

#[macro_use]
pub mod logger;

pub mod canvas;
pub mod cli;
pub mod components;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;

pub use canvas::PixelBuffer;
pub use components::tools::{EditOutcome, PointerButton, Tool, ToolController};
pub use project::Project;
