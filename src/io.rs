use image::codecs::bmp::BmpEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError, RgbaImage};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::{PixelBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::components::colors::{ColorSelection, MSX_PALETTE, nearest_palette_index};
use crate::components::tools::{PreviewShape, Tool, ToolController, ToolState};
use crate::ops::clash::{ClashPolicy, enforce_all};
use crate::project::Project;

// ============================================================================
// Output formats
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    /// Ad-hoc bitmap dump through the palette (8-bit indexed).
    Bmp,
    Png,
    /// Editor snapshot: indices plus tool/colour state.
    S2e,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Bmp => "bmp",
            SaveFormat::Png => "png",
            SaveFormat::S2e => "s2e",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "bmp" => Some(SaveFormat::Bmp),
            "png" => Some(SaveFormat::Png),
            "s2e" => Some(SaveFormat::S2e),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_name)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error type for screen file operations
#[derive(Debug)]
pub enum ScreenFileError {
    Io(std::io::Error),
    Serialize(String),
    Image(ImageError),
    InvalidFormat(String),
}

impl std::fmt::Display for ScreenFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenFileError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenFileError::Serialize(e) => write!(f, "Serialization error: {}", e),
            ScreenFileError::Image(e) => write!(f, "Image error: {}", e),
            ScreenFileError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl std::error::Error for ScreenFileError {}

impl From<std::io::Error> for ScreenFileError {
    fn from(e: std::io::Error) -> Self {
        ScreenFileError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for ScreenFileError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        ScreenFileError::Serialize(e.to_string())
    }
}

impl From<ImageError> for ScreenFileError {
    fn from(e: ImageError) -> Self {
        ScreenFileError::Image(e)
    }
}

// ============================================================================
// S2E SNAPSHOT FORMAT
// ============================================================================

/// Magic header for the snapshot format (v1)
const S2E_MAGIC_V1: &str = "S2E1";

/// V1 serializable snapshot: flat row-major indices plus editor state
#[derive(Serialize, Deserialize)]
struct ScreenFileV1 {
    magic: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    primary: u8,
    secondary: u8,
    tool: String,
}

/// Contents of a loaded snapshot.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub buffer: PixelBuffer,
    pub state: ToolState,
}

/// Save the project's screen and tool state as a .s2e snapshot
pub fn save_s2e(project: &Project, path: &Path) -> Result<(), ScreenFileError> {
    let state = project.controller.state();
    let file = ScreenFileV1 {
        magic: S2E_MAGIC_V1.to_string(),
        width: SCREEN_WIDTH as u32,
        height: SCREEN_HEIGHT as u32,
        pixels: project.buffer().as_indices().to_vec(),
        primary: state.colors.primary(),
        secondary: state.colors.secondary(),
        tool: state.tool.name().to_string(),
    };
    let writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(writer, &file)?;
    Ok(())
}

/// Load a .s2e snapshot
pub fn load_s2e(path: &Path) -> Result<Snapshot, ScreenFileError> {
    let raw = std::fs::read(path)?;
    if raw.len() < 12 {
        return Err(ScreenFileError::InvalidFormat("File too small".into()));
    }

    // bincode encodes a String as an 8-byte length prefix + UTF-8 data, so
    // bytes 8..12 hold the magic.
    let magic = std::str::from_utf8(&raw[8..12]).unwrap_or("");
    if magic != S2E_MAGIC_V1 {
        return Err(ScreenFileError::InvalidFormat(format!(
            "Unknown magic '{}'",
            magic
        )));
    }

    let file: ScreenFileV1 = bincode::deserialize(&raw)?;
    if file.width as usize != SCREEN_WIDTH || file.height as usize != SCREEN_HEIGHT {
        return Err(ScreenFileError::InvalidFormat(format!(
            "Screen size {}x{} is not {}x{}",
            file.width, file.height, SCREEN_WIDTH, SCREEN_HEIGHT
        )));
    }
    let buffer = PixelBuffer::from_indices(file.pixels).ok_or_else(|| {
        ScreenFileError::InvalidFormat("Pixel data has the wrong length or bad colour indices".into())
    })?;
    let colors = ColorSelection::new(file.primary, file.secondary).ok_or_else(|| {
        ScreenFileError::InvalidFormat(format!(
            "Colour selection {}/{} is outside the palette",
            file.primary, file.secondary
        ))
    })?;
    let tool = Tool::from_name(&file.tool).unwrap_or_default();

    let violations = buffer.violations().len();
    if violations > 0 {
        log_warn!(
            "{} holds {} colour-clash violations",
            path.display(),
            violations
        );
    }

    Ok(Snapshot {
        buffer,
        state: ToolState { tool, colors },
    })
}

// ============================================================================
// Rendering
// ============================================================================

/// RGB bytes (row-major, 3 per cell) through the palette.
pub fn to_rgb(buffer: &PixelBuffer) -> Vec<u8> {
    let mut out = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    out.par_chunks_mut(SCREEN_WIDTH * 3)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (x, &c) in buffer.row(y).iter().enumerate() {
                row_out[x * 3..x * 3 + 3].copy_from_slice(&MSX_PALETTE[c as usize]);
            }
        });
    out
}

/// RGBA frame for the presentation layer, with the drag preview (if any)
/// drawn on top. The preview is never written back to the buffer.
pub fn render_rgba(buffer: &PixelBuffer, preview: Option<&PreviewShape>) -> RgbaImage {
    let rgb = to_rgb(buffer);
    let mut rgba = RgbaImage::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
    for (px, src) in rgba.pixels_mut().zip(rgb.chunks_exact(3)) {
        px.0 = [src[0], src[1], src[2], 255];
    }
    if let Some(preview) = preview
        && let Some(&[r, g, b]) = MSX_PALETTE.get(preview.color as usize)
    {
        for (x, y) in preview.cells() {
            if buffer.try_get(x, y).is_some() {
                rgba.put_pixel(x as u32, y as u32, image::Rgba([r, g, b, 255]));
            }
        }
    }
    rgba
}

// ============================================================================
// Bitmap dump / import
// ============================================================================

/// Write the screen as a BMP (8-bit, palette-indexed) or PNG (RGB).
pub fn export_image(
    buffer: &PixelBuffer,
    path: &Path,
    format: SaveFormat,
) -> Result<(), ScreenFileError> {
    let w = SCREEN_WIDTH as u32;
    let h = SCREEN_HEIGHT as u32;
    match format {
        SaveFormat::Bmp => {
            let mut writer = BufWriter::new(File::create(path)?);
            let mut encoder = BmpEncoder::new(&mut writer);
            encoder.encode_with_palette(
                buffer.as_indices(),
                w,
                h,
                ColorType::L8,
                Some(&MSX_PALETTE[..]),
            )?;
        }
        SaveFormat::Png => {
            let writer = BufWriter::new(File::create(path)?);
            PngEncoder::new(writer).write_image(&to_rgb(buffer), w, h, ColorType::Rgb8)?;
        }
        SaveFormat::S2e => {
            return Err(ScreenFileError::InvalidFormat(
                "S2E snapshots are written with save_s2e".into(),
            ));
        }
    }
    log_info!("Exported {} ({})", path.display(), format.extension());
    Ok(())
}

/// Load a 256×192 image as a screen.
///
/// Each pixel maps to the nearest palette entry; the result is then repaired
/// with [`ClashPolicy::Dominant`] so it satisfies the colour-clash rule.
///
/// Only RGB values survive a bitmap dump. Index 1 (transparent black) shares
/// its RGB with index 0 and comes back as 0; use an `.s2e` snapshot to keep
/// the exact indices.
pub fn import_image(path: &Path) -> Result<PixelBuffer, ScreenFileError> {
    let img = image::open(path)?.to_rgb8();
    if img.width() as usize != SCREEN_WIDTH || img.height() as usize != SCREEN_HEIGHT {
        return Err(ScreenFileError::InvalidFormat(format!(
            "Image is {}x{}, expected {}x{}",
            img.width(),
            img.height(),
            SCREEN_WIDTH,
            SCREEN_HEIGHT
        )));
    }

    let indices: Vec<u8> = img
        .as_raw()
        .par_chunks_exact(3)
        .map(|p| nearest_palette_index([p[0], p[1], p[2]]))
        .collect();
    let mut buffer = PixelBuffer::from_indices(indices)
        .ok_or_else(|| ScreenFileError::InvalidFormat("Pixel count mismatch".into()))?;

    // Replacement colour is unused under the dominant policy.
    let repaired = enforce_all(&mut buffer, 0, ClashPolicy::Dominant);
    if repaired > 0 {
        log_info!(
            "Imported {}: {} cells adjusted for colour clash",
            path.display(),
            repaired
        );
    }
    Ok(buffer)
}

// ============================================================================
// Project open / save
// ============================================================================

/// Open any supported screen file as a [`Project`].
///
/// `.s2e` snapshots restore their tool/colour state into `controller`; other
/// formats are imported as images and keep `controller` as given.
pub fn open_project(path: &Path, mut controller: ToolController) -> Result<Project, ScreenFileError> {
    match SaveFormat::from_path(path) {
        Some(SaveFormat::S2e) => {
            let snapshot = load_s2e(path)?;
            controller = ToolController::new(snapshot.state, controller.policy());
            Ok(Project::from_file(path.to_path_buf(), snapshot.buffer, controller))
        }
        _ => {
            let buffer = import_image(path)?;
            Ok(Project::from_file(path.to_path_buf(), buffer, controller))
        }
    }
}

/// Save a project in `format`. Marks the project clean on success.
pub fn save_project(
    project: &mut Project,
    path: &Path,
    format: SaveFormat,
) -> Result<(), ScreenFileError> {
    match format {
        SaveFormat::S2e => save_s2e(project, path)?,
        _ => export_image(project.buffer(), path, format)?,
    }
    project.path = Some(path.to_path_buf());
    project.update_name_from_path();
    project.mark_clean();
    Ok(())
}
