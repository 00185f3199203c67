use crate::canvas::{PALETTE_SIZE, is_valid_color};

// ============================================================================
// MSX palette
// ============================================================================

/// RGB palette: 16 fixed entries addressed by colour index.
///
/// Index 1 is the "transparent black" of the hardware; it is rendered as
/// solid black like index 0.
pub const MSX_PALETTE: [[u8; 3]; PALETTE_SIZE as usize] = [
    [0x00, 0x00, 0x00], // 0: Black
    [0x00, 0x00, 0x00], // 1: Transparent black
    [0x21, 0xC8, 0x42], // 2: Medium green
    [0x5E, 0xDC, 0x78], // 3: Light green
    [0x54, 0x54, 0xED], // 4: Dark blue
    [0x7D, 0x76, 0xFC], // 5: Light blue
    [0xC7, 0x54, 0x54], // 6: Dark red
    [0x42, 0xE8, 0xEC], // 7: Cyan
    [0xED, 0x6A, 0x54], // 8: Medium red
    [0xFF, 0x8C, 0x8C], // 9: Light red
    [0xC3, 0xC3, 0xC3], // 10: Grey
    [0xFF, 0xFF, 0xFF], // 11: White
    [0x9C, 0x68, 0xCC], // 12: Magenta
    [0xCC, 0x9C, 0x9C], // 13: Salmon
    [0x3A, 0xDC, 0x3A], // 14: Lime green
    [0xCC, 0xCC, 0x3A], // 15: Yellow
];

const COLOR_NAMES: [&str; PALETTE_SIZE as usize] = [
    "black",
    "transparent",
    "medium_green",
    "light_green",
    "dark_blue",
    "light_blue",
    "dark_red",
    "cyan",
    "medium_red",
    "light_red",
    "grey",
    "white",
    "magenta",
    "salmon",
    "lime",
    "yellow",
];

/// RGB triple for a palette index, or `None` outside the palette.
pub fn palette_rgb(index: u8) -> Option<[u8; 3]> {
    MSX_PALETTE.get(index as usize).copied()
}

/// Stable lowercase name of a palette entry.
pub fn color_name(index: u8) -> Option<&'static str> {
    COLOR_NAMES.get(index as usize).copied()
}

/// Parse a colour given as a decimal index (`"11"`) or a palette name (`"white"`).
pub fn parse_color(s: &str) -> Option<u8> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u8>() {
        return is_valid_color(n).then_some(n);
    }
    let lower = s.to_lowercase().replace([' ', '-'], "_");
    COLOR_NAMES
        .iter()
        .position(|name| *name == lower)
        .map(|i| i as u8)
}

/// Closest palette entry to an RGB value (squared distance, lowest index on ties).
pub fn nearest_palette_index(rgb: [u8; 3]) -> u8 {
    let mut best = 0u8;
    let mut best_dist = u32::MAX;
    for (i, entry) in MSX_PALETTE.iter().enumerate() {
        let dist: u32 = entry
            .iter()
            .zip(rgb.iter())
            .map(|(&a, &b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = i as u8;
        }
    }
    best
}

// ============================================================================
// Primary / secondary selection
// ============================================================================

/// Which of the two user-selected colours an action refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSlot {
    Primary,
    Secondary,
}

impl ColorSlot {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "primary" | "p" | "left" => Some(ColorSlot::Primary),
            "secondary" | "s" | "right" => Some(ColorSlot::Secondary),
            _ => None,
        }
    }
}

/// The two independently selected drawing colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSelection {
    primary: u8,
    secondary: u8,
}

impl Default for ColorSelection {
    /// White on black.
    fn default() -> Self {
        Self {
            primary: 11,
            secondary: 0,
        }
    }
}

impl ColorSelection {
    /// Returns `None` if either index is outside the palette.
    pub fn new(primary: u8, secondary: u8) -> Option<Self> {
        (is_valid_color(primary) && is_valid_color(secondary)).then_some(Self {
            primary,
            secondary,
        })
    }

    pub fn primary(&self) -> u8 {
        self.primary
    }

    pub fn secondary(&self) -> u8 {
        self.secondary
    }

    pub fn get(&self, slot: ColorSlot) -> u8 {
        match slot {
            ColorSlot::Primary => self.primary,
            ColorSlot::Secondary => self.secondary,
        }
    }

    /// Store `color` in `slot`. An invalid index is rejected and the previous
    /// selection kept.
    pub fn select(&mut self, slot: ColorSlot, color: u8) -> bool {
        if !is_valid_color(color) {
            return false;
        }
        match slot {
            ColorSlot::Primary => self.primary = color,
            ColorSlot::Secondary => self.secondary = color,
        }
        true
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.primary, &mut self.secondary);
    }
}
