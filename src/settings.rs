use std::path::{Path, PathBuf};

use crate::canvas::is_valid_color;
use crate::components::colors::ColorSelection;
use crate::components::tools::{Tool, ToolController, ToolState};
use crate::ops::clash::ClashPolicy;

/// Light or dark chrome for the host UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

/// Application settings that persist across sessions
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Theme mode (Light or Dark)
    pub theme_mode: ThemeMode,
    /// Name of the screen the user had open last (empty = welcome screen)
    pub last_screen: String,
    /// Device pixels per grid cell used by the UI adapter
    pub pixel_scale: u32,
    pub primary_color: u8,
    pub secondary_color: u8,
    /// Colour new screens are cleared to
    pub background_color: u8,
    pub default_tool: Tool,
    pub clash_policy: ClashPolicy,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::Dark,
            last_screen: String::new(),
            pixel_scale: 4,
            primary_color: 11,
            secondary_color: 0,
            background_color: 0,
            default_tool: Tool::Pencil,
            clash_policy: ClashPolicy::DrawingColor,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/screen2fe/screen2fe_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\Screen2FE\screen2fe_settings.cfg
    /// On macOS:   ~/Library/Application Support/Screen2FE/screen2fe_settings.cfg
    /// Fallback:   same directory as the executable.
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("screen2fe");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("screen2fe_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            let config_dir = PathBuf::from(appdata).join("Screen2FE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("screen2fe_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("Screen2FE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("screen2fe_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("screen2fe_settings.cfg")))
        }
    }

    /// Tool and colour state a fresh session starts with.
    pub fn tool_state(&self) -> ToolState {
        ToolState {
            tool: self.default_tool,
            colors: ColorSelection::new(self.primary_color, self.secondary_color)
                .unwrap_or_default(),
        }
    }

    pub fn new_controller(&self) -> ToolController {
        ToolController::new(self.tool_state(), self.clash_policy)
    }

    /// Render as `key=value` lines.
    pub fn to_config_string(&self) -> String {
        let mode_str = match self.theme_mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        format!(
            "theme_mode={mode_str}\n\
             last_screen={}\n\
             pixel_scale={}\n\
             primary_color={}\n\
             secondary_color={}\n\
             background_color={}\n\
             default_tool={}\n\
             clash_policy={}\n",
            self.last_screen,
            self.pixel_scale,
            self.primary_color,
            self.secondary_color,
            self.background_color,
            self.default_tool.name(),
            self.clash_policy.name(),
        )
    }

    /// Parse `key=value` lines. Unknown keys and malformed values are skipped
    /// and leave the default in place.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "theme_mode" => {
                    s.theme_mode = match val {
                        "light" => ThemeMode::Light,
                        _ => ThemeMode::Dark,
                    };
                }
                "last_screen" => s.last_screen = val.to_string(),
                "pixel_scale" => {
                    if let Ok(v) = val.parse::<u32>()
                        && (1..=64).contains(&v)
                    {
                        s.pixel_scale = v;
                    }
                }
                "primary_color" | "secondary_color" | "background_color" => {
                    let Some(v) = val.parse::<u8>().ok().filter(|&c| is_valid_color(c)) else {
                        continue;
                    };
                    match key {
                        "primary_color" => s.primary_color = v,
                        "secondary_color" => s.secondary_color = v,
                        _ => s.background_color = v,
                    }
                }
                "default_tool" => {
                    if let Some(tool) = Tool::from_name(val) {
                        s.default_tool = tool;
                    }
                }
                "clash_policy" => {
                    if let Some(policy) = ClashPolicy::from_name(val) {
                        s.clash_policy = policy;
                    }
                }
                _ => {}
            }
        }
        s
    }

    /// Settings as labelled values for the session log.
    pub fn log_entries(&self) -> Vec<(&'static str, String)> {
        let path = Self::settings_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        vec![
            ("settings file", path),
            ("clash policy", self.clash_policy.name().to_string()),
            ("default tool", self.default_tool.name().to_string()),
            (
                "colours",
                format!(
                    "primary {} / secondary {} / background {}",
                    self.primary_color, self.secondary_color, self.background_color
                ),
            ),
            ("pixel scale", self.pixel_scale.to_string()),
        ]
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            log_warn!("Failed to save settings to {}: {}", path.display(), e);
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_config_string())
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_config_str(&content),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trip() {
        let settings = AppSettings {
            theme_mode: ThemeMode::Light,
            last_screen: "editor_screen2".to_string(),
            pixel_scale: 3,
            primary_color: 9,
            secondary_color: 1,
            background_color: 4,
            default_tool: Tool::CircleFilled,
            clash_policy: ClashPolicy::Dominant,
        };
        let parsed = AppSettings::from_config_str(&settings.to_config_string());
        assert_eq!(parsed, settings);
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        let parsed = AppSettings::from_config_str(
            "primary_color=42\n\
             pixel_scale=0\n\
             default_tool=airbrush\n\
             garbage line\n\
             secondary_color=7\n",
        );
        assert_eq!(parsed.primary_color, 11);
        assert_eq!(parsed.pixel_scale, 4);
        assert_eq!(parsed.default_tool, Tool::Pencil);
        assert_eq!(parsed.secondary_color, 7);
    }

    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!("screen2fe-{}.cfg", uuid::Uuid::new_v4()));
        let settings = AppSettings {
            last_screen: "welcome".to_string(),
            ..AppSettings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
        let _ = std::fs::remove_file(&path);

        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn log_entries_name_the_policy() {
        let settings = AppSettings {
            clash_policy: ClashPolicy::Dominant,
            ..AppSettings::default()
        };
        let entries = settings.log_entries();
        assert_eq!(entries[0].0, "settings file");
        assert!(entries.contains(&("clash policy", ClashPolicy::Dominant.name().to_string())));
        assert!(entries.contains(&("default tool", "pencil".to_string())));
    }

    #[test]
    fn controller_starts_from_settings() {
        let settings = AppSettings {
            default_tool: Tool::Line,
            primary_color: 3,
            ..AppSettings::default()
        };
        let controller = settings.new_controller();
        assert_eq!(controller.tool(), Tool::Line);
        assert_eq!(controller.colors().primary(), 3);
    }
}
