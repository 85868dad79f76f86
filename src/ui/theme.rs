use std::fs;
use std::path::PathBuf;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub colors: ThemeColors,
}

/// Declares the palette once: the serialized hex field, its fallback and a
/// `Color` accessor per role.
macro_rules! palette {
    ($($role:ident = $hex:literal),+ $(,)?) => {
        #[derive(Clone, Debug, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ThemeColors {
            $(pub $role: String,)+
        }

        impl Default for ThemeColors {
            fn default() -> Self {
                Self { $($role: $hex.to_string(),)+ }
            }
        }

        impl ThemeColors {
            $(
                pub fn $role(&self) -> Color {
                    Self::parse_color(&self.$role)
                }
            )+
        }
    };
}

palette! {
    bg = "#1e1e2e",
    fg = "#cdd6f4",
    muted = "#6c7086",
    accent = "#89b4fa",
    accent_dim = "#45475a",
    border = "#45475a",
    border_focused = "#89b4fa",
    header_bg = "#313244",
    header_fg = "#cdd6f4",
    card_front = "#f9e2af",
    card_back = "#a6e3a1",
    bar_filled = "#89b4fa",
    bar_empty = "#313244",
    chat_user = "#cba6f7",
    chat_assistant = "#94e2d5",
    error = "#f38ba8",
    warning = "#f9e2af",
    success = "#a6e3a1",
}

impl ThemeColors {
    /// `#rrggbb` to RGB; anything else renders as white.
    pub fn parse_color(hex: &str) -> Color {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Color::White;
        }
        match u32::from_str_radix(digits, 16) {
            Ok(rgb) => Color::from_u32(rgb),
            Err(_) => Color::White,
        }
    }
}

impl Theme {
    fn user_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wortkarten").join("themes"))
    }

    /// A user theme from the config directory wins over a bundled one of
    /// the same name.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        if let Some(path) = Self::user_dir().map(|d| d.join(&filename)) {
            if let Ok(content) = fs::read_to_string(&path) {
                match toml::from_str(&content) {
                    Ok(theme) => return Some(theme),
                    Err(e) => log::warn!("ignoring theme {}: {e}", path.display()),
                }
            }
        }

        let bundled = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(&bundled.data).ok()?;
        toml::from_str(content).ok()
    }

    /// Names of the bundled themes, sorted.
    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|file| file.strip_suffix(".toml").map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("catppuccin-mocha").unwrap_or_else(|| Self {
            name: "built-in".to_string(),
            colors: ThemeColors::default(),
        })
    }
}
