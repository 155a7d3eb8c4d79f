//! User preferences consulted when building preview settings
//!
//! Read once at construction time; later preference edits only affect
//! settings built afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_theme_name")]
    pub preview_theme_name: String,
    #[serde(default)]
    pub preview_lock_to_window: bool,
    #[serde(default = "default_lock_padding")]
    pub preview_lock_to_window_padding_x: u32,
    #[serde(default = "default_lock_padding")]
    pub preview_lock_to_window_padding_y: u32,
    #[serde(default = "default_font_size")]
    pub preview_font_size: u32,
    #[serde(default = "default_font_family")]
    pub preview_font_family: String,
    #[serde(default = "default_line_height")]
    pub preview_line_height: f32,
}

fn default_theme_name() -> String {
    "github-light".to_string()
}

fn default_lock_padding() -> u32 {
    16
}

fn default_font_size() -> u32 {
    16
}

fn default_font_family() -> String {
    "Monospace".to_string()
}

fn default_line_height() -> f32 {
    1.5
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preview_theme_name: default_theme_name(),
            preview_lock_to_window: false,
            preview_lock_to_window_padding_x: default_lock_padding(),
            preview_lock_to_window_padding_y: default_lock_padding(),
            preview_font_size: default_font_size(),
            preview_font_family: default_font_family(),
            preview_line_height: default_line_height(),
        }
    }
}
