//! Preview settings record
//!
//! Serialized with camelCase keys so saved and imported documents
//! round-trip unchanged.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Rgba;
use crate::config::Preferences;
use crate::constants::preview::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub position: String,
    pub landscape: bool,

    // Visibility
    pub show_header: bool,
    pub show_title: bool,
    pub show_menu: bool,
    pub show_color_menu: bool,
    pub show_line_numbers: bool,

    pub background: String,

    // Theme
    pub theme_type: String,
    pub theme_opacity: f32,
    pub theme_name: String,
    pub theme_background: String,

    /// `[x, y]` ratio locking width to height, `null` when free
    pub aspect_ratio: Option<[f64; 2]>,

    // Window lock (from preferences)
    pub lock_window_size: bool,
    pub lock_window_padding_x: u32,
    pub lock_window_padding_y: u32,

    // Font (from preferences)
    pub font_size: u32,
    pub font_family: String,
    pub line_height: f32,

    // Padding: aggregate + sides
    pub padding: u32,
    pub padding_locked: bool,
    pub padding_top: u32,
    pub padding_bottom: u32,
    pub padding_left: u32,
    pub padding_right: u32,

    pub margin_top: i32,
    pub margin_bottom: i32,
    pub margin_left: i32,
    pub margin_right: i32,

    pub image: Option<String>,
    pub scale: f64,

    // Border: aggregate radius + corners
    pub show_border: bool,
    pub border_radius: u32,
    pub border_radius_locked: bool,
    pub border_radius_top_left: u32,
    pub border_radius_top_right: u32,
    pub border_radius_bottom_left: u32,
    pub border_radius_bottom_right: u32,
    pub border_width: u32,
    pub border_color: Rgba,

    // Shadow
    pub show_shadow: bool,
    pub shadow_x: i32,
    pub shadow_y: i32,
    pub shadow_blur: u32,
    pub shadow_spread: i32,
    pub shadow_color: Rgba,
}

impl PreviewSettings {
    /// Editor defaults, with theme/font/lock values taken from preferences
    pub fn with_preferences(preferences: &Preferences) -> Self {
        Self {
            title: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            position: "center".to_string(),
            landscape: false,

            show_header: true,
            show_title: true,
            show_menu: true,
            show_color_menu: false,
            show_line_numbers: false,

            background: DEFAULT_BACKGROUND.to_string(),

            theme_type: "light".to_string(),
            theme_opacity: 1.0,
            theme_name: preferences.preview_theme_name.clone(),
            theme_background: "#fff".to_string(),

            aspect_ratio: None,

            lock_window_size: preferences.preview_lock_to_window,
            lock_window_padding_x: preferences.preview_lock_to_window_padding_x,
            lock_window_padding_y: preferences.preview_lock_to_window_padding_y,

            font_size: preferences.preview_font_size,
            font_family: preferences.preview_font_family.clone(),
            line_height: preferences.preview_line_height,

            padding: DEFAULT_PADDING,
            padding_locked: true,
            padding_top: DEFAULT_PADDING,
            padding_bottom: DEFAULT_PADDING,
            padding_left: DEFAULT_PADDING,
            padding_right: DEFAULT_PADDING,

            margin_top: 0,
            margin_bottom: 0,
            margin_left: 0,
            margin_right: 0,

            image: None,
            scale: 1.0,

            show_border: false,
            border_radius: DEFAULT_BORDER_RADIUS,
            border_radius_locked: true,
            border_radius_top_left: DEFAULT_BORDER_RADIUS,
            border_radius_top_right: DEFAULT_BORDER_RADIUS,
            border_radius_bottom_left: DEFAULT_BORDER_RADIUS,
            border_radius_bottom_right: DEFAULT_BORDER_RADIUS,
            border_width: DEFAULT_BORDER_WIDTH,
            border_color: Rgba::black(1.0),

            show_shadow: true,
            shadow_x: 0,
            shadow_y: 10,
            shadow_blur: 10,
            shadow_spread: -5,
            shadow_color: Rgba::black(0.3),
        }
    }

    /// Overlay the keys of `overrides` on these settings. A present key
    /// wins even when `null`; a `null` document keeps everything.
    pub fn merged(&self, overrides: &Value) -> Result<Self> {
        let mut merged = serde_json::to_value(self).context("Failed to serialize settings defaults")?;
        match overrides {
            Value::Null => return Ok(self.clone()),
            Value::Object(overrides) => {
                if let Value::Object(target) = &mut merged {
                    for (key, value) in overrides {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
            other => bail!("Settings must be a JSON object, got {}", other),
        }

        serde_json::from_value(merged).context("Failed to parse settings")
    }

    pub fn paddings(&self) -> [u32; 4] {
        [self.padding_top, self.padding_right, self.padding_bottom, self.padding_left]
    }

    pub fn border_radii(&self) -> [u32; 4] {
        [
            self.border_radius_top_left,
            self.border_radius_top_right,
            self.border_radius_bottom_right,
            self.border_radius_bottom_left,
        ]
    }

    pub(crate) fn fill_paddings(&mut self) {
        let value = self.padding;
        self.padding_top = value;
        self.padding_bottom = value;
        self.padding_left = value;
        self.padding_right = value;
    }

    pub(crate) fn fill_border_radii(&mut self) {
        let value = self.border_radius;
        self.border_radius_top_left = value;
        self.border_radius_top_right = value;
        self.border_radius_bottom_left = value;
        self.border_radius_bottom_right = value;
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self::with_preferences(&Preferences::default())
    }
}
