//! Settings controller
//!
//! Owns one `PreviewSettings` record. Every mutation goes through the
//! controller, so field watchers run synchronously after each change no
//! matter which operation made it.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use super::aspect::calculate_aspect_ratio;
use super::preview::PreviewSettings;
use crate::config::Preferences;
use crate::constants::preview::DEFAULT_BACKGROUND;

/// Rendered preview surface, measured after a render settles
pub trait Surface {
    fn actual_width(&self) -> f64;
    fn actual_height(&self) -> f64;
}

/// Fields that can carry watchers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedField {
    ShowHeader,
    Padding,
    PaddingLocked,
    BorderRadius,
    BorderRadiusLocked,
}

impl TrackedField {
    fn changed(self, before: &PreviewSettings, after: &PreviewSettings) -> bool {
        match self {
            TrackedField::ShowHeader => before.show_header != after.show_header,
            TrackedField::Padding => before.padding != after.padding,
            TrackedField::PaddingLocked => before.padding_locked != after.padding_locked,
            TrackedField::BorderRadius => before.border_radius != after.border_radius,
            TrackedField::BorderRadiusLocked => before.border_radius_locked != after.border_radius_locked,
        }
    }
}

pub type Watcher = fn(&mut PreviewSettings);

const MAX_WATCHER_PASSES: usize = 8;

fn sync_header_visibility(settings: &mut PreviewSettings) {
    let enabled = settings.show_header;
    settings.show_title = enabled;
    settings.show_menu = enabled;
    settings.show_color_menu = enabled;
}

pub struct SettingsController {
    settings: PreviewSettings,
    defaults: PreviewSettings,
    watchers: Vec<(TrackedField, Watcher)>,
    pending_measure: bool,
}

impl SettingsController {
    /// Merge `initial` over the defaults. A key present in `initial` wins
    /// even when its value is `null`.
    pub fn new(initial: Option<&Value>, preferences: &Preferences) -> Result<Self> {
        let defaults = PreviewSettings::with_preferences(preferences);
        let settings = match initial {
            None => defaults.clone(),
            Some(initial) => defaults.merged(initial).context("Invalid initial settings")?,
        };

        Ok(Self::from_settings(settings, defaults))
    }

    pub fn from_settings(settings: PreviewSettings, defaults: PreviewSettings) -> Self {
        Self {
            settings,
            defaults,
            watchers: vec![
                (TrackedField::ShowHeader, sync_header_visibility as Watcher),
                (TrackedField::Padding, PreviewSettings::fill_paddings as Watcher),
                (TrackedField::PaddingLocked, PreviewSettings::fill_paddings as Watcher),
                (TrackedField::BorderRadius, PreviewSettings::fill_border_radii as Watcher),
                (TrackedField::BorderRadiusLocked, PreviewSettings::fill_border_radii as Watcher),
            ],
            pending_measure: false,
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    pub fn defaults(&self) -> &PreviewSettings {
        &self.defaults
    }

    pub fn into_settings(self) -> PreviewSettings {
        self.settings
    }

    /// Register an additional observer on a tracked field
    pub fn watch(&mut self, field: TrackedField, watcher: Watcher) {
        self.watchers.push((field, watcher));
    }

    /// Mutate settings, then fire watchers for every tracked field that
    /// changed. Watchers that write tracked fields trigger another pass.
    pub fn update(&mut self, mutate: impl FnOnce(&mut PreviewSettings)) {
        let mut before = self.settings.clone();
        mutate(&mut self.settings);

        for pass in 0..MAX_WATCHER_PASSES {
            let fired: Vec<(TrackedField, Watcher)> = self
                .watchers
                .iter()
                .filter(|(field, _)| field.changed(&before, &self.settings))
                .copied()
                .collect();
            if fired.is_empty() {
                return;
            }

            before = self.settings.clone();
            for (field, watcher) in fired {
                debug!(field = ?field, pass, "Running settings watcher");
                watcher(&mut self.settings);
            }
        }

        if self.watchers.iter().any(|(field, _)| field.changed(&before, &self.settings)) {
            warn!(passes = MAX_WATCHER_PASSES, "Settings watchers did not settle");
        }
    }

    /// Set width; `manual` edits release the aspect ratio
    pub fn set_width(&mut self, width: f64, manual: bool) {
        self.update(|settings| {
            if let Some(width) = to_dimension(width) {
                settings.width = width;
            }

            if manual {
                settings.aspect_ratio = None;
            }
        });
    }

    /// Set height; an active aspect ratio is kept and re-applied
    pub fn set_height(&mut self, height: f64) {
        let Some(height) = to_dimension(height) else {
            return;
        };

        self.update(|settings| settings.height = height);

        if self.settings.aspect_ratio.is_some() {
            self.apply_aspect_ratio();
        }
    }

    pub fn reset_window_size(&mut self) {
        self.update(|settings| {
            settings.aspect_ratio = None;
            settings.width = 0;
            settings.height = 0;
        });

        self.update_dimensions();
    }

    pub fn set_aspect_ratio(&mut self, x: f64, y: f64) {
        self.update(|settings| settings.aspect_ratio = Some([x, y]));
        self.apply_aspect_ratio();
    }

    /// Recompute width from the active ratio and current height
    pub fn apply_aspect_ratio(&mut self) {
        if let Some(ratio) = self.settings.aspect_ratio {
            let width = calculate_aspect_ratio(ratio, self.settings.height);
            self.set_width(width, false);
        }
    }

    /// Request a re-measurement once the next render settles
    pub fn update_dimensions(&mut self) {
        self.pending_measure = true;
    }

    pub fn measurement_pending(&self) -> bool {
        self.pending_measure
    }

    /// Apply a pending measurement from the rendered surface
    pub fn on_render_settled(&mut self, surface: &impl Surface) {
        if !std::mem::take(&mut self.pending_measure) {
            return;
        }

        let scale = self.settings.scale;
        let (width, height) = (surface.actual_width() * scale, surface.actual_height() * scale);
        debug!(width, height, scale, "Applying measured surface dimensions");

        self.set_width(width, false);
        self.set_height(height);
    }

    pub fn set_default_background(&mut self) {
        self.update(|settings| settings.background = DEFAULT_BACKGROUND.to_string());
    }
}

/// Rounded pixel value, `None` for negative or non-finite input
fn to_dimension(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        debug!(value, "Ignoring invalid dimension");
        return None;
    }
    Some(value.round().min(f64::from(u32::MAX)) as u32)
}
