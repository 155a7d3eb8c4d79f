//! Preview settings: the record, its controller and ratio helpers

pub mod aspect;
mod controller;
mod preview;

pub use controller::{SettingsController, Surface, TrackedField, Watcher};
pub use preview::PreviewSettings;
