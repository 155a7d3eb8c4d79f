//! Color type used by border and shadow settings
//!
//! Stored as `{red, green, blue, alpha}` with 8-bit channels and a
//! fractional alpha, the shape saved documents already use.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// 0.0 (transparent) to 1.0 (opaque)
    pub alpha: f32,
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }

    pub const fn black(alpha: f32) -> Self {
        Self::new(0, 0, 0, alpha)
    }

    /// Parse `#RRGGBB` or `#AARRGGBB` (leading '#' optional)
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let byte = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

        match hex.len() {
            6 => Some(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, 1.0)),
            8 => {
                let alpha = byte(0..2)?;
                Some(Self::new(
                    byte(2..4)?,
                    byte(4..6)?,
                    byte(6..8)?,
                    f32::from(alpha) / 255.0,
                ))
            }
            _ => None,
        }
    }
}
