//! Aspect ratio arithmetic

use anyhow::{Context, Result, bail};

/// Width matching `height` under the `[x, y]` ratio.
/// A zero `y` yields a non-finite value; callers ignore those.
pub fn calculate_aspect_ratio([x, y]: [f64; 2], height: u32) -> f64 {
    f64::from(height) * x / y
}

/// Parse `W:H` (also accepts `W/H` and `WxH`)
pub fn parse_ratio(input: &str) -> Result<[f64; 2]> {
    let (x, y) = input
        .split_once([':', '/', 'x'])
        .with_context(|| format!("Invalid aspect ratio {:?}, expected W:H", input))?;

    let x: f64 = x.trim().parse().with_context(|| format!("Invalid ratio width {:?}", x))?;
    let y: f64 = y.trim().parse().with_context(|| format!("Invalid ratio height {:?}", y))?;

    if x < 0.0 || y < 0.0 {
        bail!("Aspect ratio components must be non-negative: {}", input);
    }
    Ok([x, y])
}
