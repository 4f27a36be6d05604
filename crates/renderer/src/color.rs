//! Color ramps for wind trail rendering.

/// Speed at which the ramp starts (white-yellow).
pub const RAMP_MIN_SPEED: f64 = 0.0;

/// Speed at which the ramp passes through pure yellow.
pub const RAMP_MID_SPEED: f64 = 10.0;

/// Speed at and above which trails are pure red.
pub const RAMP_MAX_SPEED: f64 = 20.0;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// CSS notation, e.g. `rgb(255, 255, 0)`. Alpha is omitted.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate between two colors, rounding each channel.
fn interpolate_color(from: Color, to: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color::new(
        lerp(from.r as f64, to.r as f64, t).round() as u8,
        lerp(from.g as f64, to.g as f64, t).round() as u8,
        lerp(from.b as f64, to.b as f64, t).round() as u8,
        lerp(from.a as f64, to.a as f64, t).round() as u8,
    )
}

/// Trail color for a wind speed in m/s.
///
/// Scale:
/// - 0 m/s: white
/// - 10 m/s: yellow
/// - 20+ m/s: red
///
/// Speeds are clamped to [0, 20]; NaN maps to the calm end of the ramp.
pub fn speed_color(speed_ms: f64) -> Color {
    let white = Color::rgb(255, 255, 255);
    let yellow = Color::rgb(255, 255, 0);
    let red = Color::rgb(255, 0, 0);

    let speed = if speed_ms.is_nan() {
        RAMP_MIN_SPEED
    } else {
        speed_ms.clamp(RAMP_MIN_SPEED, RAMP_MAX_SPEED)
    };

    if speed <= RAMP_MID_SPEED {
        let t = (speed - RAMP_MIN_SPEED) / (RAMP_MID_SPEED - RAMP_MIN_SPEED);
        interpolate_color(white, yellow, t)
    } else {
        let t = (speed - RAMP_MID_SPEED) / (RAMP_MAX_SPEED - RAMP_MID_SPEED);
        interpolate_color(yellow, red, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_anchors() {
        assert_eq!(speed_color(0.0), Color::rgb(255, 255, 255));
        assert_eq!(speed_color(10.0), Color::rgb(255, 255, 0));
        assert_eq!(speed_color(20.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_ramp_midpoints_round() {
        // 255 * 0.5 = 127.5 rounds up
        assert_eq!(speed_color(5.0), Color::rgb(255, 255, 128));
        assert_eq!(speed_color(15.0), Color::rgb(255, 128, 0));
    }

    #[test]
    fn test_ramp_clamps() {
        assert_eq!(speed_color(-3.0), speed_color(0.0));
        assert_eq!(speed_color(64.0), speed_color(20.0));
        assert_eq!(speed_color(f64::NAN), speed_color(0.0));
    }

    #[test]
    fn test_css_format() {
        assert_eq!(Color::rgb(255, 128, 0).to_css(), "rgb(255, 128, 0)");
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }
}
