//! Tests for the wind speed color ramp.

use renderer::{speed_color, Color};

#[test]
fn test_ramp_is_white_to_yellow_below_mid() {
    let mut last_blue = 256;
    for step in 0..=10 {
        let c = speed_color(step as f64);
        assert_eq!(c.r, 255);
        assert_eq!(c.g, 255);
        assert!((c.b as i32) < last_blue, "blue should fall with speed");
        last_blue = c.b as i32;
    }
}

#[test]
fn test_ramp_is_yellow_to_red_above_mid() {
    let mut last_green = 256;
    for step in 11..=20 {
        let c = speed_color(step as f64);
        assert_eq!(c.r, 255);
        assert_eq!(c.b, 0);
        assert!((c.g as i32) < last_green, "green should fall with speed");
        last_green = c.g as i32;
    }
}

#[test]
fn test_ramp_is_continuous_at_mid() {
    let below = speed_color(9.999);
    let above = speed_color(10.001);
    assert!((below.b as i32 - above.b as i32).abs() <= 1);
    assert!((below.g as i32 - above.g as i32).abs() <= 1);
}

#[test]
fn test_ramp_quarter_points() {
    // 2.5 m/s: blue = 255 * 0.75 = 191.25
    assert_eq!(speed_color(2.5), Color::rgb(255, 255, 191));
    // 17.5 m/s: green = 255 * 0.25 = 63.75
    assert_eq!(speed_color(17.5), Color::rgb(255, 64, 0));
}
