//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::column::Column;
use crate::fields::Priority;

/// Column title text.
pub const SLATE: Color = Color::Rgb(66, 82, 110);
/// Priority strips.
pub const PRIORITY_HIGH: Color = Color::Rgb(255, 82, 82);
pub const PRIORITY_MEDIUM: Color = Color::Rgb(255, 171, 0);
pub const PRIORITY_LOW: Color = Color::Rgb(76, 175, 80);
/// Selected card and focused borders.
pub const ACCENT: Color = Color::Rgb(0, 121, 191);

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => PRIORITY_HIGH,
        Priority::Medium => PRIORITY_MEDIUM,
        Priority::Low => PRIORITY_LOW,
    }
}

/// Background of a column header, from its palette slot.
pub fn column_color(column: &Column) -> Color {
    hex_to_color(column.color_hex())
}

/// Same hue at 80% brightness, used for the column marker dot and borders.
pub fn darken(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(scale(r), scale(g), scale(b)),
        other => other,
    }
}

fn scale(c: u8) -> u8 {
    (f32::from(c) * 0.8) as u8
}

/// Parse `rrggbb`; anything else maps to gray.
pub fn hex_to_color(hex: &str) -> Color {
    let channel = |i: usize| hex.get(i..i + 2).and_then(|s| u8::from_str_radix(s, 16).ok());
    match (hex.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color("fff0f0"), Color::Rgb(255, 240, 240));
        assert_eq!(hex_to_color("zzz"), Color::Gray);
    }

    #[test]
    fn test_darken() {
        assert_eq!(darken(Color::Rgb(100, 200, 50)), Color::Rgb(80, 160, 40));
        assert_eq!(darken(Color::Gray), Color::Gray);
    }
}
