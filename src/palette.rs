//! Cell colors shared by the terminal canvas and image export.

use ratatui::style::Color;

/// RGB color of a cell, or `None` for an empty cell.
///
/// Gas is a red ramp scaled by mass. Ice runs from teal (fresh) to light
/// blue (grade 5).
pub fn cell_rgb(value: i32, max_mass: i32) -> Option<[u8; 3]> {
    if value > 0 {
        let ratio = value.min(max_mass) as f32 / max_mass.max(1) as f32;
        Some([(ratio * 255.0) as u8, 0, 0])
    } else if value < 0 {
        let shade = value.max(-5) * 16;
        Some([0, (240 + shade) as u8, (175 - shade) as u8])
    } else {
        None
    }
}

/// Terminal color for a cell
pub fn cell_color(value: i32, max_mass: i32) -> Color {
    match cell_rgb(value, max_mass) {
        Some([r, g, b]) => Color::Rgb(r, g, b),
        None => Color::Reset,
    }
}
