use ratatui::style::Color;

pub const PRIMARY: Color = Color::from_u32(0x00f7d44b);
pub const SECONDARY: Color = Color::from_u32(0x009D8400);
pub const NEUTRAL: Color = Color::from_u32(0x00404040);
pub const BACKGROUND: Color = Color::from_u32(0x000d0d0d);
pub const ACCENT: Color = Color::from_u32(0x00feca88);
pub const TEXT: Color = Color::from_u32(0x00e6e6e6);

/// Blends `color` over the background. Non-RGB colors come back unchanged.
pub fn with_opacity(color: Color, opacity: f32) -> Color {
    match (color, BACKGROUND) {
        (Color::Rgb(r, g, b), Color::Rgb(br, bg, bb)) => {
            let t = opacity.clamp(0.0, 1.0);
            let mix = |fg: u8, bg: u8| (bg as f32 + (fg as f32 - bg as f32) * t).round() as u8;
            Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
        }
        _ => color,
    }
}
