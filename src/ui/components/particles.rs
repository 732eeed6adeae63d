use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Points},
    },
};

use crate::{particles::ParticleField, util::colors};

/// Braille cells hold 2×4 dots.
pub const DOTS_PER_COLUMN: f64 = 2.0;
pub const DOTS_PER_ROW: f64 = 4.0;
const SHADES: usize = 5;

pub fn canvas_size(area: Rect) -> (f64, f64) {
    (
        area.width as f64 * DOTS_PER_COLUMN,
        area.height as f64 * DOTS_PER_ROW,
    )
}

pub struct ParticleLayer<'a> {
    field: &'a ParticleField,
}

impl<'a> ParticleLayer<'a> {
    pub fn new(field: &'a ParticleField) -> Self {
        Self { field }
    }
}

impl Widget for ParticleLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.field.size();

        // Points share one color per draw call, so bucket by alpha.
        let mut shades: Vec<Vec<(f64, f64)>> = vec![Vec::new(); SHADES];
        for p in self.field.particles() {
            let shade = ((p.alpha / 0.6) * SHADES as f64).floor() as usize;
            let bucket = &mut shades[shade.min(SHADES - 1)];
            let y = height - p.y;
            bucket.push((p.x, y));
            if p.size >= 1.5 {
                bucket.push((p.x + 1.0, y));
                bucket.push((p.x, y - 1.0));
            }
        }

        Canvas::default()
            .background_color(colors::BACKGROUND)
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for (shade, coords) in shades.iter().enumerate() {
                    if coords.is_empty() {
                        continue;
                    }
                    let opacity = (shade + 1) as f32 / SHADES as f32;
                    ctx.draw(&Points {
                        coords: &coords[..],
                        color: colors::with_opacity(Color::Rgb(255, 255, 255), opacity * 0.6),
                    });
                }
            })
            .render(area, buf);
    }
}
