use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::util::colors;

pub struct MuteControl {
    muted: bool,
}

impl MuteControl {
    pub fn new(muted: bool) -> Self {
        Self { muted }
    }
}

impl Widget for MuteControl {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, color) = if self.muted {
            ("󰝟 muted  m", colors::NEUTRAL)
        } else {
            ("󰕾 sound  m", colors::PRIMARY)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::new().fg(color));

        Paragraph::new(Line::from(label.fg(color)))
            .block(block)
            .centered()
            .render(area, buf);
    }
}
