use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::{indicator::Indicator, state::CardState},
    util::colors,
};

pub struct CardWidget<'a> {
    card: &'a CardState,
    indicator: Indicator,
    hovered: bool,
    selected: bool,
}

impl<'a> CardWidget<'a> {
    pub fn new(card: &'a CardState, indicator: Indicator) -> Self {
        Self {
            card,
            indicator,
            hovered: false,
            selected: false,
        }
    }

    pub fn hovered(mut self, hovered: bool) -> Self {
        self.hovered = hovered;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.width() + 1 >= width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

impl Widget for CardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let border_color = if self.indicator.active {
            colors::PRIMARY
        } else if self.hovered {
            colors::ACCENT
        } else if self.selected {
            colors::SECONDARY
        } else {
            colors::NEUTRAL
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::new().fg(border_color))
            .style(Style::new().bg(colors::BACKGROUND));
        let inner = block.inner(area);
        block.render(area, buf);

        let title_style = if self.indicator.active {
            Style::new().fg(colors::PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::new().fg(colors::TEXT)
        };
        let title = truncate(&self.card.item_id, inner.width as usize);

        let pulse = Span::raw(format!("{} playing", self.indicator.glyph))
            .fg(colors::with_opacity(colors::PRIMARY, self.indicator.opacity));

        let lines = vec![
            Line::from(Span::styled(title, title_style)),
            Line::default(),
            if self.indicator.active {
                Line::from(pulse)
            } else {
                Line::default()
            },
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_ids_are_cut_to_width() {
        assert_eq!(truncate("cats", 10), "cats");
        let cut = truncate("the-phantom-of-the-opera", 10);
        assert!(cut.width() <= 10);
        assert!(cut.ends_with('…'));
    }
}
