use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::{
    ui::{
        app::App,
        components::{card::CardWidget, mute::MuteControl, particles::ParticleLayer},
        indicator::indicator,
        layout::AppLayout,
    },
    util::colors,
};

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        buf.set_style(area, Style::new().bg(colors::BACKGROUND));
        let layout = AppLayout::compute(area, self.state.cards.len(), self.settings.mute_control);

        if let Some(field) = &self.particles {
            ParticleLayer::new(field).render(layout.grid, buf);
        }

        let mut header = Line::default();
        header.push_span(Span::raw(" musicards ").fg(colors::PRIMARY).bold());
        let hint = if !self.state.unlocked {
            "click or press any key to enable audio"
        } else if self.is_tap_mode() {
            "tap a card to listen"
        } else {
            "hover a card to listen"
        };
        header.push_span(Span::raw(hint).fg(colors::NEUTRAL));
        Paragraph::new(header).render(layout.header, buf);

        if self.state.cards.is_empty() {
            Paragraph::new(format!("No cards found under {}", self.source))
                .fg(colors::NEUTRAL)
                .centered()
                .render(layout.grid, buf);
        }

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        for (i, rect) in layout.cards.iter().enumerate() {
            let card = &self.state.cards[i];
            CardWidget::new(card, indicator(card.is_playing, now_ms))
                .hovered(self.state.hovered == Some(i))
                .selected(self.state.selected == i)
                .render(*rect, buf);
        }

        let footer_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::Set {
                top_left: symbols::line::ROUNDED.top_left,
                ..symbols::border::ROUNDED
            })
            .border_style(Style::new().fg(colors::NEUTRAL));
        let footer_inner = footer_block.inner(layout.footer);
        footer_block.render(layout.footer, buf);

        let playing: Vec<&str> = self
            .state
            .cards
            .iter()
            .filter(|c| c.is_playing)
            .map(|c| c.item_id.as_str())
            .collect();
        let status = if playing.is_empty() {
            "silence".to_string()
        } else {
            format!("♪ {}", playing.join(", "))
        };
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::raw(status).fg(colors::TEXT),
            Span::raw("   ←→ select · enter play · esc stop · q quit").fg(colors::NEUTRAL),
        ]))
        .render(footer_inner, buf);

        if let Some(mute) = layout.mute {
            MuteControl::new(self.state.muted).render(mute, buf);
        }
    }
}
