use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::model::card::paragraphs;
use crate::session::StudyDeck;
use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

/// The current card of a deck, front or back, with its position.
pub struct CardView<'a> {
    deck: &'a StudyDeck,
    known: Option<bool>,
    theme: &'a Theme,
}

impl<'a> CardView<'a> {
    pub fn new(deck: &'a StudyDeck, theme: &'a Theme) -> Self {
        Self {
            deck,
            known: None,
            theme,
        }
    }

    /// Show a known/unknown badge (category decks only).
    pub fn known(mut self, known: bool) -> Self {
        self.known = Some(known);
        self
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let card = self.deck.current();
        let flipped = self.deck.is_flipped();

        let (side, text, text_color) = if flipped {
            (t!("study.back"), card.back.as_str(), colors.card_back())
        } else {
            (t!("study.front"), card.front.as_str(), colors.card_front())
        };

        let border = if self.deck.is_animating() {
            colors.accent_dim()
        } else {
            colors.border_focused()
        };

        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(Span::styled(
                format!(" {} / {} ", self.deck.index() + 1, self.deck.len()),
                Style::default().fg(colors.accent()),
            ))
            .title_bottom(
                Line::from(Span::styled(
                    format!(" {side} "),
                    Style::default().fg(colors.muted()),
                ))
                .alignment(Alignment::Right),
            );
        if let Some(known) = self.known {
            let (label, color) = if known {
                (t!("cards.known"), colors.success())
            } else {
                (t!("cards.unknown"), colors.warning())
            };
            block = block.title(
                Line::from(Span::styled(format!(" {label} "), Style::default().fg(color)))
                    .alignment(Alignment::Right),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // First paragraph is the headword; the rest are translation and example.
        let mut lines: Vec<Line> = Vec::new();
        for (i, para) in paragraphs(text).into_iter().enumerate() {
            let style = if i == 0 {
                Style::default().fg(text_color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(para.to_string(), style)));
        }

        let width = inner.width.saturating_sub(4) as usize;
        let height: usize = lines
            .iter()
            .map(|l| wrapped_line_count(&l.to_string(), width).max(1))
            .sum();
        let top_pad = (inner.height as usize).saturating_sub(height) / 2;
        let body = Rect::new(
            inner.x + 2,
            inner.y + top_pad as u16,
            inner.width.saturating_sub(4),
            inner.height.saturating_sub(top_pad as u16),
        );

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(body, buf);
    }
}
