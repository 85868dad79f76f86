use chrono::Local;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::model::FlashcardSet;
use crate::ui::theme::Theme;

/// Saved sets, newest first. The armed row carries the delete prompt.
pub struct HistoryList<'a> {
    sets: &'a [FlashcardSet],
    selected: usize,
    armed: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> HistoryList<'a> {
    pub fn new(
        sets: &'a [FlashcardSet],
        selected: usize,
        armed: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            sets,
            selected,
            armed,
            theme,
        }
    }
}

impl Widget for HistoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("history.title")))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.sets.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("history.empty").into_owned(),
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        // Two rows per set; keep the selection on screen.
        let visible = (inner.height as usize / 2).max(1);
        let offset = (self.selected + 1).saturating_sub(visible);

        let mut lines: Vec<Line> = Vec::new();
        for (i, set) in self.sets.iter().enumerate().skip(offset).take(visible) {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let title_style = if is_selected {
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let mut title = vec![Span::styled(format!(" {indicator} {}", set.title), title_style)];
            if self.armed == Some(set.id.as_str()) {
                title.push(Span::styled(
                    format!("  {}", t!("history.confirm")),
                    Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
                ));
            }
            lines.push(Line::from(title));

            let created = set.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            lines.push(Line::from(Span::styled(
                format!("     {}  ·  {created}", t!("history.cards", count = set.card_count)),
                Style::default().fg(colors.muted()),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
