use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::model::{Category, ProgressMap};
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

pub struct CategoryMenu<'a> {
    categories: &'a [Category],
    progress: &'a ProgressMap,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> CategoryMenu<'a> {
    pub fn new(
        categories: &'a [Category],
        progress: &'a ProgressMap,
        selected: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            categories,
            progress,
            selected,
            theme,
        }
    }
}

impl Widget for CategoryMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("home.title")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.categories
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(inner);

        for (i, (category, row)) in self.categories.iter().zip(rows.iter()).enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let total = category.cards.len();
            let known = self.progress.known_in(&category.id, &category.card_ids());

            let label_style = if is_selected {
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let lines = vec![
                Line::from(Span::styled(
                    format!(" {indicator} [{}] {}", i + 1, category.title),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("     {}", t!("home.known", known = known, total = total)),
                    Style::default().fg(colors.muted()),
                )),
            ];
            Paragraph::new(lines).render(*row, buf);

            let bar_width = 20.min(row.width.saturating_sub(6));
            if row.height >= 2 && bar_width > 0 && row.width > bar_width + 2 {
                let bar = Rect::new(row.x + row.width - bar_width - 2, row.y + 1, bar_width, 1);
                ProgressBar::counts(known, total, self.theme).render(bar, buf);
            }
        }
    }
}
