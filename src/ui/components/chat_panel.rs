use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::remote::Role;
use crate::session::ChatSession;
use crate::ui::components::text_field::TextField;
use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

/// Message log over an input field, scrolled to the newest message.
pub struct ChatPanel<'a> {
    chat: &'a ChatSession,
    theme: &'a Theme,
}

impl<'a> ChatPanel<'a> {
    pub fn new(chat: &'a ChatSession, theme: &'a Theme) -> Self {
        Self { chat, theme }
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(Span::styled(
                format!(" {} ", t!("chat.title")),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(inner);

        let mut lines: Vec<Line> = Vec::new();
        for message in self.chat.messages() {
            let (prefix, color) = match (message.role, message.is_error) {
                (_, true) => ("!", colors.error()),
                (Role::User, false) => (">", colors.chat_user()),
                (Role::Assistant, false) => ("·", colors.chat_assistant()),
            };
            for (i, para) in message.content.split('\n').enumerate() {
                let lead = if i == 0 { prefix } else { " " };
                lines.push(Line::from(vec![
                    Span::styled(format!("{lead} "), Style::default().fg(color)),
                    Span::styled(para.to_string(), Style::default().fg(colors.fg())),
                ]));
            }
            lines.push(Line::from(""));
        }
        if self.chat.is_waiting() {
            lines.push(Line::from(Span::styled(
                format!("· {}", t!("chat.waiting")),
                Style::default()
                    .fg(colors.muted())
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        let width = parts[0].width as usize;
        let total: usize = lines
            .iter()
            .map(|l| wrapped_line_count(&l.to_string(), width))
            .sum();
        let scroll = total.saturating_sub(parts[0].height as usize) as u16;

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(parts[0], buf);

        TextField::new(&self.chat.input, &t!("chat.hint"), self.theme)
            .focused(!self.chat.is_waiting())
            .render(parts[1], buf);
    }
}
