use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::app::{Notice, NoticeKind};
use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

/// Modal message drawn over the centre of `area`.
pub struct NoticePopup<'a> {
    notice: &'a Notice,
    theme: &'a Theme,
}

impl<'a> NoticePopup<'a> {
    pub fn new(notice: &'a Notice, theme: &'a Theme) -> Self {
        Self { notice, theme }
    }
}

impl Widget for NoticePopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let accent = match self.notice.kind {
            NoticeKind::MissingTopic | NoticeKind::MissingCredential => colors.warning(),
            _ => colors.error(),
        };

        let popup = centered_rect(50, 30, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(Span::styled(
                format!(" {} ", t!("notice.title")),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ))
            .title_bottom(
                Line::from(Span::styled(
                    format!(" {} ", t!("notice.dismiss")),
                    Style::default().fg(colors.muted()),
                ))
                .alignment(Alignment::Right),
            )
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                self.notice.message.clone(),
                Style::default().fg(colors.fg()),
            )),
        ])
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(popup, buf);
    }
}
