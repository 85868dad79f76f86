use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// One-row bar. Bordered when given a title, bare otherwise so it can sit
/// inline in a list row.
pub struct ProgressBar<'a> {
    title: Option<String>,
    caption: String,
    ratio: f64,
    theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    /// `done` of `total`, captioned "done/total".
    pub fn counts(done: usize, total: usize, theme: &'a Theme) -> Self {
        let ratio = if total == 0 {
            0.0
        } else {
            done as f64 / total as f64
        };
        Self {
            title: None,
            caption: format!("{done}/{total}"),
            ratio: ratio.clamp(0.0, 1.0),
            theme,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let inner = match &self.title {
            Some(title) => {
                let block = Block::bordered()
                    .title(format!(" {title} "))
                    .border_style(Style::default().fg(colors.border()));
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64).round() as u16;

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let caption_width = self.caption.chars().count() as u16;
        let caption_x = inner.x + (inner.width.saturating_sub(caption_width)) / 2;
        buf.set_stringn(
            caption_x,
            inner.y,
            &self.caption,
            inner.width as usize,
            Style::default().fg(colors.fg()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_empty_total() {
        let theme = Theme::default();
        assert_eq!(ProgressBar::counts(0, 0, &theme).ratio(), 0.0);
        assert_eq!(ProgressBar::counts(3, 4, &theme).ratio(), 0.75);
        assert_eq!(ProgressBar::counts(9, 4, &theme).ratio(), 1.0);
    }

    #[test]
    fn renders_caption_inline() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        ProgressBar::counts(2, 8, &theme).render(area, &mut buf);
        let row: String = (0..12).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(row.contains("2/8"));
    }
}
