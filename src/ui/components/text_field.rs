use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Bordered editor for a [`LineInput`], with a block cursor when focused.
pub struct TextField<'a> {
    input: &'a LineInput,
    title: String,
    focused: bool,
    masked: bool,
    theme: &'a Theme,
}

impl<'a> TextField<'a> {
    pub fn new(input: &'a LineInput, title: &str, theme: &'a Theme) -> Self {
        Self {
            input,
            title: title.to_string(),
            focused: true,
            masked: false,
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let text_style = Style::default().fg(colors.fg());
        let cursor_style = Style::default().fg(colors.bg()).bg(colors.accent());

        if self.masked {
            let mut spans = vec![Span::styled(self.input.masked(), text_style)];
            if self.focused {
                spans.push(Span::styled(" ", cursor_style));
            }
            return vec![Line::from(spans)];
        }

        let (before, cursor, after) = self.input.render_parts();
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut spans: Vec<Span<'static>> = Vec::new();

        push_text(before, text_style, &mut spans, &mut lines);
        match (cursor, self.focused) {
            (Some('\n'), true) => {
                spans.push(Span::styled(" ", cursor_style));
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            (Some(ch), true) => spans.push(Span::styled(ch.to_string(), cursor_style)),
            (Some(ch), false) => push_text(&ch.to_string(), text_style, &mut spans, &mut lines),
            (None, true) => spans.push(Span::styled(" ", cursor_style)),
            (None, false) => {}
        }
        push_text(after, text_style, &mut spans, &mut lines);
        lines.push(Line::from(spans));
        lines
    }
}

/// Append `text` to the current line, starting a new line at each '\n'.
fn push_text(
    text: &str,
    style: Style,
    spans: &mut Vec<Span<'static>>,
    lines: &mut Vec<Line<'static>>,
) {
    let mut parts = text.split('\n').peekable();
    while let Some(part) = parts.next() {
        if !part.is_empty() {
            spans.push(Span::styled(part.to_string(), style));
        }
        if parts.peek().is_some() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    }
}

impl Widget for TextField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let title_style = if self.focused {
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted())
        };

        let block = Block::bordered()
            .title(Span::styled(format!(" {} ", self.title), title_style))
            .border_style(Style::default().fg(border));

        let lines = self.lines();
        let inner_height = block.inner(area).height as usize;
        let scroll = lines.len().saturating_sub(inner_height) as u16;

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_input_splits_into_lines() {
        let theme = Theme::default();
        let input = LineInput::new("eins\nzwei");
        let field = TextField::new(&input, "Text", &theme);
        assert_eq!(field.lines().len(), 2);
    }

    #[test]
    fn masked_field_hides_value() {
        let theme = Theme::default();
        let input = LineInput::new("sk-secret");
        let field = TextField::new(&input, "Key", &theme).masked(true);
        let text: String = field.lines()[0]
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert!(!text.contains("secret"));
        assert!(text.starts_with("*********"));
    }
}
