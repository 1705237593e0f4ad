//! Input box widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::InputMode;
use crate::ui::theme::GameTheme;

/// Single-line input box with a visible cursor in insert mode
pub struct InputWidget<'a> {
    buffer: &'a str,
    cursor: usize,
    mode: InputMode,
    theme: &'a GameTheme,
}

impl<'a> InputWidget<'a> {
    pub fn new(buffer: &'a str, cursor: usize, mode: InputMode, theme: &'a GameTheme) -> Self {
        Self {
            buffer,
            cursor,
            mode,
            theme,
        }
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, focused) = match self.mode {
            InputMode::Insert => (" What do you do? [Enter to send, Esc to cancel] ", true),
            InputMode::Normal => (" Press 'i' to act ", false),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans: Vec<Span> = Vec::new();
        if self.mode == InputMode::Insert {
            // Split at the cursor (character index) and render a block
            // cursor over the character under it.
            let byte_pos = self
                .buffer
                .char_indices()
                .nth(self.cursor)
                .map(|(i, _)| i)
                .unwrap_or(self.buffer.len());

            let (before, rest) = self.buffer.split_at(byte_pos);
            spans.push(Span::raw(before.to_string()));

            let mut rest_chars = rest.chars();
            match rest_chars.next() {
                Some(c) => {
                    spans.push(Span::styled(
                        c.to_string(),
                        Style::default().add_modifier(Modifier::REVERSED),
                    ));
                    spans.push(Span::raw(rest_chars.as_str().to_string()));
                }
                None => {
                    spans.push(Span::styled(
                        " ",
                        Style::default().add_modifier(Modifier::REVERSED),
                    ));
                }
            }
        } else {
            spans.push(Span::styled(
                self.buffer.to_string(),
                self.theme.system_style(),
            ));
        }

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}
