//! Narrative display widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use dungeon_core::{LogEntry, LogRole};

use crate::ui::theme::GameTheme;

/// Widget for displaying the game log
pub struct NarrativeWidget<'a> {
    entries: &'a [LogEntry],
    scroll: usize,
    theme: &'a GameTheme,
}

impl<'a> NarrativeWidget<'a> {
    pub fn new(entries: &'a [LogEntry], theme: &'a GameTheme) -> Self {
        Self {
            entries,
            scroll: 0,
            theme,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn style_for_role(&self, role: LogRole) -> Style {
        match role {
            LogRole::Player => self.theme.player_style(),
            LogRole::Dm => self.theme.dm_style(),
        }
    }
}

impl Widget for NarrativeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Narrative ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        // Build lines from log entries
        let mut lines: Vec<Line> = Vec::new();

        for entry in self.entries {
            let style = self.style_for_role(entry.role);
            let prefix = match entry.role {
                LogRole::Player => "> ",
                LogRole::Dm => "",
            };

            let text = format!("{}{}", prefix, entry.content);
            for line in text.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), style)));
            }

            // Blank line between entries
            lines.push(Line::from(""));
        }

        // Calculate scroll position
        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        let paragraph = Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: false });

        paragraph.render(inner, buf);

        // Render scrollbar if content exceeds visible area
        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);
        }
    }
}
