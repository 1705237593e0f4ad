//! Character panel widget for sidebar display

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use dungeon_core::state::{Location, Player};

use crate::ui::theme::GameTheme;

/// Compact character panel for sidebar
pub struct CharacterPanelWidget<'a> {
    player: &'a Player,
    location: &'a Location,
    theme: &'a GameTheme,
}

impl<'a> CharacterPanelWidget<'a> {
    pub fn new(player: &'a Player, location: &'a Location, theme: &'a GameTheme) -> Self {
        Self {
            player,
            location,
            theme,
        }
    }
}

impl Widget for CharacterPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.player.name))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // HP bar
                Constraint::Length(2), // Attack power
                Constraint::Min(0),    // Inventory + nearby NPCs
            ])
            .split(inner);

        // HP bar
        let hp_ratio = if self.player.max_hp > 0 {
            (self.player.hp as f64 / self.player.max_hp as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let hp_color = self.theme.hp_color(hp_ratio);
        let hp_label = format!("HP: {}/{}", self.player.hp, self.player.max_hp);

        let gauge = Gauge::default()
            .block(Block::default())
            .gauge_style(Style::default().fg(hp_color))
            .ratio(hp_ratio)
            .label(hp_label);
        gauge.render(chunks[0], buf);

        // Attack power
        let attack_line = Line::from(vec![
            Span::raw("Attack: "),
            Span::styled(
                format!("{}", self.player.attack_power),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(attack_line).render(chunks[1], buf);

        // Inventory and nearby NPCs
        if chunks[2].height > 0 {
            let mut lines = Vec::new();

            lines.push(Line::from(Span::styled(
                "Inventory:",
                Style::default().add_modifier(Modifier::UNDERLINED),
            )));
            if self.player.inventory.is_empty() {
                lines.push(Line::from(Span::styled(
                    "  (empty)",
                    self.theme.system_style(),
                )));
            } else {
                for item in &self.player.inventory {
                    lines.push(Line::from(format!("  - {item}")));
                }
            }

            if !self.location.npcs.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Nearby:",
                    Style::default().add_modifier(Modifier::UNDERLINED),
                )));
                for npc in &self.location.npcs {
                    lines.push(Line::from(format!("  - {}", npc.name)));
                }
            }

            Paragraph::new(lines).render(chunks[2], buf);
        }
    }
}
