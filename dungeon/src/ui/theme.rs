//! Color theme and styling for the dungeon TUI

use ratatui::style::{Color, Modifier, Style};

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    pub border: Color,
    pub border_focused: Color,

    pub hp_healthy: Color,
    pub hp_wounded: Color,
    pub hp_critical: Color,

    pub player_text: Color,
    pub dm_text: Color,
    pub system_text: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            hp_healthy: Color::Green,
            hp_wounded: Color::Yellow,
            hp_critical: Color::Red,

            player_text: Color::Cyan,
            dm_text: Color::White,
            system_text: Color::DarkGray,
        }
    }
}

impl GameTheme {
    /// Get style for DM narration
    pub fn dm_style(&self) -> Style {
        Style::default().fg(self.dm_text)
    }

    /// Get style for player actions
    pub fn player_style(&self) -> Style {
        Style::default()
            .fg(self.player_text)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get style for system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Get HP bar color based on ratio
    pub fn hp_color(&self, ratio: f64) -> Color {
        if ratio > 0.5 {
            self.hp_healthy
        } else if ratio > 0.25 {
            self.hp_wounded
        } else {
            self.hp_critical
        }
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }
}
