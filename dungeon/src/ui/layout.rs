//! Layout calculation for the dungeon TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// The main application layout areas
pub struct AppLayout {
    pub title_area: Rect,
    pub narrative_area: Rect,
    pub sidebar_area: Rect,
    pub status_bar: Rect,
    pub input_area: Rect,
}

impl AppLayout {
    /// Calculate the layout: title bar, 70/30 narrative/sidebar split,
    /// status bar, input box.
    pub fn calculate(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Min(5),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(3), // Input box
            ])
            .split(area);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(vertical[1]);

        Self {
            title_area: vertical[0],
            narrative_area: main[0],
            sidebar_area: main[1],
            status_bar: vertical[2],
            input_area: vertical[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fills_area() {
        let area = Rect::new(0, 0, 100, 40);
        let layout = AppLayout::calculate(area);

        assert_eq!(layout.title_area.height, 1);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.input_area.height, 3);
        assert_eq!(
            layout.narrative_area.width + layout.sidebar_area.width,
            100
        );
    }
}
