//! Render orchestration for the dungeon TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode};
use crate::ui::layout::AppLayout;
use crate::ui::widgets::{CharacterPanelWidget, InputWidget, NarrativeWidget};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);

    render_title_bar(frame, app, layout.title_area);

    // Narrative panel, fed straight from the game log
    let narrative_widget = NarrativeWidget::new(app.session.game_log(), &app.theme)
        .scroll(app.narrative_scroll);
    frame.render_widget(narrative_widget, layout.narrative_area);

    // Character sidebar
    let state = app.session.state();
    let character_widget =
        CharacterPanelWidget::new(&state.player, &state.current_location, &app.theme);
    frame.render_widget(character_widget, layout.sidebar_area);

    render_status_bar(frame, app, layout.status_bar);

    // Input box
    let input_widget = InputWidget::new(
        app.input_buffer(),
        app.cursor_position(),
        app.input_mode,
        &app.theme,
    );
    frame.render_widget(input_widget, layout.input_area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} ", app.session.location_name());

    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar: input mode tag plus the current status message
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_tag = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ),
        InputMode::Insert => Span::styled(
            " INSERT ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    };

    let mut spans = vec![mode_tag, Span::raw(" ")];
    if app.processing {
        spans.push(Span::styled(
            "The DM is thinking...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ));
    } else if let Some(message) = app.status_message() {
        spans.push(Span::styled(
            message.to_string(),
            app.theme.system_style(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
